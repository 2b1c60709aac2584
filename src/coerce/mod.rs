//! Coercion engine
//!
//! Interposes per-node conversions in front of schema walkers.
//!
//! # Design Principles
//!
//! - Coerce, then walk; never the reverse
//! - A failing coercion becomes an `ErrorSentinel`, never a panic
//! - Matchers are pure and combine by priority
//! - Tables are immutable values, assembled at the call site

mod coercer;
mod config;
mod errors;
mod matcher;
mod matchers;
mod safe;
mod table;

pub use coercer::{coercer, coercer_for};
pub use config::{CoercionConfig, CoercionPolicy};
pub use errors::{CoercionError, CoercionResult, ConfigError};
pub use matcher::{coercion, first_matcher, no_coercion, CoercionFn, CoercionMatcher, FirstMatcher};
pub use matchers::{
    enum_matcher, integer_enum_matcher, json_coercion_matcher, keyword_enum_matcher, long_cast,
    parse_double, parse_long, parse_number, safe_long_cast, sequence_to_set, set_matcher,
    string_coercion_matcher, string_integer_enum_matcher, string_to_bool, string_to_keyword,
    string_to_uuid, to_double,
};
pub use safe::safe;
pub use table::CoercionTable;

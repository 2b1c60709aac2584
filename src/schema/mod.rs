//! Schema subsystem: node kinds, datums, walkers and walk errors
//!
//! # Design Principles
//!
//! - Schemas are immutable trees, owned by the caller
//! - Walkers are built once per node and reused across datums
//! - Failures are values (`ErrorSentinel`), never panics
//! - Walking is deterministic

mod datum;
mod errors;
mod loader;
mod types;
mod walker;

pub use datum::Datum;
pub use errors::{
    is_error, ErrorCause, ErrorCode, ErrorSentinel, LoaderError, LoaderResult, PathSegment,
    WalkResult,
};
pub use loader::{SchemaDefinition, SchemaLoader};
pub use types::{FieldDef, ScalarKind, Schema};
pub use walker::{build_walker, walker, Walker};

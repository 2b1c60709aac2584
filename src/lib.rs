//! schema-coerce - schema-driven coercion engine
//!
//! Walks a datum against a schema, converting raw input at each node before
//! validating it, and reports failures as `ErrorSentinel` values.

pub mod coerce;
pub mod schema;

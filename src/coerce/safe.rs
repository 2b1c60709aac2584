//! Fallback-to-identity wrapper for best-effort coercions
//!
//! A coercion that cannot convert its input should hand the untouched value
//! to the walker, which then reports a precise validation error instead of
//! an opaque conversion error.

use super::errors::{CoercionError, CoercionResult};
use super::matcher::{coercion, CoercionFn};
use crate::schema::Datum;

/// Wraps `f` so that a failed conversion returns the original input.
///
/// Only ordinary coercion errors fall back. A walk failure surfaced by a
/// nested coercer (`CoercionError::Nested`) is passed through, and panics are
/// left to the coercer, which reports them as coercion failures.
pub fn safe<F>(f: F) -> CoercionFn
where
    F: Fn(&Datum) -> CoercionResult + Send + Sync + 'static,
{
    coercion(move |x| match f(x) {
        Ok(v) => Ok(v),
        Err(CoercionError::Nested(sentinel)) => Err(CoercionError::Nested(sentinel)),
        Err(_) => Ok(x.clone()),
    })
}

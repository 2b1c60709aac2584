//! Coercer: interposes matcher coercions in front of native walkers
//!
//! For every schema node, the coercer asks the matcher for a coercion. Nodes
//! without one keep their native walker untouched. Nodes with one run:
//!
//! 1. the coercion on the raw input,
//! 2. the native walker on the coerced value.
//!
//! A coercion that fails or panics becomes an `ErrorSentinel` tagging the
//! node and the original input; the walker is then skipped. A sentinel
//! produced inside the coercion is returned as-is.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

use super::errors::{CoercionError, CoercionResult};
use super::matcher::{CoercionFn, CoercionMatcher};
use crate::schema::{
    build_walker, Datum, ErrorSentinel, LoaderResult, Schema, SchemaLoader, Walker,
};

/// Builds a walker for `schema` that coerces each node before walking it.
///
/// The matcher is consulted once per node, at build time. The returned
/// walker is stateless and may be shared across threads.
pub fn coercer<M>(schema: &Schema, matcher: &M) -> Walker
where
    M: CoercionMatcher + ?Sized,
{
    build_walker(schema, &|node: &Arc<Schema>, native: Walker| {
        match matcher.coercion_for(node) {
            Some(coercion) => {
                debug!(node = node.type_name(), "interposing coercion");
                interpose(Arc::clone(node), coercion, native)
            }
            None => native,
        }
    })
}

/// Builds a coercer for a registered schema definition.
pub fn coercer_for<M>(
    loader: &SchemaLoader,
    schema_id: &str,
    schema_version: &str,
    matcher: &M,
) -> LoaderResult<Walker>
where
    M: CoercionMatcher + ?Sized,
{
    let schema = loader.resolve(schema_id, schema_version)?;
    Ok(coercer(schema, matcher))
}

fn interpose(node: Arc<Schema>, coercion: CoercionFn, native: Walker) -> Walker {
    Arc::new(move |x: &Datum| {
        let coerced = match run_coercion(&coercion, x) {
            Ok(v) => v,
            Err(CoercionError::Nested(sentinel)) => return Err(sentinel),
            Err(e) => {
                debug!(node = node.type_name(), value = %x, error = %e, "coercion failed");
                return Err(ErrorSentinel::coercion_failed(Arc::clone(&node), x.clone(), e));
            }
        };
        native(&coerced)
    })
}

/// Runs a coercion, converting a panic into a coercion error.
fn run_coercion(coercion: &CoercionFn, x: &Datum) -> CoercionResult {
    panic::catch_unwind(AssertUnwindSafe(|| coercion(x)))
        .unwrap_or_else(|payload| Err(CoercionError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

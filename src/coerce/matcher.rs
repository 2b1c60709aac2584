//! Coercion matchers and their combinators
//!
//! A matcher decides, per schema node, whether raw input for that node is
//! converted before walking. Matchers are pure: asking twice about the same
//! node gives equivalent answers, and asking has no side effects.

use std::fmt;
use std::sync::Arc;

use super::errors::CoercionResult;
use crate::schema::{Datum, Schema};

/// A conversion applied to a raw datum before the node's walker runs
pub type CoercionFn = Arc<dyn Fn(&Datum) -> CoercionResult + Send + Sync>;

/// Wraps a closure as a `CoercionFn`
pub fn coercion<F>(f: F) -> CoercionFn
where
    F: Fn(&Datum) -> CoercionResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Policy mapping schema nodes to optional coercions.
///
/// Any `Fn(&Schema) -> Option<CoercionFn>` is a matcher.
pub trait CoercionMatcher: Send + Sync {
    /// Returns the coercion for `schema`, or `None` to walk it unchanged
    fn coercion_for(&self, schema: &Schema) -> Option<CoercionFn>;
}

impl<F> CoercionMatcher for F
where
    F: Fn(&Schema) -> Option<CoercionFn> + Send + Sync,
{
    fn coercion_for(&self, schema: &Schema) -> Option<CoercionFn> {
        self(schema)
    }
}

/// Combines matchers by priority: the first one that matches a node wins.
///
/// Evaluation stops at the first match, so later matchers are never asked
/// about a node an earlier one already handles.
#[derive(Default)]
pub struct FirstMatcher {
    matchers: Vec<Box<dyn CoercionMatcher>>,
}

impl FirstMatcher {
    /// Creates an empty combination, which matches nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a matcher with lower priority than those already added
    pub fn then<M>(mut self, matcher: M) -> Self
    where
        M: CoercionMatcher + 'static,
    {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Returns the number of combined matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl CoercionMatcher for FirstMatcher {
    fn coercion_for(&self, schema: &Schema) -> Option<CoercionFn> {
        for matcher in &self.matchers {
            if let Some(coercion) = matcher.coercion_for(schema) {
                return Some(coercion);
            }
        }
        None
    }
}

impl fmt::Debug for FirstMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstMatcher")
            .field("matchers", &self.matchers.len())
            .finish()
    }
}

/// Combines matchers in priority order.
pub fn first_matcher(matchers: Vec<Box<dyn CoercionMatcher>>) -> FirstMatcher {
    FirstMatcher { matchers }
}

/// Matcher that never coerces
pub fn no_coercion(_: &Schema) -> Option<CoercionFn> {
    None
}

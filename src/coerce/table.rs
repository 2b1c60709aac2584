//! Coercion tables: direct lookup from scalar node kind to coercion
//!
//! Tables are immutable values assembled at the call site. `json()` and
//! `string()` build the two standard policies; `with` derives a new table
//! with one entry added or replaced.

use std::collections::BTreeMap;
use std::fmt;

use super::matcher::{coercion, CoercionFn, CoercionMatcher};
use super::matchers::{
    parse_double, parse_long, parse_number, safe_long_cast, string_to_bool, string_to_keyword,
    string_to_uuid, to_double,
};
use super::safe::safe;
use crate::schema::{ScalarKind, Schema};

/// Maps scalar node kinds to coercions
#[derive(Clone, Default)]
pub struct CoercionTable {
    entries: BTreeMap<ScalarKind, CoercionFn>,
}

impl CoercionTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a table with `kind` mapped to `coercion`
    pub fn with(mut self, kind: ScalarKind, coercion: CoercionFn) -> Self {
        self.entries.insert(kind, coercion);
        self
    }

    /// Coercions for JSON-decoded data.
    ///
    /// No textual number parsing: JSON already encodes numbers natively.
    pub fn json() -> Self {
        Self::new()
            .with(ScalarKind::Keyword, coercion(string_to_keyword))
            .with(ScalarKind::Int, safe_long_cast())
            .with(ScalarKind::Double, safe(to_double))
            .with(ScalarKind::Bool, safe(string_to_bool))
            .with(ScalarKind::Uuid, safe(string_to_uuid))
    }

    /// Coercions for textual data: the JSON table plus number parsing.
    pub fn string() -> Self {
        Self::json()
            .with(ScalarKind::Num, safe(parse_number))
            .with(ScalarKind::Int, safe(parse_long))
            .with(ScalarKind::Double, safe(parse_double))
    }

    /// Returns the coercion for `kind`
    pub fn get(&self, kind: ScalarKind) -> Option<&CoercionFn> {
        self.entries.get(&kind)
    }

    /// Returns the kinds with an entry, in order
    pub fn kinds(&self) -> impl Iterator<Item = ScalarKind> + '_ {
        self.entries.keys().copied()
    }
}

impl CoercionMatcher for CoercionTable {
    fn coercion_for(&self, schema: &Schema) -> Option<CoercionFn> {
        schema
            .scalar_kind()
            .and_then(|kind| self.entries.get(&kind).cloned())
    }
}

impl fmt::Debug for CoercionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

//! Schema node definitions
//!
//! Supported node kinds:
//! - any, nil, string, keyword, bool, int, double, num, uuid: scalar constraints
//! - eq: exactly one allowed value
//! - enum: closed enumeration of allowed values
//! - maybe: nil or the inner schema
//! - seq: homogeneous sequence
//! - set: homogeneous set
//! - record: string-keyed map with declared fields
//! - map_of: string-keyed map with homogeneous values
//! - either: first matching branch

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::datum::Datum;

/// A schema node. Composite nodes own their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    /// Accepts every value
    Any,
    /// Accepts only nil
    Nil,
    /// UTF-8 string
    Str,
    /// Symbolic token
    Keyword,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point (integers are not accepted)
    Double,
    /// Any number, integer or floating point
    Num,
    /// UUID
    Uuid,
    /// Exactly the given value
    Eq { value: Datum },
    /// One of the given values
    Enum { values: BTreeSet<Datum> },
    /// Nil, or a value matching the inner schema
    Maybe { schema: Box<Schema> },
    /// Sequence whose elements all match the element type
    Seq { element_type: Box<Schema> },
    /// Set whose members all match the element type
    Set { element_type: Box<Schema> },
    /// Map with declared fields; undeclared keys are rejected
    Record { fields: BTreeMap<String, FieldDef> },
    /// Map whose values all match the value type
    MapOf { value_type: Box<Schema> },
    /// Value matching at least one branch, tried in order
    Either { branches: Vec<Schema> },
}

/// Scalar node kinds, used as lookup keys by coercion tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Str,
    Keyword,
    Bool,
    Int,
    Double,
    Num,
    Uuid,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Str => "string",
            ScalarKind::Keyword => "keyword",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Double => "double",
            ScalarKind::Num => "num",
            ScalarKind::Uuid => "uuid",
        };
        write!(f, "{}", name)
    }
}

impl Schema {
    /// Creates an enumeration of the given values
    pub fn enumeration(values: impl IntoIterator<Item = Datum>) -> Self {
        Schema::Enum {
            values: values.into_iter().collect(),
        }
    }

    /// Creates an enumeration of keywords
    pub fn keyword_enum<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::enumeration(names.into_iter().map(Datum::keyword))
    }

    /// Creates a node accepting exactly one value
    pub fn exactly(value: impl Into<Datum>) -> Self {
        Schema::Eq {
            value: value.into(),
        }
    }

    pub fn maybe(schema: Schema) -> Self {
        Schema::Maybe {
            schema: Box::new(schema),
        }
    }

    pub fn seq(element_type: Schema) -> Self {
        Schema::Seq {
            element_type: Box::new(element_type),
        }
    }

    pub fn set(element_type: Schema) -> Self {
        Schema::Set {
            element_type: Box::new(element_type),
        }
    }

    pub fn map_of(value_type: Schema) -> Self {
        Schema::MapOf {
            value_type: Box::new(value_type),
        }
    }

    pub fn either(branches: impl IntoIterator<Item = Schema>) -> Self {
        Schema::Either {
            branches: branches.into_iter().collect(),
        }
    }

    /// Creates a record from (name, field) pairs
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldDef)>) -> Self {
        Schema::Record {
            fields: fields.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Any => "any",
            Schema::Nil => "nil",
            Schema::Str => "string",
            Schema::Keyword => "keyword",
            Schema::Bool => "bool",
            Schema::Int => "int",
            Schema::Double => "double",
            Schema::Num => "num",
            Schema::Uuid => "uuid",
            Schema::Eq { .. } => "eq",
            Schema::Enum { .. } => "enum",
            Schema::Maybe { .. } => "maybe",
            Schema::Seq { .. } => "seq",
            Schema::Set { .. } => "set",
            Schema::Record { .. } => "record",
            Schema::MapOf { .. } => "map_of",
            Schema::Either { .. } => "either",
        }
    }

    /// Returns the scalar kind of this node, if it is a scalar constraint
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Schema::Str => Some(ScalarKind::Str),
            Schema::Keyword => Some(ScalarKind::Keyword),
            Schema::Bool => Some(ScalarKind::Bool),
            Schema::Int => Some(ScalarKind::Int),
            Schema::Double => Some(ScalarKind::Double),
            Schema::Num => Some(ScalarKind::Num),
            Schema::Uuid => Some(ScalarKind::Uuid),
            _ => None,
        }
    }

    /// Returns the allowed values of an enumeration node
    pub fn enum_values(&self) -> Option<&BTreeSet<Datum>> {
        match self {
            Schema::Enum { values } => Some(values),
            _ => None,
        }
    }

    /// Returns whether this node describes a set-typed collection
    pub fn is_set(&self) -> bool {
        matches!(self, Schema::Set { .. })
    }
}

/// Field definition within a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field schema
    pub schema: Schema,
    /// Whether field must be present
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl FieldDef {
    /// Create a required field
    pub fn required(schema: Schema) -> Self {
        Self {
            schema,
            required: true,
        }
    }

    /// Create an optional field
    pub fn optional(schema: Schema) -> Self {
        Self {
            schema,
            required: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(Schema::Int.scalar_kind(), Some(ScalarKind::Int));
        assert_eq!(Schema::Keyword.scalar_kind(), Some(ScalarKind::Keyword));
        assert_eq!(Schema::Any.scalar_kind(), None);
        assert_eq!(Schema::seq(Schema::Int).scalar_kind(), None);
    }

    #[test]
    fn test_keyword_enum_values() {
        let schema = Schema::keyword_enum(["red", "green", "blue"]);
        let values = schema.enum_values().unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&Datum::keyword("green")));
        assert!(!values.contains(&Datum::string("green")));
    }

    #[test]
    fn test_schema_from_json() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "type": "record",
                "fields": {
                    "name": { "schema": { "type": "str" } },
                    "tags": {
                        "schema": { "type": "set", "element_type": { "type": "keyword" } },
                        "required": false
                    },
                    "color": {
                        "schema": {
                            "type": "enum",
                            "values": [{ "keyword": "red" }, { "keyword": "blue" }]
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let expected = Schema::record([
            ("name", FieldDef::required(Schema::Str)),
            ("tags", FieldDef::optional(Schema::set(Schema::Keyword))),
            ("color", FieldDef::required(Schema::keyword_enum(["red", "blue"]))),
        ]);
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Schema::Str.type_name(), "string");
        assert_eq!(Schema::maybe(Schema::Int).type_name(), "maybe");
        assert_eq!(Schema::map_of(Schema::Int).type_name(), "map_of");
        assert_eq!(Schema::either([Schema::Int, Schema::Str]).type_name(), "either");
    }
}

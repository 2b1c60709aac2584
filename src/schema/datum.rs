//! Datum: the value model walked by schemas
//!
//! Supported values:
//! - nil
//! - bool
//! - int: 64-bit signed integer
//! - double: 64-bit floating point
//! - string: UTF-8 text
//! - keyword: symbolic token, distinct from text with the same name
//! - uuid
//! - seq: ordered sequence
//! - set: ordered set without duplicates
//! - map: string-keyed map
//!
//! Datums are totally ordered (doubles compare with `total_cmp`) so that sets
//! and enumeration membership are well defined.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// A value walked against a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datum {
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Keyword(String),
    Uuid(Uuid),
    Seq(Vec<Datum>),
    Set(BTreeSet<Datum>),
    Map(BTreeMap<String, Datum>),
}

impl Datum {
    /// Creates a keyword datum
    pub fn keyword(name: impl Into<String>) -> Self {
        Datum::Keyword(name.into())
    }

    /// Creates a string datum
    pub fn string(text: impl Into<String>) -> Self {
        Datum::Str(text.into())
    }

    /// Creates a sequence datum
    pub fn seq(items: impl IntoIterator<Item = Datum>) -> Self {
        Datum::Seq(items.into_iter().collect())
    }

    /// Creates a set datum, dropping duplicates
    pub fn set(items: impl IntoIterator<Item = Datum>) -> Self {
        Datum::Set(items.into_iter().collect())
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::Nil => "nil",
            Datum::Bool(_) => "bool",
            Datum::Int(_) => "int",
            Datum::Double(_) => "double",
            Datum::Str(_) => "string",
            Datum::Keyword(_) => "keyword",
            Datum::Uuid(_) => "uuid",
            Datum::Seq(_) => "seq",
            Datum::Set(_) => "set",
            Datum::Map(_) => "map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Datum::Nil)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Datum::Int(_) | Datum::Double(_))
    }

    /// Returns the text of a string datum
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the datum to JSON.
    ///
    /// Keywords and uuids become strings, sets become arrays, and
    /// non-finite doubles become null.
    pub fn to_json(&self) -> Value {
        match self {
            Datum::Nil => Value::Null,
            Datum::Bool(b) => Value::Bool(*b),
            Datum::Int(i) => Value::from(*i),
            Datum::Double(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Datum::Str(s) | Datum::Keyword(s) => Value::String(s.clone()),
            Datum::Uuid(u) => Value::String(u.to_string()),
            Datum::Seq(items) => Value::Array(items.iter().map(Datum::to_json).collect()),
            Datum::Set(items) => Value::Array(items.iter().map(Datum::to_json).collect()),
            Datum::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Rank of the variant, used to order datums of different types
    fn rank(&self) -> u8 {
        match self {
            Datum::Nil => 0,
            Datum::Bool(_) => 1,
            Datum::Int(_) => 2,
            Datum::Double(_) => 3,
            Datum::Str(_) => 4,
            Datum::Keyword(_) => 5,
            Datum::Uuid(_) => 6,
            Datum::Seq(_) => 7,
            Datum::Set(_) => 8,
            Datum::Map(_) => 9,
        }
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Datum::Nil, Datum::Nil) => Ordering::Equal,
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Int(a), Datum::Int(b)) => a.cmp(b),
            (Datum::Double(a), Datum::Double(b)) => a.total_cmp(b),
            (Datum::Str(a), Datum::Str(b)) => a.cmp(b),
            (Datum::Keyword(a), Datum::Keyword(b)) => a.cmp(b),
            (Datum::Uuid(a), Datum::Uuid(b)) => a.cmp(b),
            (Datum::Seq(a), Datum::Seq(b)) => a.cmp(b),
            (Datum::Set(a), Datum::Set(b)) => a.cmp(b),
            (Datum::Map(a), Datum::Map(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Datum {}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Nil => write!(f, "nil"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::Double(d) => write!(f, "{:?}", d),
            Datum::Str(s) => write!(f, "{:?}", s),
            Datum::Keyword(k) => write!(f, ":{}", k),
            Datum::Uuid(u) => write!(f, "#uuid \"{}\"", u),
            Datum::Seq(items) => {
                write!(f, "[")?;
                write_joined(f, items.iter())?;
                write!(f, "]")
            }
            Datum::Set(items) => {
                write!(f, "#{{")?;
                write_joined(f, items.iter())?;
                write!(f, "}}")
            }
            Datum::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?} {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Datum>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Datum::Nil,
            Value::Bool(b) => Datum::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Datum::Int(i),
                // u64 beyond i64 range degrades to a double
                None => Datum::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Datum::Str(s),
            Value::Array(items) => Datum::Seq(items.into_iter().map(Datum::from).collect()),
            Value::Object(entries) => Datum::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Datum::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Datum {
    fn from(value: &Value) -> Self {
        Datum::from(value.clone())
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Int(i)
    }
}

impl From<f64> for Datum {
    fn from(d: f64) -> Self {
        Datum::Double(d)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Str(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Str(s)
    }
}

impl From<Uuid> for Datum {
    fn from(u: Uuid) -> Self {
        Datum::Uuid(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_structure() {
        let datum = Datum::from(json!({
            "name": "Alice",
            "age": 30,
            "score": 99.5,
            "tags": ["a", "b"],
            "active": true,
            "manager": null
        }));

        let Datum::Map(entries) = datum else {
            panic!("expected a map");
        };
        assert_eq!(entries["name"], Datum::string("Alice"));
        assert_eq!(entries["age"], Datum::Int(30));
        assert_eq!(entries["score"], Datum::Double(99.5));
        assert_eq!(
            entries["tags"],
            Datum::seq(vec![Datum::string("a"), Datum::string("b")])
        );
        assert_eq!(entries["active"], Datum::Bool(true));
        assert!(entries["manager"].is_nil());
    }

    #[test]
    fn test_keyword_distinct_from_string() {
        assert_ne!(Datum::keyword("red"), Datum::string("red"));
    }

    #[test]
    fn test_int_distinct_from_double() {
        assert_ne!(Datum::Int(1), Datum::Double(1.0));
    }

    #[test]
    fn test_set_drops_duplicates() {
        let set = Datum::set(vec![Datum::Int(1), Datum::Int(2), Datum::Int(2), Datum::Int(3)]);
        let Datum::Set(items) = set else {
            panic!("expected a set");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_nan_is_ordered() {
        let set = Datum::set(vec![Datum::Double(f64::NAN), Datum::Double(f64::NAN)]);
        let Datum::Set(items) = set else {
            panic!("expected a set");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_to_json() {
        let datum = Datum::seq(vec![
            Datum::keyword("red"),
            Datum::set(vec![Datum::Int(2), Datum::Int(1)]),
            Datum::Double(f64::INFINITY),
        ]);
        assert_eq!(datum.to_json(), json!(["red", [1, 2], null]));
    }

    #[test]
    fn test_display() {
        let datum = Datum::seq(vec![
            Datum::keyword("red"),
            Datum::string("text"),
            Datum::set(vec![Datum::Int(1)]),
            Datum::Double(2.0),
        ]);
        assert_eq!(datum.to_string(), "[:red \"text\" #{1} 2.0]");
    }
}

//! Walker construction
//!
//! A walker validates a datum against one schema node and returns the
//! (possibly transformed) datum. Composite walkers delegate to child walkers
//! and reassemble the walked children.
//!
//! Construction and application are separate phases: `build_walker` builds
//! every node's walker exactly once, and the result is applied to any number
//! of datums. Walkers hold no mutable state and are `Send + Sync`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::datum::Datum;
use super::errors::{ErrorCause, ErrorSentinel, PathSegment, WalkResult};
use super::types::Schema;

/// A built walker for one schema node
pub type Walker = Arc<dyn Fn(&Datum) -> WalkResult + Send + Sync>;

/// Builds the native walker tree for a schema.
pub fn walker(schema: &Schema) -> Walker {
    build_walker(schema, &|_: &Arc<Schema>, native: Walker| native)
}

/// Builds a walker tree, passing every node through `hook`.
///
/// Children are built first. `hook` then receives the node and its native
/// walker and returns the walker used for that node, so it can wrap or
/// replace it. The hook runs once per node, at build time only.
pub fn build_walker<H>(schema: &Schema, hook: &H) -> Walker
where
    H: Fn(&Arc<Schema>, Walker) -> Walker + ?Sized,
{
    let node = Arc::new(schema.clone());
    let native = native_walker(&node, hook);
    hook(&node, native)
}

fn native_walker<H>(node: &Arc<Schema>, hook: &H) -> Walker
where
    H: Fn(&Arc<Schema>, Walker) -> Walker + ?Sized,
{
    let this = Arc::clone(node);
    match node.as_ref() {
        Schema::Any => Arc::new(|x: &Datum| -> WalkResult { Ok(x.clone()) }),
        Schema::Nil => predicate(this, Datum::is_nil),
        Schema::Str => predicate(this, |x| matches!(x, Datum::Str(_))),
        Schema::Keyword => predicate(this, |x| matches!(x, Datum::Keyword(_))),
        Schema::Bool => predicate(this, |x| matches!(x, Datum::Bool(_))),
        Schema::Int => predicate(this, |x| matches!(x, Datum::Int(_))),
        Schema::Double => predicate(this, |x| matches!(x, Datum::Double(_))),
        Schema::Num => predicate(this, Datum::is_number),
        Schema::Uuid => predicate(this, |x| matches!(x, Datum::Uuid(_))),
        Schema::Eq { value } => {
            let value = value.clone();
            Arc::new(move |x: &Datum| {
                if *x == value {
                    Ok(x.clone())
                } else {
                    Err(ErrorSentinel::validation(
                        Arc::clone(&this),
                        x.clone(),
                        ErrorCause::NotAllowed,
                    ))
                }
            })
        }
        Schema::Enum { values } => {
            let values = values.clone();
            Arc::new(move |x: &Datum| {
                if values.contains(x) {
                    Ok(x.clone())
                } else {
                    Err(ErrorSentinel::validation(
                        Arc::clone(&this),
                        x.clone(),
                        ErrorCause::NotAllowed,
                    ))
                }
            })
        }
        Schema::Maybe { schema } => {
            let inner = build_walker(schema, hook);
            Arc::new(move |x: &Datum| if x.is_nil() { Ok(Datum::Nil) } else { inner(x) })
        }
        Schema::Seq { element_type } => {
            let element = build_walker(element_type, hook);
            Arc::new(move |x: &Datum| {
                let Datum::Seq(items) = x else {
                    return Err(ErrorSentinel::mismatch(Arc::clone(&this), x));
                };
                let mut walked = Vec::with_capacity(items.len());
                let mut failures = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    match element(item) {
                        Ok(v) => walked.push(v),
                        Err(e) => failures.push((PathSegment::Index(i), e)),
                    }
                }
                finish(&this, x, failures, Datum::Seq(walked))
            })
        }
        Schema::Set { element_type } => {
            let element = build_walker(element_type, hook);
            Arc::new(move |x: &Datum| {
                let Datum::Set(members) = x else {
                    return Err(ErrorSentinel::mismatch(Arc::clone(&this), x));
                };
                let mut walked = BTreeSet::new();
                let mut failures = Vec::new();
                for member in members {
                    match element(member) {
                        Ok(v) => {
                            walked.insert(v);
                        }
                        Err(e) => failures.push((PathSegment::Member(member.clone()), e)),
                    }
                }
                finish(&this, x, failures, Datum::Set(walked))
            })
        }
        Schema::Record { fields } => {
            let fields: Vec<(String, bool, Walker)> = fields
                .iter()
                .map(|(name, def)| (name.clone(), def.required, build_walker(&def.schema, hook)))
                .collect();
            Arc::new(move |x: &Datum| {
                let Datum::Map(entries) = x else {
                    return Err(ErrorSentinel::mismatch(Arc::clone(&this), x));
                };
                let mut walked = BTreeMap::new();
                let mut failures = Vec::new();

                // No undeclared keys
                for (key, value) in entries {
                    if !fields.iter().any(|(name, _, _)| name == key) {
                        failures.push((
                            PathSegment::Key(key.clone()),
                            ErrorSentinel::validation(
                                Arc::clone(&this),
                                value.clone(),
                                ErrorCause::DisallowedKey(key.clone()),
                            ),
                        ));
                    }
                }

                for (name, required, field) in &fields {
                    match entries.get(name) {
                        Some(value) => match field(value) {
                            Ok(v) => {
                                walked.insert(name.clone(), v);
                            }
                            Err(e) => failures.push((PathSegment::Key(name.clone()), e)),
                        },
                        None if *required => failures.push((
                            PathSegment::Key(name.clone()),
                            ErrorSentinel::validation(
                                Arc::clone(&this),
                                Datum::Nil,
                                ErrorCause::MissingKey(name.clone()),
                            ),
                        )),
                        None => {}
                    }
                }
                finish(&this, x, failures, Datum::Map(walked))
            })
        }
        Schema::MapOf { value_type } => {
            let values = build_walker(value_type, hook);
            Arc::new(move |x: &Datum| {
                let Datum::Map(entries) = x else {
                    return Err(ErrorSentinel::mismatch(Arc::clone(&this), x));
                };
                let mut walked = BTreeMap::new();
                let mut failures = Vec::new();
                for (key, value) in entries {
                    match values(value) {
                        Ok(v) => {
                            walked.insert(key.clone(), v);
                        }
                        Err(e) => failures.push((PathSegment::Key(key.clone()), e)),
                    }
                }
                finish(&this, x, failures, Datum::Map(walked))
            })
        }
        Schema::Either { branches } => {
            let branches: Vec<Walker> = branches.iter().map(|b| build_walker(b, hook)).collect();
            Arc::new(move |x: &Datum| {
                let mut failures = Vec::with_capacity(branches.len());
                for (i, branch) in branches.iter().enumerate() {
                    match branch(x) {
                        Ok(v) => return Ok(v),
                        Err(e) => failures.push((PathSegment::Branch(i), e)),
                    }
                }
                Err(ErrorSentinel::validation(
                    Arc::clone(&this),
                    x.clone(),
                    ErrorCause::Nested(failures),
                ))
            })
        }
    }
}

/// Walker for a scalar node that accepts values satisfying `accepts`.
fn predicate<P>(node: Arc<Schema>, accepts: P) -> Walker
where
    P: Fn(&Datum) -> bool + Send + Sync + 'static,
{
    Arc::new(move |x: &Datum| {
        if accepts(x) {
            Ok(x.clone())
        } else {
            Err(ErrorSentinel::mismatch(Arc::clone(&node), x))
        }
    })
}

/// Returns the reassembled value, or a sentinel nesting every child failure.
fn finish(
    node: &Arc<Schema>,
    input: &Datum,
    failures: Vec<(PathSegment, ErrorSentinel)>,
    walked: Datum,
) -> WalkResult {
    if failures.is_empty() {
        Ok(walked)
    } else {
        Err(ErrorSentinel::validation(
            Arc::clone(node),
            input.clone(),
            ErrorCause::Nested(failures),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ErrorCode;
    use crate::schema::types::FieldDef;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user_schema() -> Schema {
        Schema::record([
            ("name", FieldDef::required(Schema::Str)),
            ("age", FieldDef::optional(Schema::Int)),
            ("tags", FieldDef::optional(Schema::seq(Schema::Str))),
        ])
    }

    #[test]
    fn test_valid_record_passes() {
        let walk = walker(&user_schema());
        let doc = Datum::from(json!({ "name": "Alice", "age": 30, "tags": ["a"] }));
        assert_eq!(walk(&doc).unwrap(), doc);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let walk = walker(&user_schema());
        let err = walk(&Datum::from(json!({ "age": 30 }))).unwrap_err();
        let leaves = err.leaf_errors();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, ".name");
        assert!(matches!(leaves[0].1.cause(), ErrorCause::MissingKey(k) if k == "name"));
    }

    #[test]
    fn test_extra_field_fails() {
        let walk = walker(&user_schema());
        let err = walk(&Datum::from(json!({ "name": "Alice", "unknown": 1 }))).unwrap_err();
        let leaves = err.leaf_errors();
        assert_eq!(leaves[0].0, ".unknown");
        assert!(matches!(leaves[0].1.cause(), ErrorCause::DisallowedKey(_)));
    }

    #[test]
    fn test_array_element_failure_path() {
        let walk = walker(&user_schema());
        let err = walk(&Datum::from(json!({ "name": "A", "tags": ["a", 1, "b"] }))).unwrap_err();
        let leaves = err.leaf_errors();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, ".tags[1]");
        assert_eq!(leaves[0].1.value(), &Datum::Int(1));
        assert_eq!(leaves[0].1.code(), ErrorCode::SchemaValidationFailed);
    }

    #[test]
    fn test_int_rejects_double() {
        let walk = walker(&Schema::Int);
        assert!(walk(&Datum::Double(1.0)).is_err());
        assert!(walk(&Datum::Int(1)).is_ok());
    }

    #[test]
    fn test_num_accepts_both() {
        let walk = walker(&Schema::Num);
        assert!(walk(&Datum::Double(1.5)).is_ok());
        assert!(walk(&Datum::Int(1)).is_ok());
        assert!(walk(&Datum::string("1")).is_err());
    }

    #[test]
    fn test_maybe_accepts_nil() {
        let walk = walker(&Schema::maybe(Schema::Int));
        assert_eq!(walk(&Datum::Nil).unwrap(), Datum::Nil);
        assert_eq!(walk(&Datum::Int(3)).unwrap(), Datum::Int(3));
        assert!(walk(&Datum::string("3")).is_err());
    }

    #[test]
    fn test_enum_membership() {
        let walk = walker(&Schema::keyword_enum(["red", "green"]));
        assert!(walk(&Datum::keyword("red")).is_ok());
        let err = walk(&Datum::keyword("purple")).unwrap_err();
        assert!(matches!(err.cause(), ErrorCause::NotAllowed));
        assert_eq!(err.value(), &Datum::keyword("purple"));
    }

    #[test]
    fn test_eq_accepts_only_value() {
        let walk = walker(&Schema::exactly(Datum::keyword("on")));
        assert_eq!(walk(&Datum::keyword("on")).unwrap(), Datum::keyword("on"));

        let err = walk(&Datum::string("on")).unwrap_err();
        assert!(matches!(err.cause(), ErrorCause::NotAllowed));
        assert_eq!(err.code(), ErrorCode::SchemaValidationFailed);
        assert_eq!(err.schema(), &Schema::exactly(Datum::keyword("on")));
        assert_eq!(err.value(), &Datum::string("on"));
    }

    #[test]
    fn test_nil_rejects_non_nil() {
        let walk = walker(&Schema::Nil);
        assert_eq!(walk(&Datum::Nil).unwrap(), Datum::Nil);

        let err = walk(&Datum::Bool(false)).unwrap_err();
        assert!(matches!(
            err.cause(),
            ErrorCause::Mismatch {
                expected: "nil",
                actual: "bool"
            }
        ));
    }

    #[test]
    fn test_set_rejects_sequence() {
        let walk = walker(&Schema::set(Schema::Int));
        assert!(walk(&Datum::seq(vec![Datum::Int(1)])).is_err());
        assert!(walk(&Datum::set(vec![Datum::Int(1)])).is_ok());
    }

    #[test]
    fn test_either_first_branch_wins() {
        let walk = walker(&Schema::either([Schema::Int, Schema::Str]));
        assert!(walk(&Datum::Int(1)).is_ok());
        assert!(walk(&Datum::string("x")).is_ok());
        let err = walk(&Datum::Bool(true)).unwrap_err();
        assert_eq!(err.leaf_errors().len(), 2);
    }

    #[test]
    fn test_map_of_values() {
        let walk = walker(&Schema::map_of(Schema::Int));
        assert!(walk(&Datum::from(json!({ "a": 1, "b": 2 }))).is_ok());
        let err = walk(&Datum::from(json!({ "a": 1, "b": "2" }))).unwrap_err();
        assert_eq!(err.leaf_errors()[0].0, ".b");
    }

    #[test]
    fn test_hook_runs_once_per_node_at_build_time() {
        let calls = AtomicUsize::new(0);
        let hook = |_: &Arc<Schema>, native: Walker| {
            calls.fetch_add(1, Ordering::SeqCst);
            native
        };
        // record + name + age + tags + tags element
        let walk = build_walker(&user_schema(), &hook);
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        for _ in 0..10 {
            walk(&Datum::from(json!({ "name": "A" }))).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let walk = walker(&user_schema());
        let doc = Datum::from(json!({ "name": 1 }));
        for _ in 0..100 {
            assert!(walk(&doc).is_err());
        }
    }
}

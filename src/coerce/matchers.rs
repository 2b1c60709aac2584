//! Concrete coercions and matchers
//!
//! Conversions:
//! - string → keyword
//! - string → bool ("true" / "false", any case)
//! - number → int, only when lossless
//! - int → double
//! - string → number / int / double (textual encodings)
//! - string → uuid
//! - sequence → set
//!
//! Matchers:
//! - `keyword_enum_matcher`, `integer_enum_matcher`, `string_integer_enum_matcher`
//! - `set_matcher`
//! - `json_coercion_matcher`, `string_coercion_matcher`

use uuid::Uuid;

use super::config::{CoercionConfig, CoercionPolicy};
use super::errors::{CoercionError, CoercionResult};
use super::matcher::{coercion, CoercionFn, FirstMatcher};
use super::safe::safe;
use crate::schema::{Datum, Schema};

/// 2^63: doubles in [-2^63, 2^63) fit in an i64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

// =============================================================================
// Conversions
// =============================================================================

/// Converts text to a keyword; other values pass through.
pub fn string_to_keyword(x: &Datum) -> CoercionResult {
    match x {
        Datum::Str(s) => Ok(Datum::Keyword(s.clone())),
        other => Ok(other.clone()),
    }
}

/// Converts "true" / "false" (any case) to a bool; other values pass through.
///
/// Any other text is an error rather than `false`, so under `safe` the text
/// reaches the bool validator unchanged and is reported there.
pub fn string_to_bool(x: &Datum) -> CoercionResult {
    match x {
        Datum::Str(s) if s.eq_ignore_ascii_case("true") => Ok(Datum::Bool(true)),
        Datum::Str(s) if s.eq_ignore_ascii_case("false") => Ok(Datum::Bool(false)),
        Datum::Str(s) => Err(CoercionError::parse("bool", s, "expected true or false")),
        other => Ok(other.clone()),
    }
}

/// Casts a number to an integer, failing unless the cast is lossless.
///
/// Integers are returned unchanged. A double is accepted only if it is
/// finite, integral, and converts back to the same double.
pub fn long_cast(x: &Datum) -> CoercionResult {
    match x {
        Datum::Int(_) => Ok(x.clone()),
        Datum::Double(d) => {
            if !d.is_finite() || d.fract() != 0.0 || *d >= I64_BOUND || *d < -I64_BOUND {
                return Err(CoercionError::NotLossless(x.to_string()));
            }
            let cast = *d as i64;
            if cast as f64 == *d {
                Ok(Datum::Int(cast))
            } else {
                Err(CoercionError::NotLossless(x.to_string()))
            }
        }
        other => Err(CoercionError::unsupported("int", other)),
    }
}

/// Lossless integer cast that returns its input when the cast would lose
/// precision.
pub fn safe_long_cast() -> CoercionFn {
    safe(long_cast)
}

/// Widens an integer to a double
pub fn to_double(x: &Datum) -> CoercionResult {
    match x {
        Datum::Int(i) => Ok(Datum::Double(*i as f64)),
        Datum::Double(_) => Ok(x.clone()),
        other => Err(CoercionError::unsupported("double", other)),
    }
}

/// Parses a textual number: an integer if the text is one, else a double.
pub fn parse_number(x: &Datum) -> CoercionResult {
    let text = x
        .as_str()
        .ok_or_else(|| CoercionError::unsupported("num", x))?
        .trim();
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Datum::Int(i));
    }
    match text.parse::<f64>() {
        Ok(d) if d.is_finite() => Ok(Datum::Double(d)),
        Ok(_) => Err(CoercionError::parse("num", text, "not a finite number")),
        Err(e) => Err(CoercionError::parse("num", text, e)),
    }
}

/// Parses textual numbers, then casts losslessly to an integer.
///
/// Non-text numbers are cast directly.
pub fn parse_long(x: &Datum) -> CoercionResult {
    match x {
        Datum::Str(_) => long_cast(&parse_number(x)?),
        other => long_cast(other),
    }
}

/// Parses textual numbers as doubles; integers are widened.
pub fn parse_double(x: &Datum) -> CoercionResult {
    match x {
        Datum::Str(s) => {
            let text = s.trim();
            match text.parse::<f64>() {
                Ok(d) if d.is_finite() => Ok(Datum::Double(d)),
                Ok(_) => Err(CoercionError::parse("double", text, "not a finite number")),
                Err(e) => Err(CoercionError::parse("double", text, e)),
            }
        }
        other => to_double(other),
    }
}

/// Parses a textual UUID
pub fn string_to_uuid(x: &Datum) -> CoercionResult {
    match x {
        Datum::Str(s) => Uuid::parse_str(s.trim())
            .map(Datum::Uuid)
            .map_err(|e| CoercionError::parse("uuid", s, e)),
        other => Ok(other.clone()),
    }
}

/// Converts any sequence to a set; other values pass through.
pub fn sequence_to_set(x: &Datum) -> CoercionResult {
    match x {
        Datum::Seq(items) => Ok(Datum::Set(items.iter().cloned().collect())),
        other => Ok(other.clone()),
    }
}

// =============================================================================
// Matchers
// =============================================================================

/// Returns `coercion` for enum nodes whose every allowed value satisfies
/// `accepts`. An eq node is an enum of its single value.
pub fn enum_matcher<P>(schema: &Schema, accepts: P, coercion: CoercionFn) -> Option<CoercionFn>
where
    P: Fn(&Datum) -> bool,
{
    let matched = match schema {
        Schema::Eq { value } => accepts(value),
        _ => schema.enum_values()?.iter().all(accepts),
    };
    matched.then_some(coercion)
}

/// Coerces text to keywords for enums of keywords
pub fn keyword_enum_matcher(schema: &Schema) -> Option<CoercionFn> {
    enum_matcher(
        schema,
        |v| matches!(v, Datum::Keyword(_)),
        coercion(string_to_keyword),
    )
}

/// Casts numbers losslessly for enums of integers
pub fn integer_enum_matcher(schema: &Schema) -> Option<CoercionFn> {
    enum_matcher(schema, |v| matches!(v, Datum::Int(_)), safe_long_cast())
}

/// Parses textual integers for enums of integers
pub fn string_integer_enum_matcher(schema: &Schema) -> Option<CoercionFn> {
    enum_matcher(schema, |v| matches!(v, Datum::Int(_)), safe(parse_long))
}

/// Converts sequences to sets for set nodes
pub fn set_matcher(schema: &Schema) -> Option<CoercionFn> {
    schema.is_set().then(|| coercion(sequence_to_set))
}

/// Matcher for data decoded from JSON.
///
/// JSON has no keywords, sets or uuids, and encodes integers as numbers that
/// may arrive as doubles. Text is not parsed as numbers: JSON encodes numbers
/// natively, so a string where a number is expected is a validation error.
pub fn json_coercion_matcher() -> FirstMatcher {
    CoercionConfig::new(CoercionPolicy::Json).matcher()
}

/// Matcher for data where every scalar arrives as text (query strings,
/// form fields, environment variables).
pub fn string_coercion_matcher() -> FirstMatcher {
    CoercionConfig::new(CoercionPolicy::String).matcher()
}

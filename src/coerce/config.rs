//! Coercion configuration
//!
//! Selects a coercion policy and the helper matchers layered behind its
//! table, and assembles the corresponding matcher once.

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::matcher::{CoercionFn, FirstMatcher};
use super::matchers::{
    integer_enum_matcher, keyword_enum_matcher, set_matcher, string_integer_enum_matcher,
};
use super::table::CoercionTable;
use crate::schema::Schema;

/// Which coercion table to start from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Data decoded from JSON
    #[default]
    Json,
    /// Data where every scalar is text
    String,
}

/// Coercion matcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionConfig {
    /// Base table (default: json)
    #[serde(default)]
    pub policy: CoercionPolicy,

    /// Coerce text for enums of keywords (default: true)
    #[serde(default = "default_true")]
    pub keyword_enums: bool,

    /// Coerce numbers for enums of integers (default: true)
    #[serde(default = "default_true")]
    pub integer_enums: bool,

    /// Convert sequences to sets for set nodes (default: true for json,
    /// false for string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self::new(CoercionPolicy::default())
    }
}

impl CoercionConfig {
    /// Create a config with the policy's default helpers
    pub fn new(policy: CoercionPolicy) -> Self {
        Self {
            policy,
            keyword_enums: true,
            integer_enums: true,
            sets: None,
        }
    }

    /// Parse a config from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Whether the set matcher is enabled
    pub fn sets_enabled(&self) -> bool {
        self.sets
            .unwrap_or(matches!(self.policy, CoercionPolicy::Json))
    }

    /// Returns the base table for the policy
    pub fn table(&self) -> CoercionTable {
        match self.policy {
            CoercionPolicy::Json => CoercionTable::json(),
            CoercionPolicy::String => CoercionTable::string(),
        }
    }

    /// Assembles the matcher: table first, then the enabled helpers in order
    /// keyword enums, integer enums, sets.
    pub fn matcher(&self) -> FirstMatcher {
        let mut matcher = FirstMatcher::new().then(self.table());

        if self.keyword_enums {
            matcher = matcher.then(keyword_enum_matcher);
        }
        if self.integer_enums {
            let integers: fn(&Schema) -> Option<CoercionFn> = match self.policy {
                CoercionPolicy::Json => integer_enum_matcher,
                CoercionPolicy::String => string_integer_enum_matcher,
            };
            matcher = matcher.then(integers);
        }
        if self.sets_enabled() {
            matcher = matcher.then(set_matcher);
        }

        matcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::matcher::CoercionMatcher;
    use crate::schema::Datum;

    #[test]
    fn test_default_config() {
        let config = CoercionConfig::default();
        assert_eq!(config.policy, CoercionPolicy::Json);
        assert!(config.keyword_enums);
        assert!(config.integer_enums);
        assert!(config.sets_enabled());
        assert_eq!(config.matcher().len(), 4);
    }

    #[test]
    fn test_string_policy_disables_sets() {
        let config = CoercionConfig::new(CoercionPolicy::String);
        assert!(!config.sets_enabled());
        assert_eq!(config.matcher().len(), 3);
    }

    #[test]
    fn test_from_json_defaults() {
        let config = CoercionConfig::from_json_str(r#"{ "policy": "string" }"#).unwrap();
        assert_eq!(config, CoercionConfig::new(CoercionPolicy::String));
    }

    #[test]
    fn test_from_json_overrides() {
        let config = CoercionConfig::from_json_str(
            r#"{ "policy": "string", "keyword_enums": false, "sets": true }"#,
        )
        .unwrap();
        assert!(!config.keyword_enums);
        assert!(config.sets_enabled());

        let m = config.matcher();
        assert!(m.coercion_for(&Schema::keyword_enum(["a"])).is_none());
        assert!(m.coercion_for(&Schema::set(Schema::Int)).is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CoercionConfig::from_json_str(r#"{ "policy": "xml" }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_integer_enum_follows_policy() {
        let levels = Schema::enumeration([Datum::Int(1), Datum::Int(2)]);

        let json = CoercionConfig::new(CoercionPolicy::Json).matcher();
        let c = json.coercion_for(&levels).unwrap();
        assert_eq!(c(&Datum::string("2")).unwrap(), Datum::string("2"));

        let string = CoercionConfig::new(CoercionPolicy::String).matcher();
        let c = string.coercion_for(&levels).unwrap();
        assert_eq!(c(&Datum::string("2")).unwrap(), Datum::Int(2));
    }
}

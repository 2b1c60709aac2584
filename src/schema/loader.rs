//! Schema loader for named, versioned schema definitions
//!
//! - Definitions stored at <schema_dir>/schema_<id>_<version>.json
//! - One file per schema version
//! - Registered versions are immutable

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::errors::{LoaderError, LoaderResult};
use super::types::Schema;

/// A schema with its identity, as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Unique schema identifier
    pub schema_id: String,
    /// Schema version
    pub schema_version: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Root schema node
    pub schema: Schema,
}

impl SchemaDefinition {
    pub fn new(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
        schema: Schema,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            description: None,
            schema,
        }
    }

    /// Returns the unique key for this definition (id, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.schema_id, &self.schema_version)
    }
}

/// Reads schema definition files from disk and keeps an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing definition files
    schema_dir: PathBuf,
    /// Loaded definitions indexed by (schema_id, schema_version)
    schemas: HashMap<(String, String), SchemaDefinition>,
}

impl SchemaLoader {
    /// Creates a loader reading from `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `.json` definition in the schema directory.
    ///
    /// A missing directory loads nothing. A malformed file, or a file that
    /// redefines an already registered version, fails the whole load.
    pub fn load_all(&mut self) -> LoaderResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| LoaderError::Io {
            path: self.schema_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoaderError::Io {
                path: self.schema_dir.display().to_string(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }

        // Directory order is platform dependent
        paths.sort();
        for path in paths {
            self.load_schema_file(&path)?;
        }

        Ok(())
    }

    fn load_schema_file(&mut self, path: &Path) -> LoaderResult<()> {
        trace!(path = %path.display(), "loading schema definition");

        let content = fs::read_to_string(path).map_err(|e| LoaderError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let definition: SchemaDefinition =
            serde_json::from_str(&content).map_err(|e| LoaderError::Malformed {
                path: path.display().to_string(),
                reason: format!("Invalid JSON: {}", e),
            })?;

        self.register(definition)
    }

    /// Registers a definition directly.
    pub fn register(&mut self, definition: SchemaDefinition) -> LoaderResult<()> {
        let key = (
            definition.schema_id.clone(),
            definition.schema_version.clone(),
        );

        if self.schemas.contains_key(&key) {
            return Err(LoaderError::Immutable {
                schema_id: key.0,
                schema_version: key.1,
            });
        }

        self.schemas.insert(key, definition);
        Ok(())
    }

    /// Gets a definition by ID and version.
    pub fn get(&self, schema_id: &str, schema_version: &str) -> Option<&SchemaDefinition> {
        self.schemas
            .get(&(schema_id.to_string(), schema_version.to_string()))
    }

    /// Resolves the root schema of a definition.
    ///
    /// Distinguishes an unknown schema ID from an unknown version of a
    /// known ID.
    pub fn resolve(&self, schema_id: &str, schema_version: &str) -> LoaderResult<&Schema> {
        if !self.schema_id_exists(schema_id) {
            return Err(LoaderError::UnknownSchema(schema_id.to_string()));
        }

        self.get(schema_id, schema_version)
            .map(|d| &d.schema)
            .ok_or_else(|| LoaderError::UnknownVersion {
                schema_id: schema_id.to_string(),
                schema_version: schema_version.to_string(),
            })
    }

    /// Checks if a definition exists.
    pub fn exists(&self, schema_id: &str, schema_version: &str) -> bool {
        self.get(schema_id, schema_version).is_some()
    }

    /// Checks if any version of a schema ID exists.
    pub fn schema_id_exists(&self, schema_id: &str) -> bool {
        self.schemas.keys().any(|(id, _)| id == schema_id)
    }

    /// Returns the number of loaded definitions.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldDef;
    use tempfile::TempDir;

    fn sample_definition() -> SchemaDefinition {
        SchemaDefinition::new(
            "users",
            "v1",
            Schema::record([
                ("name", FieldDef::required(Schema::Str)),
                ("age", FieldDef::optional(Schema::Int)),
            ]),
        )
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register(sample_definition()).unwrap();

        let definition = loader.get("users", "v1");
        assert!(definition.is_some());
        assert_eq!(definition.unwrap().key(), ("users", "v1"));
    }

    #[test]
    fn test_schema_immutability() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register(sample_definition()).unwrap();

        let result = loader.register(sample_definition());
        assert!(matches!(result, Err(LoaderError::Immutable { .. })));
    }

    #[test]
    fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let content = serde_json::to_string(&sample_definition()).unwrap();
        fs::write(temp_dir.path().join("schema_users_v1.json"), content).unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        assert!(loader.exists("users", "v1"));
        assert_eq!(loader.get("users", "v1").unwrap(), &sample_definition());
    }

    #[test]
    fn test_duplicate_version_on_disk_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        let content = serde_json::to_string(&sample_definition()).unwrap();
        fs::write(temp_dir.path().join("schema_users_v1.json"), &content).unwrap();
        fs::write(temp_dir.path().join("schema_users_v1_copy.json"), &content).unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let result = loader.load_all();
        assert!(matches!(result, Err(LoaderError::Immutable { .. })));
    }

    #[test]
    fn test_resolve_unknown_schema_and_version() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.register(sample_definition()).unwrap();

        assert!(loader.resolve("users", "v1").is_ok());
        assert!(matches!(
            loader.resolve("nonexistent", "v1"),
            Err(LoaderError::UnknownSchema(_))
        ));
        assert!(matches!(
            loader.resolve("users", "v999"),
            Err(LoaderError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn test_malformed_file_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("schema_bad_v1.json"), "{ not json").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let result = loader.load_all();
        assert!(matches!(result, Err(LoaderError::Malformed { .. })));
    }

    #[test]
    fn test_non_json_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.txt"), "notes").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.load_all().unwrap();
        assert_eq!(loader.schema_count(), 0);
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("absent"));

        assert!(loader.load_all().is_ok());
        assert_eq!(loader.schema_count(), 0);
    }
}

//! Configuration management for schema-tree
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-tree.toml)
//! - Environment variables (SCHEMA_TREE__*)
//!
//! ## Example config file (schema-tree.toml):
//! ```toml
//! [input]
//! path = "schema.txt"
//!
//! [output]
//! dir = "site/data"
//! tree_file = "tree.json"
//! search_file = "search.json"
//! format = "pretty"
//! include_properties = false
//!
//! [parse]
//! strict = false
//!
//! [tree]
//! cycles = "fail"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tree::CycleHandling;

/// Main configuration for schema-tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaTreeConfig {
    /// Schema source settings
    #[serde(default)]
    pub input: InputConfig,

    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Parser settings
    #[serde(default)]
    pub parse: ParseConfig,

    /// Tree builder settings
    #[serde(default)]
    pub tree: TreeConfig,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Schema file to read
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the JSON files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name of the navigation tree
    #[serde(default = "default_tree_file")]
    pub tree_file: String,

    /// File name of the search index
    #[serde(default = "default_search_file")]
    pub search_file: String,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Attach parsed properties to search entries
    #[serde(default)]
    pub include_properties: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Parser configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Fail when any malformed span was skipped
    #[serde(default)]
    pub strict: bool,
}

/// Tree builder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeConfig {
    /// What to do with classes caught in an inheritance cycle
    #[serde(default)]
    pub cycles: CycleHandling,
}

// Default value functions
fn default_input_path() -> PathBuf {
    PathBuf::from("schema.txt")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tree_file() -> String {
    "tree.json".to_string()
}

fn default_search_file() -> String {
    "search.json".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            tree_file: default_tree_file(),
            search_file: default_search_file(),
            format: OutputFormat::Pretty,
            include_properties: false,
        }
    }
}

impl SchemaTreeConfig {
    /// Load configuration from the default locations, with an optional file on top
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "schema-tree.toml",
            ".schema-tree.toml",
            "config/schema-tree.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-tree") {
            let xdg_config = config_dir.config_dir().join("schema-tree.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Load from environment variables (SCHEMA_TREE__*)
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_TREE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path of the navigation tree output
    pub fn tree_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.tree_file)
    }

    /// Full path of the search index output
    pub fn search_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.search_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    #[test]
    fn test_default_config() {
        let config = SchemaTreeConfig::default();
        assert_eq!(config.input.path, PathBuf::from("schema.txt"));
        assert_eq!(config.tree_path(), PathBuf::from("./tree.json"));
        assert_eq!(config.search_path(), PathBuf::from("./search.json"));
        assert_eq!(config.output.format, OutputFormat::Pretty);
        assert!(!config.output.include_properties);
        assert!(!config.parse.strict);
        assert_eq!(config.tree.cycles, CycleHandling::Fail);
    }

    #[test]
    fn test_serialize_config() {
        let config = SchemaTreeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("cycles = \"fail\""));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");

        let mut config = SchemaTreeConfig::default();
        config.input.path = PathBuf::from("ontology/schema.txt");
        config.output.format = OutputFormat::Compact;
        config.tree.cycles = CycleHandling::Omit;
        config.save(&path).unwrap();

        let loaded = SchemaTreeConfig::load_from(Some(path.as_path())).unwrap();
        assert_eq!(loaded.input.path, PathBuf::from("ontology/schema.txt"));
        assert_eq!(loaded.output.format, OutputFormat::Compact);
        assert_eq!(loaded.tree.cycles, CycleHandling::Omit);
        assert_eq!(loaded.output.tree_file, "tree.json");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[parse]\nstrict = true\n").unwrap();

        let loaded = SchemaTreeConfig::load_from(Some(path.as_path())).unwrap();
        assert!(loaded.parse.strict);
        assert_eq!(loaded.output.search_file, "search.json");
    }

    #[test]
    fn test_bad_config_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[tree]\ncycles = \"sometimes\"\n").unwrap();

        let err = SchemaTreeConfig::load_from(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            SchemaTreeConfig::load_from(Some(missing.as_path())),
            Err(SchemaError::Config(_))
        ));
    }

    #[test]
    fn test_save_into_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/config.toml");
        let err = SchemaTreeConfig::default().save(&path).unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}

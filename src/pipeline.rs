//! Generation pipeline
//!
//! read -> parse -> build -> serialize -> write, in one sequential pass.
//! [`generate`] is pure; [`Artifacts::write`] and [`read_schema`] are the
//! only functions touching the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{OutputFormat, SchemaTreeConfig};
use crate::error::{Result, SchemaError};
use crate::parser::{parse, Diagnostics};
use crate::search::{build_search_index, build_search_index_with_properties, SearchEntry};
use crate::tree::{CycleHandling, TreeBuilder, TreeNode};

/// Knobs for a single generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Attach parsed properties to search entries
    pub include_properties: bool,
    /// Reject the schema if any malformed span was skipped
    pub strict: bool,
    pub cycles: CycleHandling,
}

impl From<&SchemaTreeConfig> for GenerateOptions {
    fn from(config: &SchemaTreeConfig) -> Self {
        Self {
            include_properties: config.output.include_properties,
            strict: config.parse.strict,
            cycles: config.tree.cycles,
        }
    }
}

/// The two derived structures plus what the parser skipped
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub tree: Vec<TreeNode>,
    pub search: Vec<SearchEntry>,
    pub diagnostics: Diagnostics,
}

/// Run parser and tree builder over schema text.
///
/// Diagnostics are handed back in [`Artifacts`] for the caller to show; only
/// their count is logged here.
pub fn generate(text: &str, options: &GenerateOptions) -> Result<Artifacts> {
    let outcome = parse(text);

    if options.strict && outcome.diagnostics.has_errors() {
        return Err(SchemaError::Rejected {
            errors: outcome.diagnostics.error_count(),
        });
    }

    let tree = TreeBuilder::new(&outcome.classes)
        .with_cycle_handling(options.cycles)
        .build()?;

    let search = if options.include_properties {
        build_search_index_with_properties(&outcome.classes)
    } else {
        build_search_index(&outcome.classes)
    };

    info!(
        classes = outcome.classes.len(),
        roots = tree.len(),
        skipped = outcome.diagnostics.len(),
        "generated schema artifacts"
    );

    Ok(Artifacts {
        tree,
        search,
        diagnostics: outcome.diagnostics,
    })
}

/// Read a schema file, keeping the path in the error
pub fn read_schema(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading schema");
    fs::read_to_string(path).map_err(|source| SchemaError::ReadSchema {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize any output structure in the configured format
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

impl Artifacts {
    pub fn tree_json(&self, format: OutputFormat) -> Result<String> {
        to_json(&self.tree, format)
    }

    pub fn search_json(&self, format: OutputFormat) -> Result<String> {
        to_json(&self.search, format)
    }

    /// Write both JSON files, creating the parent directories as needed
    pub fn write(&self, tree_path: &Path, search_path: &Path, format: OutputFormat) -> Result<()> {
        write_file(tree_path, &self.tree_json(format)?)?;
        write_file(search_path, &self.search_json(format)?)?;
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let wrap = |source| SchemaError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, content).map_err(wrap)?;
    debug!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

/// Paths written by [`run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub tree: PathBuf,
    pub search: PathBuf,
}

/// Full driver step: read the configured schema, generate, write both files
pub fn run(config: &SchemaTreeConfig) -> Result<(Artifacts, Written)> {
    let text = read_schema(&config.input.path)?;
    let artifacts = generate(&text, &GenerateOptions::from(config))?;

    let written = Written {
        tree: config.tree_path(),
        search: config.search_path(),
    };
    artifacts.write(&written.tree, &written.search, config.output.format)?;

    Ok((artifacts, written))
}

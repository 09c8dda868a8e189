//! schema-tree
//!
//! Turns a small class schema into the two data files a schema explorer
//! needs: a navigation tree and a flat search index.
//!
//! ## Schema format
//!
//! ```text
//! class Dog extends Animal {
//! *name String;
//! *age Integer;
//! }.
//! class Animal .
//! class Cat extends Animal .
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! schema.txt ──parse──▶ ClassMapping ──TreeBuilder──▶ tree.json
//!                            │
//!                            └──build_search_index──▶ search.json
//! ```
//!
//! Parsing is lenient: anything that does not look like a declaration is
//! skipped and reported in [`parser::Diagnostics`]. Inheritance cycles are
//! detected instead of recursing forever.

pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod search;
pub mod tree;

pub use config::{OutputFormat, SchemaTreeConfig};
pub use error::{Result, SchemaError};
pub use parser::{parse, Diagnostic, DiagnosticCode, Diagnostics, ParseOutcome, Severity};
pub use pipeline::{generate, Artifacts, GenerateOptions};
pub use schema::{ClassDeclaration, ClassMapping, PropertyDeclaration};
pub use search::{build_search_index, fuzzy_search, SearchEntry, SearchResult};
pub use tree::{build_forest, CycleHandling, TreeBuilder, TreeNode};

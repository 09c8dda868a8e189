//! Schema Tree CLI
//!
//! Generates `tree.json` and `search.json` from a class schema, checks a
//! schema for skipped spans, or searches its class names.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schema_tree::config::OutputFormat;
use schema_tree::pipeline::{self, read_schema};
use schema_tree::search::{build_search_index, fuzzy_search};
use schema_tree::{parse, CycleHandling, SchemaTreeConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-tree")]
#[command(about = "Generate navigation tree and search index JSON from a class schema")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write tree.json and search.json (the default)
    Generate(GenerateArgs),

    /// Parse only and report skipped spans
    Check {
        /// Schema file (defaults to the configured input)
        input: Option<PathBuf>,
    },

    /// Fuzzy-search class names
    Search {
        /// Text to look for
        query: String,

        /// Schema file (defaults to the configured input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// Schema file (defaults to schema.txt)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Tree file name
    #[arg(long)]
    tree_file: Option<String>,

    /// Search index file name
    #[arg(long)]
    search_file: Option<String>,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Attach parsed properties to search entries
    #[arg(long)]
    with_properties: bool,

    /// Fail if any malformed declaration was skipped
    #[arg(long)]
    strict: bool,

    /// Leave classes in inheritance cycles out instead of failing
    #[arg(long)]
    allow_cycles: bool,
}

impl GenerateArgs {
    fn apply(self, config: &mut SchemaTreeConfig) {
        if let Some(input) = self.input {
            config.input.path = input;
        }
        if let Some(dir) = self.out_dir {
            config.output.dir = dir;
        }
        if let Some(tree_file) = self.tree_file {
            config.output.tree_file = tree_file;
        }
        if let Some(search_file) = self.search_file {
            config.output.search_file = search_file;
        }
        if self.compact {
            config.output.format = OutputFormat::Compact;
        }
        if self.with_properties {
            config.output.include_properties = true;
        }
        if self.strict {
            config.parse.strict = true;
        }
        if self.allow_cycles {
            config.tree.cycles = CycleHandling::Omit;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SchemaTreeConfig::load_from(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Generate(GenerateArgs::default())) {
        Commands::Generate(args) => {
            args.apply(&mut config);
            let (artifacts, written) = pipeline::run(&config)?;

            for diagnostic in &artifacts.diagnostics {
                eprintln!("⚠️  {}:{}", config.input.path.display(), diagnostic);
            }
            println!("  Tree:   {:?}", written.tree);
            println!("  Search: {:?}", written.search);
            println!("JSON files generated successfully.");
        }

        Commands::Check { input } => {
            let path = input.unwrap_or_else(|| config.input.path.clone());
            let outcome = parse(&read_schema(&path)?);

            for diagnostic in &outcome.diagnostics {
                println!("{}:{}", path.display(), diagnostic);
            }

            let errors = outcome.diagnostics.error_count();
            let warnings = outcome.diagnostics.len() - errors;
            println!(
                "📊 {} classes, {} errors, {} warnings",
                outcome.classes.len(),
                errors,
                warnings
            );

            if errors > 0 {
                std::process::exit(1);
            }
            println!("✅ Schema is clean");
        }

        Commands::Search { query, input, limit } => {
            let path = input.unwrap_or_else(|| config.input.path.clone());
            let outcome = parse(&read_schema(&path)?);
            let index = build_search_index(&outcome.classes);

            let results = fuzzy_search(&index, &query, limit);
            if results.is_empty() {
                println!("No classes match '{}'", query);
            }
            for result in results {
                println!("{:>5}  {}", result.score, result.id);
            }
        }
    }

    Ok(())
}

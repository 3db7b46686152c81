//! folio: query the structure of markdown and data documents.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use folio::config::Config;
use folio::error::EvalError;
use folio::query::ast::{Expr, Literal};
use folio::tree::TreeMode;
use folio::{query, Engine, Value};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Structural queries over markdown and data documents", long_about = None)]
struct Args {
    /// File or directory to query
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Query to run, e.g. '.headings(2) | map(.text)'; defaults to .tree
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// File extensions to match when PATH is a directory
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

/// What a query means when PATH is a directory.
enum DirCommand {
    Tree(TreeMode),
    Search(String),
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = Config::load();

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions = args.ext;
    }

    let engine = Engine::with_config(cfg);
    let query_text = args.query.as_deref().unwrap_or(".tree");

    if args.path.is_dir() {
        let output = match directory_command(query_text)? {
            DirCommand::Tree(mode) => {
                let tree = engine.tree_dir(&args.path, mode)?;
                if args.json {
                    serde_json::to_string_pretty(&tree.to_string())?
                } else {
                    tree.to_string()
                }
            }
            DirCommand::Search(term) => {
                let results = engine.search_dir(&args.path, &term)?;
                if args.json {
                    serde_json::to_string_pretty(&results)?
                } else {
                    results.to_string()
                }
            }
        };
        println!("{}", output.trim_end());
        return Ok(());
    }

    let doc = engine.load(&args.path)?;
    let value = engine.query(&doc, query_text)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_value(&value);
    }
    Ok(())
}

/// Directories accept `.tree`, `.tree("mode")` and `.search("term")`.
fn directory_command(query_text: &str) -> folio::Result<DirCommand> {
    let unsupported = || EvalError::InvalidArgument {
        name: "directory query".to_string(),
        message: "expected .tree, .tree(\"mode\") or .search(\"term\")".to_string(),
    };
    let Expr::Selector { name, args } = query::parse(query_text)? else {
        return Err(unsupported().into());
    };
    match (name.as_str(), args.as_slice()) {
        ("tree", []) => Ok(DirCommand::Tree(TreeMode::Default)),
        ("tree", [Expr::Literal(Literal::String(mode))]) => mode
            .parse()
            .map(DirCommand::Tree)
            .map_err(|e: folio::tree::UnknownMode| {
                EvalError::InvalidArgument {
                    name: "tree".to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
        ("search", [Expr::Literal(Literal::String(term))]) => Ok(DirCommand::Search(term.clone())),
        _ => Err(unsupported().into()),
    }
}

fn print_value(value: &Value<'_>) {
    match value {
        Value::Array(items) => {
            for item in items {
                println!("{}", item.to_string().trim_end());
            }
        }
        other => println!("{}", other.to_string().trim_end()),
    }
}

//! Parses a JSON document with the combinator framework and prints it back
//! through `serde_json`.
//!
//! ```bash
//! json-parser data.json --pretty
//! echo '[1, 2, {"a": null}]' | json-parser
//! ```

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use grammar_example::json;
use miette::{IntoDiagnostic, NamedSource, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "json-parser", about = "Parse JSON with the combinator framework")]
struct Args {
    /// File to parse; standard input when omitted.
    file: Option<PathBuf>,

    /// Pretty-print the result.
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (name, text) = match &args.file {
        Some(path) => (
            path.display().to_string(),
            std::fs::read_to_string(path).into_diagnostic()?,
        ),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
            ("<stdin>".to_string(), text)
        }
    };

    let value = json::parse(&text)
        .map_err(|err| miette::Report::new(err).with_source_code(NamedSource::new(name, text.clone())))?;
    let output = if args.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .into_diagnostic()?;
    println!("{output}");
    Ok(())
}

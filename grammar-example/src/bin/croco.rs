//! The croco parser.
//!
//! With a file argument, parses the whole file and prints its tree. Without
//! one, starts an interactive session that reads one statement at a time.
//!
//! ```bash
//! croco program.croco
//! croco --start EXPRESSION program.croco
//! croco            # interactive
//! RUST_LOG=combinator_framework=trace croco program.croco
//! ```

use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use combinator_framework::PromptConfig;
use grammar_example::{croco, repl};
use miette::{IntoDiagnostic, NamedSource, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "croco", about = "Parse croco programs")]
struct Args {
    /// Program to parse; starts an interactive session when omitted.
    file: Option<PathBuf>,

    /// Rule to start from instead of `start`.
    #[arg(short, long, value_name = "RULE")]
    start: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();

    let grammar = croco::grammar()?;

    let Some(path) = &args.file else {
        let stdin = io::stdin();
        repl::run(
            &grammar,
            BufReader::new(stdin.lock()),
            io::stdout(),
            PromptConfig::default(),
            croco::render,
        )
        .into_diagnostic()?;
        return Ok(());
    };

    let name = path.display().to_string();
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let mut run = grammar.run();
    if let Some(start) = &args.start {
        run = run.start(start.clone());
    }
    let value = run
        .parse(&text)
        .map_err(|err| miette::Report::new(err).with_source_code(NamedSource::new(name, text.clone())))?;
    println!("{}", croco::render(&value));
    Ok(())
}

//! argtree-proxy binary entry point.
//!
//! Parses the launcher's command line, resolves the proxy settings and
//! prints or checks them. Parse errors exit with status 2 after printing the
//! usage of the innermost invoked command.

mod cli;
mod settings;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use argtree::{Message, ParserConfig};
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: i64) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

/// Program token reduced to its file name, so usage reads `argtree-proxy`.
fn program_args() -> Vec<String> {
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(program) = args.first_mut() {
        if let Some(name) = Path::new(program.as_str()).file_name() {
            *program = name.to_string_lossy().into_owned();
        }
    }
    args
}

fn run() -> Result<ExitCode> {
    let (mut parser, handles) =
        cli::declare(ParserConfig::new()).context("declaring command-line arguments")?;

    if let Err(err) = parser.parse(program_args()) {
        let usage = parser.render_usage(parser.root(), Some(Message::from(&err)));
        eprint!("{}", usage);
        return Ok(ExitCode::from(2));
    }
    if parser.help_requested().is_some() {
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(*parser.get(&handles.verbose));
    let settings = settings::resolve(&parser, &handles, |key| std::env::var(key).ok())?;

    let invoked = parser.invoked_command();
    if invoked == handles.show {
        match parser.get(&handles.format).as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&settings)?),
            _ => print!("{}", settings),
        }
    } else if invoked == handles.check {
        println!("configuration ok");
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

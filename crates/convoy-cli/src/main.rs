//! convoy CLI entry point.
//!
//! Usage:
//!   convoy resolve [FLAGS] <INPUTS>...   # resolve patterns to file paths
//!   convoy expand <PATTERN>              # textual brace/bracket expansion
//!   convoy match <PATTERN> <PATH>        # test a glob against a path

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use convoy_cli::Cli;

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match convoy_cli::run(cli, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

//! # quack CLI
//!
//! Binary entry point for the `quack` command-line tool. It parses arguments
//! with `clap` and hands off to the library; the binary stays a thin wrapper
//! around the engine in `lib.rs`.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}

//! Binary entry point for looplog CLI

use anyhow::Result;
use clap::Parser;
use looplog_cli::Main as _;

fn main() -> Result<()> {
    looplog_cli::Cli::parse().main()
}

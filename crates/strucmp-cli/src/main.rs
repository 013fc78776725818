use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod request;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    commands::run_command(cli)
}

use std::process::ExitCode;

use clap::Parser;

mod shell;

fn main() -> anyhow::Result<ExitCode> {
    let args = shell::cli::Args::parse();
    shell::run(args)
}

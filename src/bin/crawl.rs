use anyhow::Result;
use clap::Parser;
use log::error;
use std::process::ExitCode;
use vortcrawl::{run_crawler, Cli};

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run_crawler(cli.build_controls()) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

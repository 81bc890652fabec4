mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    cli::run(cli::Cli::parse())
}

mod cli;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use dashstate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dashstate::observability::init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Run(args) => server::run(config, args.address).await?,
        Commands::Once(args) => server::once(config, args.send).await?,
        Commands::Config => print!("{}", toml::to_string_pretty(&config)?),
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "dashstate")]
#[command(about = "Collects dashboard state from media apps and download clients", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dashboard timer and the HTTP API
    Run(RunArgs),
    /// Collect one snapshot and print it as JSON
    Once(OnceArgs),
    /// Print the effective configuration as TOML (secrets omitted)
    Config,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Address to bind the HTTP API to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct OnceArgs {
    /// Also deliver the snapshot through the configured transport
    #[arg(long)]
    pub send: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_address() {
        let cli = Cli::try_parse_from(["dashstate", "run", "--address", "127.0.0.1:9999"]).unwrap();
        match cli.command {
            Commands::Run(args) => assert_eq!(args.address.unwrap().port(), 9999),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_once_send() {
        let cli = Cli::try_parse_from(["dashstate", "once", "--send"]).unwrap();
        assert!(matches!(cli.command, Commands::Once(OnceArgs { send: true })));
    }
}

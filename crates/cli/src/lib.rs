use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "auctionx")]
#[command(about = "OpenAuction - an auction backend core with optimistic bid placement")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a concurrent bidding simulation against the in-process engine
    Simulate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "auction.yaml")]
        config: PathBuf,

        /// Number of auctions to run
        #[arg(long, default_value_t = 4)]
        auctions: usize,

        /// Number of concurrent bidders per auction
        #[arg(long, default_value_t = 8)]
        bidders: usize,

        /// Number of bids each bidder attempts
        #[arg(long, default_value_t = 10)]
        bids: usize,
    },

    /// Validate a configuration file without running anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "auction.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "auction.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["auctionx", "simulate"]).unwrap();
        match cli.command {
            Commands::Simulate {
                auctions,
                bidders,
                bids,
                ..
            } => {
                assert_eq!(auctions, 4);
                assert_eq!(bidders, 8);
                assert_eq!(bids, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validate_takes_config_path() {
        let cli = Cli::try_parse_from(["auctionx", "validate", "--config", "custom.yaml"]).unwrap();
        match cli.command {
            Commands::Validate { config } => {
                assert_eq!(config, PathBuf::from("custom.yaml"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

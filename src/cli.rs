use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analyzer::Severity;

#[derive(Parser)]
#[command(name = "contract-auditor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan smart contracts for known vulnerability patterns")]
#[command(long_about = "Scans Solidity and Solana/Rust contract source for insecure coding patterns. Source can be read from a file or fetched from a block explorer by address; the target chain is detected automatically and platform-specific rules are applied on top of the base catalog.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logging and the analyze/fetch report; errors, --json output and the exit status remain
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format where applicable
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a contract source file
    Analyze {
        /// Path to the contract source (.sol, .rs, ...)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Explorer or origin URL, used as a chain hint
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Only report findings at or above this severity
        #[arg(long, value_enum)]
        min_severity: Option<SeverityThreshold>,

        /// Exit with status 2 when findings at or above this severity remain
        #[arg(long, value_enum)]
        fail_on: Option<SeverityThreshold>,
    },

    /// Fetch verified source by address (or explorer URL) and optionally analyze it
    Fetch {
        /// Contract address, or an explorer page such as https://bscscan.com/address/0x...
        #[arg(value_name = "ADDRESS")]
        address: String,

        /// Explorer URL or network name used to pick the network
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Run the analyzer on the fetched source
        #[arg(short, long)]
        analyze: bool,

        /// Write the fetched source to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Only report findings at or above this severity
        #[arg(long, value_enum)]
        min_severity: Option<SeverityThreshold>,
    },

    /// List the built-in detection rules
    Rules {
        /// Only show rules from this set
        #[arg(long, value_enum)]
        set: Option<RuleSetArg>,
    },

    /// Show supported networks and their explorers
    Networks,

    /// Show well-known verified contracts to try
    Examples {
        /// Only show contracts on this network
        #[arg(long, value_enum)]
        network: Option<NetworkArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeverityThreshold {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl From<SeverityThreshold> for Severity {
    fn from(threshold: SeverityThreshold) -> Self {
        match threshold {
            SeverityThreshold::Info => Severity::Info,
            SeverityThreshold::Low => Severity::Low,
            SeverityThreshold::Medium => Severity::Medium,
            SeverityThreshold::High => Severity::High,
            SeverityThreshold::Critical => Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleSetArg {
    Evm,
    Solana,
    Bsc,
    Polygon,
    Avalanche,
}

impl From<RuleSetArg> for crate::analyzer::security::RuleSet {
    fn from(arg: RuleSetArg) -> Self {
        use crate::analyzer::security::RuleSet;
        match arg {
            RuleSetArg::Evm => RuleSet::Evm,
            RuleSetArg::Solana => RuleSet::Solana,
            RuleSetArg::Bsc => RuleSet::BscOverlay,
            RuleSetArg::Polygon => RuleSet::PolygonOverlay,
            RuleSetArg::Avalanche => RuleSet::AvalancheOverlay,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NetworkArg {
    Ethereum,
    Bsc,
    Polygon,
    Avalanche,
    Solana,
}

impl From<NetworkArg> for crate::fetcher::Network {
    fn from(arg: NetworkArg) -> Self {
        use crate::fetcher::Network;
        match arg {
            NetworkArg::Ethereum => Network::Ethereum,
            NetworkArg::Bsc => Network::Bsc,
            NetworkArg::Polygon => Network::Polygon,
            NetworkArg::Avalanche => Network::Avalanche,
            NetworkArg::Solana => Network::Solana,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from(["contract-auditor", "-vv", "analyze", "Vault.sol", "--min-severity", "high"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze { file, min_severity, .. } => {
                assert_eq!(file, PathBuf::from("Vault.sol"));
                assert_eq!(min_severity.map(Severity::from), Some(Severity::High));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_fetch_with_global_json() {
        let cli = Cli::parse_from([
            "contract-auditor",
            "fetch",
            "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
            "--analyze",
            "--json",
        ]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Fetch { analyze: true, .. }));
    }
}

//! # Contract Source Fetching
//!
//! Retrieves verified contract source from block explorers (EVM chains) and account
//! metadata from a Solana RPC node.
//!
//! Failures are values: every outcome other than success is a [`FetchError`] variant the
//! caller can match on. Requests go through a [`Transport`] so tests never touch the network.

pub mod address;
pub mod explorer;
pub mod known_contracts;
pub mod rate_limit;
pub mod solana;
pub mod transport;

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::types::Config;
pub use address::{detect_network, is_evm_address, is_solana_address, parse_explorer_url, validate_address};
pub use known_contracts::{known_contracts, VerifiedContract};
pub use rate_limit::RateLimiter;
pub use transport::{HttpTransport, Transport, TransportError};

/// Network used for API routing. Distinct from the analysis-side `Blockchain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Ethereum,
    Bsc,
    Polygon,
    Avalanche,
    Solana,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::Ethereum,
        Network::Bsc,
        Network::Polygon,
        Network::Avalanche,
        Network::Solana,
    ];

    /// Service name used for configuration lookups.
    pub fn service_name(self) -> &'static str {
        match self {
            Network::Ethereum => "etherscan",
            Network::Bsc => "bscscan",
            Network::Polygon => "polygonscan",
            Network::Avalanche => "snowtrace",
            Network::Solana => "solana",
        }
    }

    /// Explorer page prefix; the address is appended.
    pub fn explorer_url(self) -> &'static str {
        match self {
            Network::Ethereum => "https://etherscan.io/address/",
            Network::Bsc => "https://bscscan.com/address/",
            Network::Polygon => "https://polygonscan.com/address/",
            Network::Avalanche => "https://snowtrace.io/address/",
            Network::Solana => "https://explorer.solana.com/address/",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Network::Ethereum => "Ethereum Mainnet",
            Network::Bsc => "Binance Smart Chain",
            Network::Polygon => "Polygon (Matic)",
            Network::Avalanche => "Avalanche C-Chain",
            Network::Solana => "Solana Mainnet",
        }
    }

    /// Where to request an API key, for EVM explorers.
    pub fn api_key_page(self) -> Option<&'static str> {
        match self {
            Network::Ethereum | Network::Polygon => Some("https://etherscan.io/apis"),
            Network::Bsc => Some("https://bscscan.com/apis"),
            Network::Avalanche => Some("https://snowtrace.io/apis"),
            Network::Solana => None,
        }
    }

    pub fn is_evm(self) -> bool {
        !matches!(self, Network::Solana)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Everything that can go wrong while fetching contract source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{network} rejected the API key")]
    InvalidApiKey { network: Network },

    #[error("Contract {address} is not verified on {network}")]
    NotVerified { network: Network, address: String },

    #[error("{network} API rate limit exceeded")]
    RateLimited { network: Network },

    #[error("{network} API error: {message}")]
    UnknownApiFailure { network: Network, message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("No endpoint configured for {network}")]
    UnsupportedNetwork { network: Network },

    #[error("'{address}' is not a valid {network} address")]
    InvalidAddress { address: String, network: Network },
}

impl FetchError {
    /// A remediation hint for the user, when one applies.
    pub fn help(&self) -> Option<String> {
        match self {
            FetchError::InvalidApiKey { network } | FetchError::RateLimited { network } => {
                let var = env_var_for(*network)?;
                let page = network.api_key_page()?;
                Some(format!("Get a free API key at {page} and export it as {var}"))
            }
            FetchError::NotVerified { network, address } => Some(format!(
                "Only verified contracts can be analysed; check {}{address}",
                network.explorer_url()
            )),
            FetchError::InvalidAddress { network: Network::Solana, .. } => {
                Some("Solana addresses are 32-44 base58 characters".to_string())
            }
            FetchError::InvalidAddress { .. } => {
                Some("EVM addresses are 0x followed by 40 hex characters".to_string())
            }
            FetchError::UnsupportedNetwork { network } => Some(format!(
                "Add an endpoint under [services.{}] in the configuration file",
                network.service_name()
            )),
            FetchError::UnknownApiFailure { .. } | FetchError::NetworkError { .. } => None,
        }
    }
}

fn env_var_for(network: Network) -> Option<&'static str> {
    match network {
        Network::Ethereum => Some("ETHERSCAN_API_KEY"),
        Network::Bsc => Some("BSCSCAN_API_KEY"),
        Network::Polygon => Some("POLYGONSCAN_API_KEY"),
        Network::Avalanche => Some("SNOWTRACE_API_KEY"),
        Network::Solana => None,
    }
}

/// Source and metadata of a fetched contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub source_code: String,
    pub contract_name: String,
    pub compiler_version: String,
    pub blockchain: Network,
    /// When true, `source_code` is non-empty.
    pub is_verified: bool,
    pub explorer_url: String,
    pub abi: Option<String>,
    pub constructor_args: Option<String>,
}

impl ContractInfo {
    /// False for Solana programs, whose `source_code` is only a metadata placeholder.
    pub fn is_analyzable(&self) -> bool {
        self.is_verified || self.blockchain != Network::Solana
    }
}

/// Fetches contract source for any supported network.
pub struct ContractSourceFetcher<T: Transport = HttpTransport> {
    config: Config,
    transport: T,
    limiter: RateLimiter,
}

impl ContractSourceFetcher<HttpTransport> {
    /// HTTP fetcher configured from `config.fetch`.
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(&config.fetch).map_err(|e| FetchError::NetworkError {
            message: format!("cannot build HTTP client: {e}"),
        })?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ContractSourceFetcher<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        let limiter = RateLimiter::new(Duration::from_millis(config.fetch.min_request_interval_ms));
        Self {
            config,
            transport,
            limiter,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `address`, choosing the network from `url_hint` and the address format.
    pub fn fetch_contract_source(
        &mut self,
        address: &str,
        url_hint: Option<&str>,
    ) -> Result<ContractInfo, FetchError> {
        let address = address.trim();
        let network = detect_network(address, url_hint);
        self.fetch_from(network, address)
    }

    /// Fetch `address` from a known network.
    pub fn fetch_from(&mut self, network: Network, address: &str) -> Result<ContractInfo, FetchError> {
        if !validate_address(address, network) {
            return Err(FetchError::InvalidAddress {
                address: address.to_string(),
                network,
            });
        }

        info!("Fetching {} from {}", address, network);
        let result = if network.is_evm() {
            self.fetch_evm(network, address)
        } else {
            self.fetch_solana(address)
        };

        match &result {
            Ok(contract) => debug!(
                "Fetched {} ({} bytes of source, verified: {})",
                contract.contract_name,
                contract.source_code.len(),
                contract.is_verified
            ),
            Err(err) => warn!("Fetch of {} on {} failed: {}", address, network, err),
        }
        result
    }

    fn fetch_evm(&mut self, network: Network, address: &str) -> Result<ContractInfo, FetchError> {
        let service = network.service_name();
        let endpoint = self
            .config
            .endpoint(service)
            .ok_or(FetchError::UnsupportedNetwork { network })?
            .to_string();

        if !self.config.has_valid_key(service) {
            warn!(
                "No API key configured for {}; using the public placeholder key",
                service
            );
        }

        let query = explorer::source_query(
            address,
            self.config.api_key(service),
            self.config.chain_id(service),
        );

        self.limiter.wait();
        let body = self
            .transport
            .get(&endpoint, &query)
            .map_err(|e| e.into_fetch_error(network))?;
        explorer::interpret_response(network, address, &body)
    }

    fn fetch_solana(&mut self, address: &str) -> Result<ContractInfo, FetchError> {
        let network = Network::Solana;
        let endpoint = self
            .config
            .endpoint(network.service_name())
            .ok_or(FetchError::UnsupportedNetwork { network })?
            .to_string();

        let request = solana::account_info_request(address);
        self.limiter.wait();
        let body = self
            .transport
            .post_json(&endpoint, &request)
            .map_err(|e| e.into_fetch_error(network))?;
        solana::interpret_response(address, &body)
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analyzer::security::Severity;

/// Public placeholder key accepted by the explorers with a very low quota.
pub const PLACEHOLDER_API_KEY: &str = "YourApiKeyToken";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub analysis: AnalysisConfig,
    pub services: BTreeMap<String, ServiceConfig>,
}

/// HTTP behaviour shared by every explorer and RPC call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
    pub user_agent: String,
}

/// Analysis output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Findings less severe than this are dropped from CLI output.
    pub min_severity: Severity,
}

/// One explorer API or RPC node, keyed by service name in [`Config::services`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Set for services reached through the unified multi-chain endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Environment variable consulted for the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl ServiceConfig {
    fn new(endpoint: &str, api_key_env: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: None,
            chain_id: None,
            api_key_env: api_key_env.map(str::to_string),
        }
    }

    fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

impl Config {
    pub fn service(&self, service: &str) -> Option<&ServiceConfig> {
        self.services.get(service)
    }

    /// API key for `service`, or the public placeholder when none is configured.
    pub fn api_key(&self, service: &str) -> &str {
        self.service(service)
            .and_then(|s| s.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(PLACEHOLDER_API_KEY)
    }

    pub fn endpoint(&self, service: &str) -> Option<&str> {
        self.service(service).map(|s| s.endpoint.as_str())
    }

    pub fn chain_id(&self, service: &str) -> Option<u64> {
        self.service(service).and_then(|s| s.chain_id)
    }

    /// True when a real key (not the placeholder, longer than 10 chars) is set.
    pub fn has_valid_key(&self, service: &str) -> bool {
        let key = self.api_key(service);
        key != PLACEHOLDER_API_KEY && key.len() > 10
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut services = BTreeMap::new();
        services.insert(
            "etherscan".to_string(),
            ServiceConfig::new("https://api.etherscan.io/api", Some("ETHERSCAN_API_KEY")),
        );
        services.insert(
            "bscscan".to_string(),
            ServiceConfig::new("https://api.bscscan.com/api", Some("BSCSCAN_API_KEY")),
        );
        services.insert(
            "polygonscan".to_string(),
            ServiceConfig::new("https://api.etherscan.io/v2/api", Some("POLYGONSCAN_API_KEY"))
                .with_chain_id(137),
        );
        services.insert(
            "snowtrace".to_string(),
            ServiceConfig::new("https://api.snowtrace.io/api", Some("SNOWTRACE_API_KEY")),
        );
        services.insert(
            "solana".to_string(),
            ServiceConfig::new("https://api.mainnet-beta.solana.com", None),
        );

        Self {
            fetch: FetchConfig::default(),
            analysis: AnalysisConfig::default(),
            services,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            min_request_interval_ms: 200,
            user_agent: format!("contract-auditor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
        }
    }
}

/// On-disk layout. Every field is optional so a file only has to name what it changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub fetch: Option<FetchConfig>,
    pub analysis: Option<AnalysisConfig>,
    pub services: BTreeMap<String, ServiceOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceOverride {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub chain_id: Option<u64>,
    pub api_key_env: Option<String>,
}

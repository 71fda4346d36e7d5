pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{ConfigError, Result};
use types::{Config, ConfigFile, ServiceConfig};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from file or use defaults, then apply environment overrides.
///
/// Without an explicit path the per-user file under the platform config directory is
/// read when it exists.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    let file = match path {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::InvalidFile(path.display().to_string()).into());
            }
            Some(path.to_path_buf())
        }
        None => default_config_path().filter(|p| p.is_file()),
    };

    if let Some(file) = file {
        debug!("Loading configuration from {}", file.display());
        let raw = fs::read_to_string(&file)?;
        merge_toml(&mut config, &raw)?;
    }

    apply_env_overrides(&mut config);
    Ok(config)
}

/// `$CONFIG_DIR/contract-auditor/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("contract-auditor").join(CONFIG_FILE_NAME))
}

/// Merge a TOML document over `config`. Services not named in the document keep their values.
pub fn merge_toml(config: &mut Config, raw: &str) -> Result<()> {
    let file: ConfigFile =
        toml::from_str(raw).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;

    if let Some(fetch) = file.fetch {
        config.fetch = fetch;
    }
    if let Some(analysis) = file.analysis {
        config.analysis = analysis;
    }

    for (name, patch) in file.services {
        match config.services.get_mut(&name) {
            Some(existing) => {
                if let Some(endpoint) = patch.endpoint {
                    existing.endpoint = endpoint;
                }
                if patch.api_key.is_some() {
                    existing.api_key = patch.api_key;
                }
                if patch.chain_id.is_some() {
                    existing.chain_id = patch.chain_id;
                }
                if patch.api_key_env.is_some() {
                    existing.api_key_env = patch.api_key_env;
                }
            }
            None => {
                let endpoint = patch.endpoint.ok_or_else(|| {
                    ConfigError::MissingConfig(format!("services.{name}.endpoint"))
                })?;
                config.services.insert(
                    name,
                    ServiceConfig {
                        endpoint,
                        api_key: patch.api_key,
                        chain_id: patch.chain_id,
                        api_key_env: patch.api_key_env,
                    },
                );
            }
        }
    }

    Ok(())
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_env_overrides_from(config, |name| std::env::var(name).ok());
}

/// Fill API keys from each service's `api_key_env` and the Solana endpoint from
/// `SOLANA_RPC_URL`. Empty values are ignored.
pub fn apply_env_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (name, service) in config.services.iter_mut() {
        let Some(var) = service.api_key_env.as_deref() else {
            continue;
        };
        match lookup(var).filter(|v| !v.trim().is_empty()) {
            Some(key) => {
                debug!("Using API key for {name} from {var}");
                service.api_key = Some(key);
            }
            None if service.api_key.is_none() => {
                debug!("{var} not set, {name} will use the public placeholder key");
            }
            None => {}
        }
    }

    if let Some(url) = lookup("SOLANA_RPC_URL").filter(|v| !v.trim().is_empty()) {
        match config.services.get_mut("solana") {
            Some(solana) => solana.endpoint = url,
            None => warn!("SOLANA_RPC_URL set but no solana service is configured"),
        }
    }
}

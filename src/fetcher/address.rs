//! Address validation and network detection.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::Network;

static EVM_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid EVM address regex"));

// Base58 excludes 0, O, I and l.
static SOLANA_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid Solana address regex")
});

pub fn is_evm_address(address: &str) -> bool {
    EVM_ADDRESS.is_match(address)
}

pub fn is_solana_address(address: &str) -> bool {
    SOLANA_ADDRESS.is_match(address)
}

/// Whether `address` is well-formed for `network`.
pub fn validate_address(address: &str, network: Network) -> bool {
    match network {
        Network::Solana => is_solana_address(address),
        _ => is_evm_address(address),
    }
}

/// Pick a network from the URL hint, falling back to the address shape.
pub fn detect_network(address: &str, url_hint: Option<&str>) -> Network {
    if let Some(hint) = url_hint {
        let hint = hint.to_ascii_lowercase();
        if hint.contains("bscscan") || hint.contains("bsc") {
            return Network::Bsc;
        }
        if hint.contains("polygonscan") || hint.contains("polygon") {
            return Network::Polygon;
        }
        if hint.contains("snowtrace") || hint.contains("avalanche") {
            return Network::Avalanche;
        }
        if hint.contains("solana") {
            return Network::Solana;
        }
    }

    if !address.starts_with("0x") && is_solana_address(address) {
        return Network::Solana;
    }

    Network::Ethereum
}

/// Split an explorer page URL such as `https://bscscan.com/address/0x...` into the
/// address and the network it points at.
pub fn parse_explorer_url(input: &str) -> Option<(String, Network)> {
    let url = Url::parse(input.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let network = match host.trim_start_matches("www.") {
        "etherscan.io" => Network::Ethereum,
        "bscscan.com" => Network::Bsc,
        "polygonscan.com" => Network::Polygon,
        "snowtrace.io" => Network::Avalanche,
        "explorer.solana.com" | "solscan.io" => Network::Solana,
        _ => return None,
    };

    let mut segments = url.path_segments()?;
    let address = loop {
        match segments.next()? {
            "address" | "account" | "token" => break segments.next()?,
            _ => continue,
        }
    };
    // Explorers append `#code` and similar anchors; url already split those off.
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    Some((address.to_string(), network))
}

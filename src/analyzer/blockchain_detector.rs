//! # Blockchain Detection
//!
//! Decides which chain, language and framework a piece of source belongs to.
//!
//! The cascade is ordered and the first hit wins:
//!
//! 1. Solana / Rust markers in the source
//! 2. BSC, Polygon, Avalanche hints in the origin URL host
//! 3. BSC, then Polygon vocabulary in the source
//! 4. `pragma solidity` for Ethereum
//! 5. Ethereum with an unknown language

use std::fmt;

use aho_corasick::AhoCorasick;
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blockchain {
    Ethereum,
    Solana,
    Bsc,
    Polygon,
    Avalanche,
    Fantom,
    Unknown,
}

impl Blockchain {
    pub fn display_name(self) -> &'static str {
        match self {
            Blockchain::Ethereum => "Ethereum",
            Blockchain::Solana => "Solana",
            Blockchain::Bsc => "Binance Smart Chain",
            Blockchain::Polygon => "Polygon",
            Blockchain::Avalanche => "Avalanche",
            Blockchain::Fantom => "Fantom",
            Blockchain::Unknown => "Unknown",
        }
    }

    /// Descriptive metadata, where known.
    pub fn info(self) -> Option<BlockchainInfo> {
        let info = match self {
            Blockchain::Ethereum => BlockchainInfo {
                name: "Ethereum",
                language: "Solidity",
                explorer: "Etherscan",
                consensus: "Proof of Stake",
                description: "Original smart contract platform",
            },
            Blockchain::Solana => BlockchainInfo {
                name: "Solana",
                language: "Rust/Anchor",
                explorer: "Solana Explorer",
                consensus: "Proof of History",
                description: "High-performance blockchain with Rust programs",
            },
            Blockchain::Bsc => BlockchainInfo {
                name: "Binance Smart Chain",
                language: "Solidity",
                explorer: "BSCScan",
                consensus: "Proof of Authority",
                description: "Binance's EVM-compatible blockchain",
            },
            Blockchain::Polygon => BlockchainInfo {
                name: "Polygon",
                language: "Solidity",
                explorer: "PolygonScan",
                consensus: "Proof of Stake",
                description: "Ethereum scaling solution",
            },
            Blockchain::Avalanche => BlockchainInfo {
                name: "Avalanche",
                language: "Solidity",
                explorer: "SnowTrace",
                consensus: "Avalanche Consensus",
                description: "Fast, low-cost blockchain platform",
            },
            Blockchain::Fantom | Blockchain::Unknown => return None,
        };
        Some(info)
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockchainInfo {
    pub name: &'static str,
    pub language: &'static str,
    pub explorer: &'static str,
    pub consensus: &'static str,
    pub description: &'static str,
}

/// Result of [`classify`]. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainContext {
    pub blockchain: Blockchain,
    /// "solidity", "rust" or "unknown"
    pub language: String,
    /// "anchor" or "native" for Solana programs
    pub framework: Option<String>,
}

impl BlockchainContext {
    fn new(blockchain: Blockchain, language: &str) -> Self {
        Self {
            blockchain,
            language: language.to_string(),
            framework: None,
        }
    }
}

struct Vocabulary(AhoCorasick);

impl Vocabulary {
    fn new(words: &[&str]) -> Self {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(words)
            .expect("static vocabulary builds");
        Self(matcher)
    }

    fn found_in(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

static SOLANA_MARKERS: Lazy<Vocabulary> =
    Lazy::new(|| Vocabulary::new(&["use anchor", "program!", "declare_id", "solana_program"]));
static ANCHOR: Lazy<Vocabulary> = Lazy::new(|| Vocabulary::new(&["anchor"]));
static BSC_HOSTS: Lazy<Vocabulary> = Lazy::new(|| Vocabulary::new(&["bscscan.com", "bsc"]));
static POLYGON_HOSTS: Lazy<Vocabulary> =
    Lazy::new(|| Vocabulary::new(&["polygonscan.com", "polygon"]));
static AVALANCHE_HOSTS: Lazy<Vocabulary> =
    Lazy::new(|| Vocabulary::new(&["snowtrace.io", "avalanche"]));
static BSC_WORDS: Lazy<Vocabulary> =
    Lazy::new(|| Vocabulary::new(&["pancakeswap", "bep-20", "bep20"]));
static POLYGON_WORDS: Lazy<Vocabulary> = Lazy::new(|| Vocabulary::new(&["matic", "polygon"]));
static SOLIDITY_PRAGMA: Lazy<Vocabulary> = Lazy::new(|| Vocabulary::new(&["pragma solidity"]));

/// Deterministic and total: every input yields a context, Ethereum being the fallback.
pub fn classify(source: &str, origin_url: Option<&str>) -> BlockchainContext {
    let context = classify_inner(source, origin_url.unwrap_or_default());
    debug!(
        "Classified source as {} ({})",
        context.blockchain, context.language
    );
    context
}

fn classify_inner(source: &str, origin_url: &str) -> BlockchainContext {
    if SOLANA_MARKERS.found_in(source) {
        let framework = if ANCHOR.found_in(source) { "anchor" } else { "native" };
        return BlockchainContext {
            framework: Some(framework.to_string()),
            ..BlockchainContext::new(Blockchain::Solana, "rust")
        };
    }

    let host = origin_host(origin_url);
    if BSC_HOSTS.found_in(&host) {
        return BlockchainContext::new(Blockchain::Bsc, "solidity");
    }
    if POLYGON_HOSTS.found_in(&host) {
        return BlockchainContext::new(Blockchain::Polygon, "solidity");
    }
    if AVALANCHE_HOSTS.found_in(&host) {
        return BlockchainContext::new(Blockchain::Avalanche, "solidity");
    }

    if BSC_WORDS.found_in(source) {
        return BlockchainContext::new(Blockchain::Bsc, "solidity");
    }
    if POLYGON_WORDS.found_in(source) {
        return BlockchainContext::new(Blockchain::Polygon, "solidity");
    }

    if SOLIDITY_PRAGMA.found_in(source) {
        return BlockchainContext::new(Blockchain::Ethereum, "solidity");
    }

    BlockchainContext::new(Blockchain::Ethereum, "unknown")
}

/// Host of an absolute URL, otherwise the whole origin string.
fn origin_host(origin: &str) -> String {
    match Url::parse(origin.trim()) {
        Ok(url) => url
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| origin.to_string()),
        Err(_) => origin.to_string(),
    }
}

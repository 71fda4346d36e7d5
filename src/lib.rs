//! # Contract Auditor
//!
//! Pattern-based vulnerability scanning for smart contracts across EVM chains
//! (Ethereum, BSC, Polygon, Avalanche) and Solana.
//!
//! ## Features
//!
//! - **Blockchain Detection**: Classifies source by chain, language and framework
//! - **Platform Rules**: Layers BSC, Polygon and Avalanche checks over the EVM base catalog
//! - **Solana Rules**: Separate catalog for Rust / Anchor programs
//! - **Source Fetching**: Pulls verified source from block explorers by address
//!
//! Detection is lexical. It points at code worth reviewing and is neither sound nor complete.
//!
//! ## Example
//!
//! ```rust
//! use contract_auditor::{analyze, Blockchain, Severity};
//!
//! let code = r#"
//! pragma solidity ^0.8.0;
//! contract Vault {
//!     function withdraw() public { payable(msg.sender).transfer(1 ether); }
//! }
//! "#;
//!
//! let result = analyze(code, None);
//! assert_eq!(result.context.blockchain, Blockchain::Ethereum);
//! assert!(result.findings.iter().any(|f| f.severity == Severity::High));
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;

pub use analyzer::{
    analyze, classify, AnalysisResult, Blockchain, BlockchainContext, Finding, MultiChainAnalyzer,
    Severity,
};
pub use error::{AuditorError, Result};
pub use fetcher::{ContractInfo, ContractSourceFetcher, FetchError, Network};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

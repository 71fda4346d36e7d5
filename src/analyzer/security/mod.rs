//! # Security Analysis Module
//!
//! Lexical vulnerability detection for smart-contract source.
//!
//! - [`patterns`]: the immutable rule catalog (EVM base, Solana, platform overlays)
//! - [`detector`]: applies a set of rules to source text
//! - [`results`]: deduplication, ordering and summary scoring

use thiserror::Error;

pub mod core;
pub mod detector;
pub mod patterns;
pub mod results;

pub use self::core::{Finding, PatternRule, RuleSet, Severity};
pub use detector::{scan, RegexDetector};
pub use patterns::PatternCatalog;
pub use results::{finalize, FindingSummary};

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Pattern compilation error in rule '{id}': {source}")]
    PatternCompilation {
        id: &'static str,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("Duplicate rule id '{0}'")]
    DuplicateRule(&'static str),
}

//! # Analyzer Module
//!
//! Entry point for source analysis:
//! - Blockchain, language and framework classification
//! - Rule-set routing per platform
//! - Pattern scanning, deduplication and severity ordering

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub mod blockchain_detector;
pub mod display;
pub mod router;
pub mod security;

pub use blockchain_detector::{classify, Blockchain, BlockchainContext, BlockchainInfo};
pub use router::rule_sets_for;
pub use security::{finalize, Finding, FindingSummary, PatternCatalog, RegexDetector, Severity};

/// Hex characters of the BLAKE3 digest kept in [`AnalysisResult::code_hash`].
const CODE_HASH_LEN: usize = 16;

/// Findings for one piece of source along with how it was classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub findings: Vec<Finding>,
    pub context: BlockchainContext,
    pub summary: FindingSummary,
    pub code_hash: String,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Findings at least as severe as `threshold`.
    pub fn findings_at_least(&self, threshold: Severity) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.severity.meets(threshold))
    }
}

/// Runs the classify, route, scan and finalize pipeline against a rule catalog.
#[derive(Debug, Clone, Copy)]
pub struct MultiChainAnalyzer<'c> {
    catalog: &'c PatternCatalog,
}

impl Default for MultiChainAnalyzer<'static> {
    fn default() -> Self {
        Self::new(PatternCatalog::global())
    }
}

impl<'c> MultiChainAnalyzer<'c> {
    pub fn new(catalog: &'c PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn analyze(&self, code: &str, origin_url: Option<&str>) -> AnalysisResult {
        let context = classify(code, origin_url);
        let sets = rule_sets_for(context.blockchain);
        debug!("Running rule sets {:?} for {}", sets, context.blockchain);

        let raw = RegexDetector::for_sets(self.catalog, sets).scan(code);
        let raw_count = raw.len();
        let findings = finalize(raw);

        info!(
            "Analysis finished: {} findings ({} raw matches) on {}",
            findings.len(),
            raw_count,
            context.blockchain
        );

        AnalysisResult {
            summary: FindingSummary::from_findings(&findings),
            findings,
            context,
            code_hash: code_hash(code),
            analyzed_at: Utc::now(),
        }
    }
}

/// Analyze `code` with the built-in catalog.
pub fn analyze(code: &str, origin_url: Option<&str>) -> AnalysisResult {
    MultiChainAnalyzer::default().analyze(code, origin_url)
}

/// Short stable fingerprint of analysed source.
pub fn code_hash(code: &str) -> String {
    let mut hex = blake3::hash(code.as_bytes()).to_hex().to_string();
    hex.truncate(CODE_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solana_source_skips_evm_rules() {
        let code = "use anchor_lang::prelude::*;\n// function f() public { a.delegatecall(x); }\n";
        let result = analyze(code, None);
        assert_eq!(result.context.blockchain, Blockchain::Solana);
        assert!(result
            .findings
            .iter()
            .all(|f| f.vulnerability_type != "Delegatecall Danger"));
    }

    #[test]
    fn test_bsc_overlay_applied() {
        let code = "pragma solidity ^0.8.0;\nfunction removeLiquidity() external onlyOwner {}\n";
        let result = analyze(code, Some("https://bscscan.com/address/0x0"));
        assert_eq!(result.context.blockchain, Blockchain::Bsc);
        let rug = result
            .findings
            .iter()
            .find(|f| f.vulnerability_type == "Rug Pull")
            .unwrap();
        assert_eq!(rug.severity, Severity::Critical);
        assert_eq!(rug.line_number, Some(2));
    }

    #[test]
    fn test_overlay_not_applied_on_ethereum() {
        let code = "pragma solidity ^0.8.0;\nfunction removeLiquidity() external onlyOwner {}\n";
        let result = analyze(code, None);
        assert_eq!(result.context.blockchain, Blockchain::Ethereum);
        assert!(result.findings.iter().all(|f| f.vulnerability_type != "Rug Pull"));
    }

    #[test]
    fn test_code_hash() {
        let a = code_hash("contract A {}");
        assert_eq!(a.len(), 16);
        assert_eq!(a, code_hash("contract A {}"));
        assert_ne!(a, code_hash("contract B {}"));
    }

    #[test]
    fn test_summary_matches_findings() {
        let result = analyze("pragma solidity ^0.8.0;\nrequire(tx.origin == owner);\n", None);
        assert_eq!(result.summary.total_findings, result.findings.len());
        assert!(result.findings_at_least(Severity::Medium).count() >= 1);
    }
}

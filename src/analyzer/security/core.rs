//! # Core Security Analysis Types
//!
//! Findings, severities and rules shared by every detector.

use std::fmt;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

/// Security finding severity levels, most severe first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// Sort rank: Critical = 0 through Info = 4.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
        }
    }

    /// True when `self` is at least as severe as `threshold`.
    pub fn meets(self, threshold: Severity) -> bool {
        self.rank() <= threshold.rank()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported weakness in analysed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub vulnerability_type: String,
    pub severity: Severity,
    /// 1-indexed.
    pub line_number: Option<usize>,
    /// Surrounding lines with the matched one prefixed by `>>> `.
    pub code_snippet: String,
    pub description: String,
    pub explanation: String,
    pub recommendation: String,
    pub cwe_id: Option<String>,
    pub swc_id: Option<String>,
}

/// Which table a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSet {
    Evm,
    Solana,
    BscOverlay,
    PolygonOverlay,
    AvalancheOverlay,
}

impl RuleSet {
    pub const ALL: [RuleSet; 5] = [
        RuleSet::Evm,
        RuleSet::Solana,
        RuleSet::BscOverlay,
        RuleSet::PolygonOverlay,
        RuleSet::AvalancheOverlay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RuleSet::Evm => "EVM / Solidity",
            RuleSet::Solana => "Solana / Rust",
            RuleSet::BscOverlay => "BSC overlay",
            RuleSet::PolygonOverlay => "Polygon overlay",
            RuleSet::AvalancheOverlay => "Avalanche overlay",
        }
    }
}

/// A compiled detection rule. Built once with the catalog and never mutated.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub id: &'static str,
    pub set: RuleSet,
    pub vulnerability_type: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub explanation: &'static str,
    pub recommendation: &'static str,
    pub cwe_id: Option<&'static str>,
    pub swc_id: Option<&'static str>,
    pub pattern: Regex,
}

impl PatternRule {
    /// Build a finding for a match of this rule.
    pub fn finding(&self, line_number: usize, code_snippet: String) -> Finding {
        Finding {
            vulnerability_type: self.vulnerability_type.to_string(),
            severity: self.severity,
            line_number: Some(line_number),
            code_snippet,
            description: self.description.to_string(),
            explanation: self.explanation.to_string(),
            recommendation: self.recommendation.to_string(),
            cwe_id: self.cwe_id.map(str::to_string),
            swc_id: self.swc_id.map(str::to_string),
        }
    }
}

//! # Result Aggregation
//!
//! Deduplicates raw findings, orders them by severity and scores the outcome.

use std::collections::BTreeMap;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use super::core::{Finding, Severity};

/// Characters of the description that take part in the duplicate key.
const DEDUP_DESCRIPTION_CHARS: usize = 50;

/// Drop duplicates (first occurrence wins) and stably sort Critical first.
pub fn finalize(raw: Vec<Finding>) -> Vec<Finding> {
    let mut findings = deduplicate_findings(raw);
    findings.sort_by_key(|f| f.severity.rank());
    findings
}

/// Key: vulnerability type, line, first 50 characters of the description.
fn deduplicate_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = AHashSet::with_capacity(findings.len());

    findings
        .into_iter()
        .filter(|finding| {
            let description: String = finding
                .description
                .chars()
                .take(DEDUP_DESCRIPTION_CHARS)
                .collect();
            seen.insert((finding.vulnerability_type.clone(), finding.line_number, description))
        })
        .collect()
}

/// Totals and overall risk for a finalized finding list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingSummary {
    pub total_findings: usize,
    pub findings_by_severity: BTreeMap<Severity, usize>,
    pub risk_level: Severity,
    /// 0-100, higher is better
    pub security_score: f32,
}

impl FindingSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        Self {
            total_findings: findings.len(),
            findings_by_severity: count_by_severity(findings),
            risk_level: determine_risk_level(findings),
            security_score: calculate_security_score(findings),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings_by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn has_critical_issues(&self) -> bool {
        self.count(Severity::Critical) > 0
    }
}

fn count_by_severity(findings: &[Finding]) -> BTreeMap<Severity, usize> {
    let mut counts = BTreeMap::new();
    for finding in findings {
        *counts.entry(finding.severity).or_insert(0) += 1;
    }
    counts
}

/// Highest severity present, or Info for an empty list.
fn determine_risk_level(findings: &[Finding]) -> Severity {
    findings
        .iter()
        .map(|f| f.severity)
        .min()
        .unwrap_or(Severity::Info)
}

fn calculate_security_score(findings: &[Finding]) -> f32 {
    let total_penalty: f32 = findings
        .iter()
        .map(|f| match f.severity {
            Severity::Critical => 25.0,
            Severity::High => 15.0,
            Severity::Medium => 8.0,
            Severity::Low => 3.0,
            Severity::Info => 1.0,
        })
        .sum();

    (100.0 - total_penalty).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(kind: &str, severity: Severity, line: usize, description: &str) -> Finding {
        Finding {
            vulnerability_type: kind.to_string(),
            severity,
            line_number: Some(line),
            code_snippet: String::new(),
            description: description.to_string(),
            explanation: String::new(),
            recommendation: String::new(),
            cwe_id: None,
            swc_id: None,
        }
    }

    #[test]
    fn test_deduplication_keeps_first() {
        let mut first = finding("Access Control", Severity::High, 10, "Public/external function");
        first.code_snippet = "first".to_string();
        let mut second = first.clone();
        second.code_snippet = "second".to_string();

        let result = finalize(vec![first, second]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code_snippet, "first");
    }

    #[test]
    fn test_dedup_uses_description_prefix() {
        let prefix = "x".repeat(50);
        let a = finding("T", Severity::Low, 1, &format!("{prefix}aaa"));
        let b = finding("T", Severity::Low, 1, &format!("{prefix}bbb"));
        let c = finding("T", Severity::Low, 2, &format!("{prefix}bbb"));
        assert_eq!(finalize(vec![a, b, c]).len(), 2);
    }

    #[test]
    fn test_sort_is_stable_by_severity() {
        let raw = vec![
            finding("Low A", Severity::Low, 1, "a"),
            finding("Crit", Severity::Critical, 5, "c"),
            finding("Low B", Severity::Low, 2, "b"),
            finding("High", Severity::High, 3, "h"),
        ];
        let kinds: Vec<_> = finalize(raw)
            .into_iter()
            .map(|f| f.vulnerability_type)
            .collect();
        assert_eq!(kinds, vec!["Crit", "High", "Low A", "Low B"]);
    }

    #[test]
    fn test_summary() {
        let findings = vec![
            finding("A", Severity::Critical, 1, "a"),
            finding("B", Severity::Medium, 2, "b"),
        ];
        let summary = FindingSummary::from_findings(&findings);
        assert_eq!(summary.total_findings, 2);
        assert_eq!(summary.risk_level, Severity::Critical);
        assert_eq!(summary.count(Severity::Medium), 1);
        assert_eq!(summary.count(Severity::Low), 0);
        assert_eq!(summary.security_score, 67.0);
        assert!(summary.has_critical_issues());
    }

    #[test]
    fn test_empty_summary() {
        let summary = FindingSummary::from_findings(&[]);
        assert_eq!(summary.risk_level, Severity::Info);
        assert_eq!(summary.security_score, 100.0);
    }

    #[test]
    fn test_score_floor() {
        let findings: Vec<_> = (0..10)
            .map(|i| finding("A", Severity::Critical, i, "a"))
            .collect();
        assert_eq!(FindingSummary::from_findings(&findings).security_score, 0.0);
    }
}

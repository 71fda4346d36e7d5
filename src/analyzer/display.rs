//! Terminal rendering for analysis results, fetched contracts and catalog listings.

use std::fmt::Write as _;

use colored::*;

use super::security::{PatternCatalog, RuleSet};
use super::{AnalysisResult, Finding, Severity};
use crate::fetcher::{known_contracts::VerifiedContract, ContractInfo, Network};

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("{:<8}", severity.as_str());
    match severity {
        Severity::Critical => label.bright_red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
        Severity::Info => label.normal(),
    }
}

/// One line per finding, followed by the summary.
pub fn render_analysis(result: &AnalysisResult, threshold: Severity, show_snippets: bool) -> String {
    let mut out = String::new();
    let ctx = &result.context;

    let framework = ctx
        .framework
        .as_deref()
        .map(|f| format!(", {f}"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{} {} ({}{})",
        "Blockchain:".bold(),
        ctx.blockchain,
        ctx.language,
        framework
    );
    if let Some(info) = ctx.blockchain.info() {
        let _ = writeln!(
            out,
            "{} {} ({} consensus, {})",
            "Platform:".bold(),
            info.description,
            info.consensus,
            info.explorer
        );
    }

    let shown: Vec<&Finding> = result.findings_at_least(threshold).collect();
    if shown.is_empty() {
        let _ = writeln!(out, "{}", "No issues found.".bright_green());
    }

    for finding in &shown {
        let line = finding
            .line_number
            .map(|l| format!("line {l}"))
            .unwrap_or_else(|| "line ?".to_string());
        let ids: Vec<&str> = [finding.swc_id.as_deref(), finding.cwe_id.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let ids = if ids.is_empty() {
            String::new()
        } else {
            format!(" [{}]", ids.join(", "))
        };

        let _ = writeln!(
            out,
            "{} {:<9} {}: {}{}",
            severity_label(finding.severity),
            line.bright_cyan(),
            finding.vulnerability_type.bold(),
            finding.description,
            ids.dimmed()
        );
        if show_snippets {
            for snippet_line in finding.code_snippet.lines() {
                let _ = writeln!(out, "    {}", snippet_line.dimmed());
            }
            let _ = writeln!(out, "    {} {}", "fix:".green(), finding.recommendation);
        }
    }

    let summary = &result.summary;
    let counts: Vec<String> = Severity::ALL
        .iter()
        .map(|&s| format!("{} {}", summary.count(s), s.as_str().to_lowercase()))
        .collect();
    let _ = writeln!(
        out,
        "\n{} {} findings ({}), risk {}, score {:.0}/100",
        "Summary:".bold(),
        summary.total_findings,
        counts.join(", "),
        summary.risk_level,
        summary.security_score
    );
    if shown.len() < summary.total_findings {
        let _ = writeln!(
            out,
            "{} findings below {} hidden",
            summary.total_findings - shown.len(),
            threshold
        );
    }
    if summary.has_critical_issues() {
        let _ = writeln!(
            out,
            "{}",
            "Critical issues present: fix these before deploying.".bright_red().bold()
        );
    }
    out
}

pub fn render_contract(info: &ContractInfo) -> String {
    let mut out = String::new();
    let verified = if info.is_verified {
        "verified".bright_green()
    } else {
        "unverified".yellow()
    };
    let _ = writeln!(out, "{} {} ({})", "Contract:".bold(), info.contract_name, verified);
    let _ = writeln!(out, "{} {}", "Network:".bold(), info.blockchain);
    let _ = writeln!(out, "{} {}", "Compiler:".bold(), info.compiler_version);
    let _ = writeln!(out, "{} {}", "Explorer:".bold(), info.explorer_url.bright_blue());
    let _ = writeln!(out, "{} {} lines", "Source:".bold(), info.source_code.lines().count());
    out
}

pub fn render_rules(catalog: &PatternCatalog, only: Option<RuleSet>) -> String {
    let mut out = String::new();
    for set in RuleSet::ALL {
        if only.is_some_and(|o| o != set) {
            continue;
        }
        let _ = writeln!(out, "{}", set.label().bright_white().bold());
        for rule in catalog.rules_in(set) {
            let ids: Vec<&str> = [rule.swc_id, rule.cwe_id].into_iter().flatten().collect();
            let _ = writeln!(
                out,
                "  {} {:<28} {}{}",
                severity_label(rule.severity),
                rule.id,
                rule.description,
                if ids.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", ids.join(", "))
                }
            );
        }
    }
    out
}

pub fn render_networks() -> String {
    let mut out = String::new();
    for network in Network::ALL {
        let _ = writeln!(
            out,
            "{:<22} {:<12} {}",
            network.description().bold(),
            network.service_name(),
            network.explorer_url()
        );
    }
    out
}

pub fn render_examples<'a>(contracts: impl IntoIterator<Item = &'a VerifiedContract>) -> String {
    let mut out = String::new();
    for contract in contracts {
        let marker = if contract.popular { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<18} {:<22} {}",
            contract.name.bold(),
            contract.network.description(),
            contract.address
        );
        let _ = writeln!(
            out,
            "    {} {}",
            contract.description.dimmed(),
            contract.explorer_url().bright_blue()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn test_render_analysis_lists_findings() {
        colored::control::set_override(false);
        let result = analyze("pragma solidity ^0.8.0;\nrequire(tx.origin == owner);\n", None);
        let text = render_analysis(&result, Severity::Info, false);
        assert!(text.contains("Blockchain: Ethereum (solidity)"));
        assert!(text.contains("line 2"));
        assert!(text.contains("Tx Origin"));
        assert!(text.contains("SWC-115"));
        assert!(!text.contains("Critical issues present"));
    }

    #[test]
    fn test_render_analysis_shows_platform_info() {
        colored::control::set_override(false);
        let result = analyze("use anchor_lang::prelude::*;\n", None);
        let text = render_analysis(&result, Severity::Info, false);
        assert!(text.contains(
            "Platform: High-performance blockchain with Rust programs (Proof of History consensus, Solana Explorer)"
        ));
    }

    #[test]
    fn test_critical_findings_are_called_out() {
        colored::control::set_override(false);
        let code = "pragma solidity ^0.8.0;\ncontract Bank {\n    function pay(uint256 amount) internal {\n        (bool ok, ) = msg.sender.call{value: amount}(\"\");\n        balances[msg.sender] -= amount;\n    }\n}\n";
        let result = analyze(code, None);
        assert!(result.summary.has_critical_issues());
        let text = render_analysis(&result, Severity::Info, false);
        assert!(text.contains("Critical issues present"));
    }

    #[test]
    fn test_render_examples_links_explorer() {
        colored::control::set_override(false);
        let text = render_examples(crate::fetcher::known_contracts::contracts_on(Network::Polygon));
        assert!(text.contains("* "));
        assert!(text.contains("USDC Polygon"));
        assert!(text.contains(
            "https://polygonscan.com/address/0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
        ));
        assert!(!text.contains("DAI Token"));
    }

    #[test]
    fn test_threshold_hides_findings() {
        colored::control::set_override(false);
        let result = analyze("pragma solidity ^0.8.0;\nrequire(tx.origin == owner);\n", None);
        let text = render_analysis(&result, Severity::Critical, false);
        assert!(!text.contains("Tx Origin"));
        assert!(text.contains("hidden"));
    }

    #[test]
    fn test_render_rules_filter() {
        colored::control::set_override(false);
        let text = render_rules(PatternCatalog::global(), Some(RuleSet::AvalancheOverlay));
        assert!(text.contains("avalanche_consensus"));
        assert!(!text.contains("reentrancy"));
    }
}

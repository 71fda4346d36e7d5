use contract_auditor::analyzer::security::{finalize, Finding, RegexDetector, Severity};
use contract_auditor::analyzer::{analyze, classify};
use contract_auditor::fetcher::{is_evm_address, is_solana_address};
use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
    "pragma solidity ^0.8.0;",
    "pragma solidity ^0.6.12;",
    "function withdraw() public {",
    "function kill() external onlyOwner {",
    "(bool ok, ) = msg.sender.call{value: amount}(\"\");",
    "balances[msg.sender] -= amount;",
    "require(tx.origin == owner);",
    "target.delegatecall(data);",
    "count += 1;",
    "uint r = block.timestamp % seed;",
    "use anchor_lang::prelude::*;",
    "let x = a.checked_add(b);",
    "function removeLiquidity() external {",
    "for (uint i = 0; i < xs.length; i++) {}",
    "}",
    "",
];

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..24).prop_map(|lines| lines.join("\n"))
}

fn severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

fn finding() -> impl Strategy<Value = Finding> {
    (
        prop::sample::select(vec!["Reentrancy", "Access Control", "Tx Origin"]),
        severity(),
        prop::option::of(1usize..6),
        prop::sample::select(vec!["first description", "second description"]),
    )
        .prop_map(|(kind, severity, line, description)| Finding {
            vulnerability_type: kind.to_string(),
            severity,
            line_number: line,
            code_snippet: String::new(),
            description: description.to_string(),
            explanation: String::new(),
            recommendation: String::new(),
            cwe_id: None,
            swc_id: None,
        })
}

proptest! {
    #[test]
    fn classification_is_deterministic(code in source(), url in prop::option::of("https://[a-z]{3,10}\\.(com|io)/address/0x[0-9a-f]{6}")) {
        let a = classify(&code, url.as_deref());
        let b = classify(&code, url.as_deref());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn scanning_is_deterministic(code in source()) {
        let detector = RegexDetector::evm();
        prop_assert_eq!(detector.scan(&code), detector.scan(&code));
    }

    #[test]
    fn line_numbers_stay_in_range(code in source()) {
        let lines = code.split('\n').count();
        for finding in RegexDetector::evm().scan(&code).iter().chain(RegexDetector::solana().scan(&code).iter()) {
            let line = finding.line_number.unwrap();
            prop_assert!(line >= 1 && line <= lines);
        }
    }

    #[test]
    fn finalize_is_idempotent(raw in prop::collection::vec(finding(), 0..32)) {
        let once = finalize(raw);
        let twice = finalize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn finalize_orders_and_deduplicates(raw in prop::collection::vec(finding(), 0..32)) {
        let out = finalize(raw.clone());
        for pair in out.windows(2) {
            prop_assert!(pair[0].severity.rank() <= pair[1].severity.rank());
        }

        let mut keys: Vec<_> = out
            .iter()
            .map(|f| (f.vulnerability_type.clone(), f.line_number, f.description.clone()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);

        // Every distinct input key survives.
        for f in &raw {
            prop_assert!(out.iter().any(|o| o.vulnerability_type == f.vulnerability_type
                && o.line_number == f.line_number
                && o.description == f.description));
        }
    }

    #[test]
    fn summary_counts_match(code in source()) {
        let result = analyze(&code, None);
        let counted: usize = Severity::ALL.iter().map(|&s| result.summary.count(s)).sum();
        prop_assert_eq!(counted, result.findings.len());
        prop_assert!((0.0..=100.0).contains(&result.summary.security_score));
    }

    #[test]
    fn generated_evm_addresses_validate(hex in "[0-9a-fA-F]{40}") {
        let address = format!("0x{hex}");
        prop_assert!(is_evm_address(&address));
        prop_assert!(!is_evm_address(&address[..41]));
    }

    #[test]
    fn generated_solana_addresses_validate(addr in "[1-9A-HJ-NP-Za-km-z]{32,44}") {
        prop_assert!(is_solana_address(&addr));
        prop_assert!(!is_evm_address(&addr));
    }
}

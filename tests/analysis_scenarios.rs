use contract_auditor::analyzer::security::RuleSet;
use contract_auditor::analyzer::{analyze, classify, rule_sets_for, Blockchain, Severity};

const WITHDRAW_NO_GUARD: &str = r#"pragma solidity ^0.8.0;

contract Vault {
    function withdraw() public { payable(msg.sender).transfer(address(this).balance); }
}
"#;

const REENTRANT_BANK: &str = r#"pragma solidity ^0.8.0;

contract Bank {
    mapping(address => uint256) public balances;

    function withdraw(uint256 amount) external {
        require(balances[msg.sender] >= amount);
        (bool ok, ) = msg.sender.call{value: amount}("");
        balances[msg.sender] -= amount;
    }
}
"#;

const ANCHOR_PROGRAM: &str = r#"use anchor_lang::prelude::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod vault {
    use super::*;
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        let state = State::try_from_slice_unchecked(&ctx.accounts.state.data.borrow())?;
        let total = state.total.checked_add(amount);
        Ok(())
    }
}
"#;

#[test]
fn public_withdraw_without_guard_is_flagged() {
    let result = analyze(WITHDRAW_NO_GUARD, None);

    let access = result
        .findings
        .iter()
        .find(|f| f.vulnerability_type == "Access Control")
        .expect("access control finding");
    assert_eq!(access.severity, Severity::High);
    assert_eq!(access.line_number, Some(4));
    assert_eq!(access.cwe_id.as_deref(), Some("CWE-284"));
    assert_eq!(access.swc_id.as_deref(), Some("SWC-105"));
    assert!(access.code_snippet.contains(">>>     function withdraw() public"));
}

#[test]
fn call_before_balance_update_is_critical_on_call_line() {
    let result = analyze(REENTRANT_BANK, None);
    assert_eq!(result.context.blockchain, Blockchain::Ethereum);

    let first = result.findings.first().expect("findings");
    assert_eq!(first.severity, Severity::Critical);

    let reentrancy = result
        .findings
        .iter()
        .find(|f| f.vulnerability_type.starts_with("Reentrancy"))
        .expect("reentrancy finding");
    assert_eq!(reentrancy.severity, Severity::Critical);
    assert_eq!(reentrancy.line_number, Some(8));
    assert!(reentrancy.code_snippet.contains(">>>         (bool ok, ) = msg.sender.call"));
}

#[test]
fn guarded_function_is_not_flagged_for_access_control() {
    let code = "pragma solidity ^0.8.0;\ncontract A {\n    function kill() public onlyOwner {\n        selfdestruct(payable(owner));\n    }\n    function total() public view returns (uint256) { return 1; }\n}\n";
    let result = analyze(code, None);
    assert!(result
        .findings
        .iter()
        .all(|f| f.vulnerability_type != "Access Control"));
}

#[test]
fn legacy_compiler_arithmetic_before_first_brace_is_flagged() {
    let code = "pragma solidity ^0.6.12;\n// supply += minted is unchecked below\ncontract Counter {\n    uint256 count;\n}\n";
    let result = analyze(code, None);
    let overflow = result
        .findings
        .iter()
        .find(|f| f.vulnerability_type == "Integer Overflow")
        .expect("overflow finding");
    assert_eq!(overflow.severity, Severity::High);
    assert_eq!(overflow.line_number, Some(1));
}

#[test]
fn legacy_compiler_arithmetic_inside_body_is_not_flagged() {
    let code = "pragma solidity ^0.6.12;\nimport \"./SafeMath.sol\";\ncontract C {\n    function f(uint[] memory xs) internal {\n        for (uint i = 0; i < xs.length; i++) {}\n    }\n}\n";
    let result = analyze(code, None);
    assert!(result
        .findings
        .iter()
        .all(|f| f.vulnerability_type != "Integer Overflow"));
}

#[test]
fn modern_compiler_is_not_flagged_for_overflow() {
    let code = "pragma solidity ^0.8.19;\n// total += x\ncontract C {}\n";
    let result = analyze(code, None);
    assert!(result
        .findings
        .iter()
        .all(|f| f.vulnerability_type != "Integer Overflow"));
}

#[test]
fn deprecated_and_randomness_findings() {
    let code = "pragma solidity ^0.4.24;\ncontract Lottery {\n    function pick() internal {\n        uint256 winner = uint256(keccak256(block.timestamp, randNonce)) % 10;\n        if (winner == 0) throw;\n    }\n}\n";
    let result = analyze(code, None);
    let kinds: Vec<&str> = result
        .findings
        .iter()
        .map(|f| f.vulnerability_type.as_str())
        .collect();
    assert!(kinds.contains(&"Deprecated Functions"));
    assert!(kinds.contains(&"Weak Randomness"));
}

#[test]
fn anchor_program_uses_solana_catalog() {
    let result = analyze(ANCHOR_PROGRAM, None);
    assert_eq!(result.context.blockchain, Blockchain::Solana);
    assert_eq!(result.context.language, "rust");
    assert_eq!(result.context.framework.as_deref(), Some("anchor"));

    let kinds: Vec<&str> = result
        .findings
        .iter()
        .map(|f| f.vulnerability_type.as_str())
        .collect();
    assert!(kinds.contains(&"Unsafe Deserialization"));
    assert!(kinds.contains(&"Integer Overflow"));
    assert!(result.findings.iter().all(|f| f.swc_id.is_none()));
}

#[test]
fn anchor_marker_beats_solidity_pragma() {
    let code = "pragma solidity ^0.8.0;\nuse anchor_lang::prelude::*;\n";
    assert_eq!(classify(code, None).blockchain, Blockchain::Solana);
}

#[test]
fn polygon_overlay_through_url() {
    let code = "pragma solidity ^0.8.0;\ncontract Bridge {\n    function run(uint[] memory xs) internal {\n        for (uint i = 0; i < xs.length; i++) {}\n    }\n}\n";
    let result = analyze(code, Some("https://polygonscan.com/address/0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"));
    assert_eq!(result.context.blockchain, Blockchain::Polygon);
    let gas = result
        .findings
        .iter()
        .find(|f| f.vulnerability_type == "Gas Optimization")
        .expect("gas finding");
    assert_eq!(gas.severity, Severity::Low);
    assert_eq!(gas.line_number, Some(4));
    assert_eq!(rule_sets_for(Blockchain::Polygon), &[RuleSet::Evm, RuleSet::PolygonOverlay]);
}

#[test]
fn findings_are_sorted_and_unique() {
    let result = analyze(REENTRANT_BANK, None);
    for pair in result.findings.windows(2) {
        assert!(pair[0].severity.rank() <= pair[1].severity.rank());
    }
    let mut keys: Vec<_> = result
        .findings
        .iter()
        .map(|f| (f.vulnerability_type.clone(), f.line_number))
        .collect();
    let before = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), before);
}

#[test]
fn empty_source_yields_nothing() {
    let result = analyze("", None);
    assert!(result.findings.is_empty());
    assert_eq!(result.context.blockchain, Blockchain::Ethereum);
    assert_eq!(result.context.language, "unknown");
    assert_eq!(result.summary.security_score, 100.0);
}

#[test]
fn json_export_uses_flat_camel_case_records() {
    let result = analyze(WITHDRAW_NO_GUARD, None);
    let json = serde_json::to_value(&result).unwrap();
    let first = &json["findings"][0];
    for key in [
        "vulnerabilityType",
        "severity",
        "lineNumber",
        "codeSnippet",
        "description",
        "explanation",
        "recommendation",
        "cweId",
        "swcId",
    ] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["context"]["blockchain"], "ethereum");
    assert_eq!(json["codeHash"].as_str().map(str::len), Some(16));
}

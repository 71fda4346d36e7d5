//! # Security Pattern Management
//!
//! Centralized table of vulnerability rules for every supported platform.
//!
//! Rules are stored once in an arena and addressed by id or by [`RuleSet`]. The EVM base
//! rules match across line breaks (`(?ims)`); the Solana and platform overlay rules are
//! line-oriented (`(?im)`), so `.` never leaves the matched line.

use ahash::AHashMap;
use fancy_regex::RegexBuilder;
use log::debug;
use once_cell::sync::Lazy;

use super::core::{PatternRule, RuleSet, Severity};
use super::SecurityError;

/// Backtracking budget per rule and input. Exceeding it ends that rule's scan for the input.
pub const BACKTRACK_LIMIT: usize = 1_000_000;

static CATALOG: Lazy<PatternCatalog> = Lazy::new(|| {
    PatternCatalog::new().expect("built-in vulnerability patterns must compile")
});

/// Uncompiled rule definition.
struct RuleDef {
    id: &'static str,
    set: RuleSet,
    vulnerability_type: &'static str,
    severity: Severity,
    pattern: &'static str,
    description: &'static str,
    explanation: &'static str,
    recommendation: &'static str,
    cwe_id: Option<&'static str>,
    swc_id: Option<&'static str>,
}

const EVM_RULES: &[RuleDef] = &[
    RuleDef {
        id: "reentrancy",
        set: RuleSet::Evm,
        vulnerability_type: "Reentrancy",
        severity: Severity::Critical,
        pattern: r"(?:\.call(?:\.value)?\s*\(|\.send\s*\(|\.transfer\s*\()(?:[^;]*?)(?:before|prior to)(?:[^;]*?)(?:balance|state)",
        description: "Potential reentrancy vulnerability detected",
        explanation: "Reentrancy occurs when a contract calls an external contract before updating its internal state. An attacker can exploit this by implementing a fallback function that calls back into the original contract, potentially draining funds or manipulating state.",
        recommendation: "Use the Checks-Effects-Interactions pattern: perform all checks first, update state variables second, and interact with external contracts last. Consider using OpenZeppelin's ReentrancyGuard modifier.",
        cwe_id: Some("CWE-841"),
        swc_id: Some("SWC-107"),
    },
    RuleDef {
        id: "reentrancy_simple",
        set: RuleSet::Evm,
        vulnerability_type: "Reentrancy Simple",
        severity: Severity::Critical,
        // Accepts `{value: x}` call options and indexed balances such as `balances[msg.sender] -= x`.
        pattern: r"\.call(?:\s*\{[^}]*\})?\s*\([^)]*\)\s*;[^}]*?(?:balance|amount|value)\w*(?:\s*\[[^\]]*\])?\s*(?:-=|\+=|=)",
        description: "External call before state update (potential reentrancy)",
        explanation: "Making external calls before updating state variables can lead to reentrancy attacks where the called contract can call back and exploit the unchanged state.",
        recommendation: "Update state variables before making external calls. Use the Checks-Effects-Interactions pattern or reentrancy guards.",
        cwe_id: Some("CWE-841"),
        swc_id: Some("SWC-107"),
    },
    RuleDef {
        id: "unchecked_call",
        set: RuleSet::Evm,
        vulnerability_type: "Unchecked Call",
        severity: Severity::High,
        pattern: r"(?:\.call|\.send|\.transfer)\s*\([^)]*\)\s*;(?!\s*(?:require|assert|if))",
        description: "Unchecked external call return value",
        explanation: "External calls can fail silently. Not checking return values can lead to unexpected behavior where the contract assumes an operation succeeded when it actually failed.",
        recommendation: "Always check return values of external calls using require() statements or conditional logic. Consider using transfer() instead of send() for Ether transfers as it automatically reverts on failure.",
        cwe_id: Some("CWE-252"),
        swc_id: Some("SWC-104"),
    },
    RuleDef {
        id: "access_control",
        set: RuleSet::Evm,
        vulnerability_type: "Access Control",
        severity: Severity::High,
        pattern: r"function\s+\w+\s*\([^)]*\)\s*(?:public|external)(?!\s+(?:view|pure))(?![^{]*(?:onlyOwner|require\s*\(.*msg\.sender|modifier\s+\w+))",
        description: "Public/external function without access control",
        explanation: "Functions that modify state or perform sensitive operations should have proper access controls to prevent unauthorized access by malicious actors.",
        recommendation: "Add appropriate access control modifiers (e.g., onlyOwner) or require statements to restrict function access to authorized users only.",
        cwe_id: Some("CWE-284"),
        swc_id: Some("SWC-105"),
    },
    RuleDef {
        id: "integer_overflow",
        set: RuleSet::Evm,
        vulnerability_type: "Integer Overflow",
        severity: Severity::High,
        // Only arithmetic before the first `{` after a pre-0.8 pragma is seen.
        pattern: r"pragma\s+solidity\s+[^;]*[0-6]\.[0-7]\.\d+(?:[^{]*(?:\+\+|--|\+=|-=|\*=|/=))",
        description: "Potential integer overflow in pre-0.8.0 Solidity",
        explanation: "Solidity versions before 0.8.0 do not have built-in overflow protection. Arithmetic operations can wrap around, potentially leading to unexpected behavior or vulnerabilities.",
        recommendation: "Upgrade to Solidity 0.8.0+ for built-in overflow protection, or use SafeMath library for arithmetic operations in older versions.",
        cwe_id: Some("CWE-190"),
        swc_id: Some("SWC-101"),
    },
    RuleDef {
        id: "tx_origin",
        set: RuleSet::Evm,
        vulnerability_type: "Tx Origin",
        severity: Severity::Medium,
        pattern: r"tx\.origin\s*(?:==|!=)",
        description: "Use of tx.origin for authorization",
        explanation: "Using tx.origin for authorization is vulnerable to phishing attacks where a malicious contract can trick users into executing transactions that appear to come from the original sender.",
        recommendation: "Use msg.sender instead of tx.origin for authorization checks. tx.origin should only be used when you specifically need the original transaction sender.",
        cwe_id: Some("CWE-346"),
        swc_id: Some("SWC-115"),
    },
    RuleDef {
        id: "deprecated_functions",
        set: RuleSet::Evm,
        vulnerability_type: "Deprecated Functions",
        severity: Severity::Low,
        pattern: r"(?:suicide\s*\(|throw\s*;|block\.blockhash|sha3\s*\()",
        description: "Use of deprecated Solidity functions",
        explanation: "These functions are deprecated and may be removed in future Solidity versions, potentially breaking contract functionality.",
        recommendation: "Replace deprecated functions: use selfdestruct() instead of suicide(), revert() instead of throw, blockhash() instead of block.blockhash, and keccak256() instead of sha3().",
        cwe_id: None,
        swc_id: Some("SWC-111"),
    },
    RuleDef {
        id: "weak_randomness",
        set: RuleSet::Evm,
        vulnerability_type: "Weak Randomness",
        severity: Severity::Medium,
        pattern: r"(?:block\.timestamp|block\.number|block\.difficulty|blockhash\s*\([^)]*\))(?:[^;]*?)(?:random|rand|seed)",
        description: "Weak source of randomness",
        explanation: "Using blockchain data for randomness is predictable and can be manipulated by miners or other actors, making it unsuitable for security-critical random number generation.",
        recommendation: "Use a commit-reveal scheme, oracle services like Chainlink VRF, or other secure randomness solutions instead of blockchain data for random number generation.",
        cwe_id: Some("CWE-338"),
        swc_id: Some("SWC-120"),
    },
    RuleDef {
        id: "uninitialized_storage",
        set: RuleSet::Evm,
        vulnerability_type: "Uninitialized Storage",
        severity: Severity::Medium,
        pattern: r"(?:struct|mapping)(?:[^;]*?)(?:storage)(?:[^;=]*?)(?:;)",
        description: "Potential uninitialized storage pointer",
        explanation: "Uninitialized storage pointers can point to unexpected storage slots, potentially corrupting contract state or allowing unauthorized access to sensitive data.",
        recommendation: "Always explicitly initialize storage pointers or use memory for local variables when appropriate.",
        cwe_id: Some("CWE-909"),
        swc_id: Some("SWC-109"),
    },
    RuleDef {
        id: "delegatecall_danger",
        set: RuleSet::Evm,
        vulnerability_type: "Delegatecall Danger",
        severity: Severity::High,
        pattern: r"delegatecall\s*\(",
        description: "Use of delegatecall",
        explanation: "delegatecall executes code in the context of the calling contract, which can lead to unintended state changes or vulnerabilities if the called contract is malicious or contains bugs.",
        recommendation: "Carefully validate the target address and consider using regular call() instead. If delegatecall is necessary, implement strict access controls and code validation.",
        cwe_id: Some("CWE-470"),
        swc_id: Some("SWC-112"),
    },
];

const SOLANA_RULES: &[RuleDef] = &[
    RuleDef {
        id: "missing_signer_check",
        set: RuleSet::Solana,
        vulnerability_type: "Access Control",
        severity: Severity::High,
        pattern: r"(?:instruction|ctx)\.accounts\.(?!.*\.is_signer).*\.key(?!\s*==\s*ctx\.accounts\.signer\.key)",
        description: "Missing signer verification",
        explanation: "Solana programs must verify that accounts are properly signed",
        recommendation: "Add is_signer checks for account validation",
        cwe_id: Some("CWE-306"),
        swc_id: None,
    },
    RuleDef {
        id: "unchecked_account_ownership",
        set: RuleSet::Solana,
        vulnerability_type: "Access Control",
        severity: Severity::High,
        pattern: r"(?:instruction|ctx)\.accounts\..*\.owner(?!\s*==)",
        description: "Unchecked account ownership",
        explanation: "Account ownership should be verified to prevent unauthorized access",
        recommendation: "Verify account.owner == expected_program_id",
        cwe_id: Some("CWE-284"),
        swc_id: None,
    },
    RuleDef {
        id: "integer_overflow_rust",
        set: RuleSet::Solana,
        vulnerability_type: "Integer Overflow",
        severity: Severity::Medium,
        pattern: r"(?:checked_add|checked_sub|checked_mul|checked_div)\s*\(",
        description: "Potential integer operation without overflow check",
        explanation: "Rust requires explicit overflow handling in financial operations",
        recommendation: "Use checked arithmetic operations",
        cwe_id: Some("CWE-190"),
        swc_id: None,
    },
    RuleDef {
        id: "unsafe_deserialization",
        set: RuleSet::Solana,
        vulnerability_type: "Unsafe Deserialization",
        severity: Severity::High,
        pattern: r"(?:try_from_slice_unchecked|from_bytes_unchecked)",
        description: "Unsafe deserialization",
        explanation: "Unchecked deserialization can lead to memory corruption",
        recommendation: "Use safe deserialization methods with proper validation",
        cwe_id: Some("CWE-502"),
        swc_id: None,
    },
    RuleDef {
        id: "missing_rent_exemption",
        set: RuleSet::Solana,
        vulnerability_type: "Resource Management",
        severity: Severity::Medium,
        pattern: r"AccountInfo.*new.*rent",
        description: "Potential rent exemption issue",
        explanation: "Accounts should be rent-exempt to avoid being cleaned up",
        recommendation: "Ensure accounts have sufficient balance for rent exemption",
        cwe_id: None,
        swc_id: None,
    },
    RuleDef {
        id: "uninitialized_account",
        set: RuleSet::Solana,
        vulnerability_type: "Initialization",
        severity: Severity::High,
        pattern: r"\.data\.borrow\(\).*is_empty\(\)",
        description: "Uninitialized account access",
        explanation: "Accessing uninitialized accounts can lead to undefined behavior",
        recommendation: "Check account initialization before use",
        cwe_id: None,
        swc_id: None,
    },
    RuleDef {
        id: "missing_bump_validation",
        set: RuleSet::Solana,
        vulnerability_type: "Validation",
        severity: Severity::Medium,
        pattern: r"find_program_address.*seeds",
        description: "Potential missing bump seed validation",
        explanation: "PDA bump seeds should be validated to ensure canonical addresses",
        recommendation: "Validate bump seed in account derivation",
        cwe_id: None,
        swc_id: None,
    },
];

const OVERLAY_RULES: &[RuleDef] = &[
    RuleDef {
        id: "pancakeswap_rug",
        set: RuleSet::BscOverlay,
        vulnerability_type: "Rug Pull",
        severity: Severity::Critical,
        pattern: r"PancakeSwap.*rugpull|removeLiquidity.*onlyOwner",
        description: "Potential rug pull mechanism",
        explanation: "Contract may allow owner to remove liquidity unexpectedly",
        recommendation: "Implement timelocks and community governance",
        cwe_id: None,
        swc_id: None,
    },
    RuleDef {
        id: "bep20_issues",
        set: RuleSet::BscOverlay,
        vulnerability_type: "Token Standard",
        severity: Severity::Medium,
        pattern: r"function\s+transfer.*returns\s*\(\s*bool\s*\)(?!.*require)",
        description: "BEP-20 transfer without checks",
        explanation: "BEP-20 transfers should include proper validation",
        recommendation: "Add require statements for transfer validation",
        cwe_id: None,
        swc_id: None,
    },
    RuleDef {
        id: "matic_bridge_issues",
        set: RuleSet::PolygonOverlay,
        vulnerability_type: "Bridge Security",
        severity: Severity::High,
        pattern: r"(?:deposit|withdraw).*Matic.*(?!.*checkpoint)",
        description: "Potential bridge operation without checkpoint",
        explanation: "Polygon bridge operations should include checkpoint validation",
        recommendation: "Implement proper checkpoint validation",
        cwe_id: None,
        swc_id: None,
    },
    RuleDef {
        id: "gas_optimization",
        set: RuleSet::PolygonOverlay,
        vulnerability_type: "Gas Optimization",
        severity: Severity::Low,
        pattern: r"for\s*\(.*length.*\+\+\)",
        description: "Gas inefficient loop",
        explanation: "Polygon gas costs can be optimized with better loop patterns",
        recommendation: "Cache array length and use unchecked increments",
        cwe_id: None,
        swc_id: None,
    },
    RuleDef {
        id: "avalanche_consensus",
        set: RuleSet::AvalancheOverlay,
        vulnerability_type: "Consensus",
        severity: Severity::Medium,
        pattern: r"block\.timestamp.*finality",
        description: "Avalanche consensus timing issue",
        explanation: "Avalanche has different finality guarantees than Ethereum",
        recommendation: "Account for Avalanche's consensus mechanism",
        cwe_id: None,
        swc_id: None,
    },
];

/// Immutable rule arena with lookup by id and by rule set.
#[derive(Debug)]
pub struct PatternCatalog {
    rules: Vec<PatternRule>,
    by_id: AHashMap<&'static str, usize>,
}

impl PatternCatalog {
    /// Compile every built-in rule.
    pub fn new() -> Result<Self, SecurityError> {
        Self::from_defs(EVM_RULES.iter().chain(SOLANA_RULES).chain(OVERLAY_RULES))
    }

    fn from_defs<'d>(defs: impl IntoIterator<Item = &'d RuleDef>) -> Result<Self, SecurityError> {
        let mut rules = Vec::new();
        let mut by_id = AHashMap::new();

        for def in defs {
            if by_id.insert(def.id, rules.len()).is_some() {
                return Err(SecurityError::DuplicateRule(def.id));
            }
            rules.push(compile(def)?);
        }

        debug!("Compiled {} vulnerability patterns", rules.len());
        Ok(Self { rules, by_id })
    }

    /// Process-wide catalog, compiled on first use.
    pub fn global() -> &'static PatternCatalog {
        &CATALOG
    }

    pub fn rule(&self, id: &str) -> Option<&PatternRule> {
        self.by_id.get(id).map(|&idx| &self.rules[idx])
    }

    /// Rules of one set in declaration order.
    pub fn rules_in(&self, set: RuleSet) -> impl Iterator<Item = &PatternRule> + '_ {
        self.rules.iter().filter(move |rule| rule.set == set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> + '_ {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile(def: &RuleDef) -> Result<PatternRule, SecurityError> {
    let flags = match def.set {
        RuleSet::Evm => "(?ims)",
        _ => "(?im)",
    };

    let pattern = RegexBuilder::new(&format!("{flags}{}", def.pattern))
        .backtrack_limit(BACKTRACK_LIMIT)
        .build()
        .map_err(|source| SecurityError::PatternCompilation {
            id: def.id,
            source: Box::new(source),
        })?;

    Ok(PatternRule {
        id: def.id,
        set: def.set,
        vulnerability_type: def.vulnerability_type,
        severity: def.severity,
        description: def.description,
        explanation: def.explanation,
        recommendation: def.recommendation,
        cwe_id: def.cwe_id,
        swc_id: def.swc_id,
        pattern,
    })
}

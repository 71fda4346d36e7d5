//! Rule-set selection per blockchain. Overlays only ever add to the EVM base.

use super::blockchain_detector::Blockchain;
use super::security::RuleSet;

const SOLANA_SETS: &[RuleSet] = &[RuleSet::Solana];
const EVM_SETS: &[RuleSet] = &[RuleSet::Evm];
const BSC_SETS: &[RuleSet] = &[RuleSet::Evm, RuleSet::BscOverlay];
const POLYGON_SETS: &[RuleSet] = &[RuleSet::Evm, RuleSet::PolygonOverlay];
const AVALANCHE_SETS: &[RuleSet] = &[RuleSet::Evm, RuleSet::AvalancheOverlay];

/// Ordered rule sets to run for `blockchain`.
pub fn rule_sets_for(blockchain: Blockchain) -> &'static [RuleSet] {
    match blockchain {
        Blockchain::Solana => SOLANA_SETS,
        Blockchain::Bsc => BSC_SETS,
        Blockchain::Polygon => POLYGON_SETS,
        Blockchain::Avalanche => AVALANCHE_SETS,
        Blockchain::Ethereum | Blockchain::Fantom | Blockchain::Unknown => EVM_SETS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solana_gets_only_solana_rules() {
        assert_eq!(rule_sets_for(Blockchain::Solana), &[RuleSet::Solana]);
    }

    #[test]
    fn test_overlays_follow_base() {
        for chain in [Blockchain::Bsc, Blockchain::Polygon, Blockchain::Avalanche] {
            let sets = rule_sets_for(chain);
            assert_eq!(sets.len(), 2);
            assert_eq!(sets[0], RuleSet::Evm);
        }
        assert_eq!(rule_sets_for(Blockchain::Bsc)[1], RuleSet::BscOverlay);
    }

    #[test]
    fn test_fallback_chains_use_base_only() {
        for chain in [Blockchain::Ethereum, Blockchain::Fantom, Blockchain::Unknown] {
            assert_eq!(rule_sets_for(chain), &[RuleSet::Evm]);
        }
    }
}

//! Well-known verified contracts, handy as fetch targets.

use serde::Serialize;

use super::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifiedContract {
    pub address: &'static str,
    pub name: &'static str,
    pub network: Network,
    pub description: &'static str,
    pub popular: bool,
}

impl VerifiedContract {
    pub fn explorer_url(&self) -> String {
        format!("{}{}", self.network.explorer_url(), self.address)
    }
}

const fn contract(
    address: &'static str,
    name: &'static str,
    network: Network,
    description: &'static str,
    popular: bool,
) -> VerifiedContract {
    VerifiedContract {
        address,
        name,
        network,
        description,
        popular,
    }
}

const KNOWN_CONTRACTS: &[VerifiedContract] = &[
    contract("0xA0b86a33E6441F8C23b5C0B9F2E3D6c96C5F6E98", "USDC Token", Network::Ethereum, "USD Coin - popular stablecoin", true),
    contract("0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI Token", Network::Ethereum, "Dai Stablecoin - decentralized stablecoin", true),
    contract("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", "Uniswap Token", Network::Ethereum, "UNI - Uniswap governance token", true),
    contract("0x7D1AfA7B718fb893dB30A3aBc0Cfc608AaCfeBB0", "Matic Token", Network::Ethereum, "MATIC - Polygon's native token", true),
    contract("0x55d398326f99059fF775485246999027B3197955", "USDT BSC", Network::Bsc, "Tether USD on Binance Smart Chain", true),
    contract("0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56", "BUSD", Network::Bsc, "Binance USD - BSC stablecoin", true),
    contract("0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82", "PancakeSwap Token", Network::Bsc, "CAKE - PancakeSwap governance token", true),
    contract("0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619", "WETH Polygon", Network::Polygon, "Wrapped Ethereum on Polygon", true),
    contract("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "USDC Polygon", Network::Polygon, "USD Coin on Polygon network", true),
    contract("0x514910771AF9Ca656af840dff83E8264EcF986CA", "Chainlink Token", Network::Ethereum, "LINK - Chainlink oracle token", false),
    contract("0xBB0E17EF65F82Ab018d8EDd776e8DD940327B28b", "Axie Infinity", Network::Ethereum, "AXS - Axie Infinity governance token", false),
];

pub fn known_contracts() -> &'static [VerifiedContract] {
    KNOWN_CONTRACTS
}

pub fn contracts_on(network: Network) -> impl Iterator<Item = &'static VerifiedContract> {
    KNOWN_CONTRACTS.iter().filter(move |c| c.network == network)
}

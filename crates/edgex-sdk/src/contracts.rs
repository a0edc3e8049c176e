/*
[INPUT]:  Contract ids/symbols and exchange metadata
[OUTPUT]: Symbol lookups, per-contract tick sizes and price rounding
[POS]:    Reference data - contract-id table and metadata registry
[UPDATE]: When the venue lists new contracts or tick rules change
*/

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::types::{ContractInfo, Metadata};

/// Contract id to symbol, maintained by hand for display purposes
pub const KNOWN_CONTRACTS: &[(&str, &str)] = &[
    ("10000001", "BTCUSDT"),
    ("10000002", "ETHUSDT"),
    ("10000004", "BNBUSDT"),
];

pub const BTC_USDT: &str = "10000001";
pub const ETH_USDT: &str = "10000002";
pub const BNB_USDT: &str = "10000004";

pub fn symbol_for(contract_id: &str) -> Option<&'static str> {
    KNOWN_CONTRACTS
        .iter()
        .find(|(id, _)| *id == contract_id)
        .map(|(_, symbol)| *symbol)
}

/// Case-insensitive symbol lookup
pub fn contract_id_for(symbol: &str) -> Option<&'static str> {
    KNOWN_CONTRACTS
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(symbol))
        .map(|(id, _)| *id)
}

/// Contracts from a metadata response, keyed by contract id
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: HashMap<String, ContractInfo>,
}

impl ContractRegistry {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let contracts = metadata
            .contract_list
            .iter()
            .map(|contract| (contract.contract_id.clone(), contract.clone()))
            .collect();
        Self { contracts }
    }

    pub fn get(&self, contract_id: &str) -> Option<&ContractInfo> {
        self.contracts.get(contract_id)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn tick_size(&self, contract_id: &str) -> Option<Decimal> {
        self.get(contract_id).map(|contract| contract.tick_size)
    }

    /// Round down to a multiple of the contract's tick size
    ///
    /// Unknown contracts and non-positive ticks leave the price unchanged.
    pub fn round_price(&self, contract_id: &str, price: Decimal) -> Decimal {
        match self.tick_size(contract_id) {
            Some(tick) if tick > Decimal::ZERO => (price / tick).floor() * tick,
            _ => price,
        }
    }

    /// Contract ids in ascending order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.contracts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

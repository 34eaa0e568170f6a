//! In-memory price table
//!
//! Static symbol -> price quotes, typically read once from the price file.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::PriceLookup;
use crate::error::{Result, TrackerError};

#[derive(Clone, Debug, Default)]
pub struct PriceTable {
    prices: HashMap<String, Decimal>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quote for a symbol, replacing any earlier one
    pub fn insert(&mut self, symbol: impl Into<String>, price: Decimal) -> Option<Decimal> {
        self.prices.insert(symbol.into(), price)
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (S, Decimal)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().map(|(s, p)| (s.into(), p)).collect(),
        }
    }
}

impl PriceLookup for PriceTable {
    fn market_price(&self, symbol: &str) -> Result<Decimal> {
        self.get(symbol)
            .ok_or_else(|| TrackerError::SymbolNotFound(symbol.to_string()))
    }

    fn name(&self) -> &str {
        "price-table"
    }
}

//! Trade Ledger
//!
//! Append-only store of validated trades, grouped by symbol. Symbols keep
//! the order in which they were first seen so downstream sorting can break
//! ties consistently.

use std::collections::HashMap;

use crate::error::{Result, TrackerError};
use crate::model::Trade;

#[derive(Clone, Debug, Default)]
pub struct TradeLedger {
    /// Symbol -> position in `entries`
    index: HashMap<String, usize>,
    entries: Vec<(String, Vec<Trade>)>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a trade
    pub fn add_trade(&mut self, trade: Trade) -> Result<()> {
        if !trade.is_valid() {
            return Err(TrackerError::InvalidTrade {
                symbol: trade.symbol,
                quantity: trade.quantity,
                price: trade.price,
            });
        }

        self.append(trade);
        Ok(())
    }

    /// Append without validation
    pub(crate) fn append(&mut self, trade: Trade) {
        let slot = match self.index.get(&trade.symbol) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(trade.symbol.clone(), slot);
                self.entries.push((trade.symbol.clone(), Vec::new()));
                slot
            }
        };

        self.entries[slot].1.push(trade);
    }

    /// Trades recorded for a symbol, in insertion order
    pub fn trades(&self, symbol: &str) -> &[Trade] {
        match self.index.get(symbol) {
            Some(&slot) => &self.entries[slot].1,
            None => &[],
        }
    }

    /// Symbols with their trades, in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Trade])> {
        self.entries
            .iter()
            .map(|(symbol, trades)| (symbol.as_str(), trades.as_slice()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(symbol, _)| symbol.as_str())
    }

    pub fn trade_count(&self) -> usize {
        self.entries.iter().map(|(_, trades)| trades.len()).sum()
    }

    pub fn symbol_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_add_trade_groups_by_symbol() {
        let mut ledger = TradeLedger::new();
        ledger.add_trade(Trade::new("BTC", dec!(1), dec!(100))).unwrap();
        ledger.add_trade(Trade::new("ETH", dec!(2), dec!(50))).unwrap();
        ledger.add_trade(Trade::new("BTC", dec!(0.5), dec!(300))).unwrap();

        assert_eq!(ledger.symbol_count(), 2);
        assert_eq!(ledger.trade_count(), 3);
        assert_eq!(ledger.trades("BTC").len(), 2);
        assert_eq!(ledger.trades("BTC")[1].price, dec!(300));
        assert!(ledger.trades("DOGE").is_empty());
    }

    #[test]
    fn test_symbols_keep_first_insertion_order() {
        let mut ledger = TradeLedger::new();
        for symbol in ["SOL", "BTC", "ADA", "BTC", "SOL"] {
            ledger.add_trade(Trade::new(symbol, dec!(1), dec!(1))).unwrap();
        }

        let symbols: Vec<_> = ledger.symbols().collect();
        assert_eq!(symbols, vec!["SOL", "BTC", "ADA"]);
    }

    #[test]
    fn test_invalid_trades_rejected() {
        let mut ledger = TradeLedger::new();

        let zero_qty = ledger.add_trade(Trade::new("BTC", dec!(0), dec!(100)));
        assert!(matches!(zero_qty, Err(TrackerError::InvalidTrade { .. })));

        let negative_price = ledger.add_trade(Trade::new("BTC", dec!(1), dec!(-5)));
        assert!(matches!(negative_price, Err(TrackerError::InvalidTrade { .. })));

        assert!(ledger.is_empty());
    }
}

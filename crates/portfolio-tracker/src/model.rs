//! Domain Models
//!
//! Trades, derived holdings and the per-pass price snapshot.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, TrackerError};

/// A single recorded purchase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Ticker symbol (e.g., "BTC", "ETH")
    pub symbol: String,

    /// Units bought
    pub quantity: Decimal,

    /// Price paid per unit
    pub price: Decimal,
}

impl Trade {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            price,
        }
    }

    /// Amount paid for this trade, `None` if it does not fit a `Decimal`
    pub fn cost(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.price)
    }

    pub fn is_valid(&self) -> bool {
        self.quantity > Decimal::ZERO && self.price > Decimal::ZERO
    }
}

/// Aggregated position in one symbol, derived from all of its trades.
///
/// Never stored; recomputed on every valuation pass. Market-dependent
/// figures take the market price as an argument instead of caching it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,

    /// Sum of trade quantities
    pub quantity: Decimal,

    /// Cost-weighted mean purchase price
    pub average_cost: Decimal,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, average_cost: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_cost,
        }
    }

    /// Build a holding from a symbol's trades.
    ///
    /// Returns `Ok(None)` when the quantities sum to zero, and
    /// `TrackerError::Overflow` when a sum leaves the `Decimal` range.
    pub fn from_trades<'a>(
        symbol: impl Into<String>,
        trades: impl IntoIterator<Item = &'a Trade>,
    ) -> Result<Option<Self>> {
        let symbol = symbol.into();
        let overflow = || TrackerError::overflow(symbol.as_str());

        let (total_qty, total_cost) = trades
            .into_iter()
            .try_fold((Decimal::ZERO, Decimal::ZERO), |(qty, cost), t| {
                Some((qty.checked_add(t.quantity)?, cost.checked_add(t.cost()?)?))
            })
            .ok_or_else(overflow)?;

        if total_qty.is_zero() {
            return Ok(None);
        }

        let average_cost = total_cost.checked_div(total_qty).ok_or_else(overflow)?;
        Ok(Some(Self::new(symbol, total_qty, average_cost)))
    }

    fn overflow(&self) -> TrackerError {
        TrackerError::overflow(self.symbol.as_str())
    }

    /// Total amount paid for the position
    pub fn total_cost(&self) -> Result<Decimal> {
        self.quantity
            .checked_mul(self.average_cost)
            .ok_or_else(|| self.overflow())
    }

    /// Current value: quantity * market price
    pub fn valuation(&self, market_price: Decimal) -> Result<Decimal> {
        self.quantity
            .checked_mul(market_price)
            .ok_or_else(|| self.overflow())
    }

    /// Unrealized profit or loss at the given market price
    pub fn pnl(&self, market_price: Decimal) -> Result<Decimal> {
        market_price
            .checked_sub(self.average_cost)
            .and_then(|gain| self.quantity.checked_mul(gain))
            .ok_or_else(|| self.overflow())
    }

    /// Percentage return over the average cost.
    ///
    /// `average_cost` is positive for every holding built from validated trades.
    pub fn profit_percent(&self, market_price: Decimal) -> Result<Decimal> {
        market_price
            .checked_sub(self.average_cost)
            .and_then(|gain| gain.checked_div(self.average_cost))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| self.overflow())
    }
}

/// Market prices used by a single valuation pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    prices: HashMap<String, Decimal>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, price: Decimal) {
        self.prices.insert(symbol.into(), price);
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.prices.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

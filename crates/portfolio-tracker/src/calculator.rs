//! Holdings Calculator
//!
//! Turns the trade ledger into valued holdings:
//!
//! ```text
//! TradeLedger ──► aggregate per symbol ──► PriceLookup ──► PriceSnapshot
//!                  (Σqty, Σqty·price)          │
//!                                              ▼
//!                                       AlertDispatcher
//!                                              │
//!                          sort by valuation ◄─┘
//! ```
//!
//! A pass either values every symbol or fails as a whole: one missing price
//! poisons the snapshot that export and summary depend on.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::alerts::{AlertDispatcher, PriceListener};
use crate::error::{Result, TrackerError};
use crate::ledger::TradeLedger;
use crate::model::{Holding, PriceSnapshot};
use crate::pricing::PriceLookup;

/// Result of one valuation pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Valuation {
    /// Holdings sorted by descending valuation
    pub holdings: Vec<Holding>,

    /// Market prices used for this pass
    pub snapshot: PriceSnapshot,
}

impl Valuation {
    pub fn into_parts(self) -> (Vec<Holding>, PriceSnapshot) {
        (self.holdings, self.snapshot)
    }

    /// Market price used for a holding in this pass
    pub fn market_price(&self, holding: &Holding) -> Option<Decimal> {
        self.snapshot.get(&holding.symbol)
    }

    /// Holdings paired with their market price, in report order
    pub fn entries(&self) -> impl Iterator<Item = (&Holding, Decimal)> {
        self.holdings
            .iter()
            .filter_map(|h| self.market_price(h).map(|price| (h, price)))
    }

    pub fn total_value(&self) -> Result<Decimal> {
        checked_sum(self.entries().map(|(h, price)| h.valuation(price)))
    }

    pub fn total_cost(&self) -> Result<Decimal> {
        checked_sum(self.holdings.iter().map(Holding::total_cost))
    }

    pub fn total_pnl(&self) -> Result<Decimal> {
        checked_sum(self.entries().map(|(h, price)| h.pnl(price)))
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

fn checked_sum(mut amounts: impl Iterator<Item = Result<Decimal>>) -> Result<Decimal> {
    amounts.try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount?)
            .ok_or_else(|| TrackerError::overflow("portfolio total"))
    })
}

pub struct HoldingsCalculator {
    prices: Arc<dyn PriceLookup>,
    alerts: AlertDispatcher,
}

impl HoldingsCalculator {
    pub fn new(prices: Arc<dyn PriceLookup>) -> Self {
        Self {
            prices,
            alerts: AlertDispatcher::new(),
        }
    }

    /// Register a listener notified of every price used in a pass
    pub fn add_listener<L: PriceListener + 'static>(&mut self, listener: L) {
        self.alerts.register(listener);
    }

    pub fn alerts(&self) -> &AlertDispatcher {
        &self.alerts
    }

    /// Value every symbol in the ledger.
    ///
    /// Listeners fire once per valued symbol on every call, so calling this
    /// twice notifies twice. Amounts outside the `Decimal` range fail the
    /// pass with `TrackerError::Overflow`.
    pub fn compute_holdings(&self, ledger: &TradeLedger) -> Result<Valuation> {
        let mut snapshot = PriceSnapshot::new();
        // Holding with its valuation at this pass's market price
        let mut priced: Vec<(Holding, Decimal)> = Vec::with_capacity(ledger.symbol_count());

        for (symbol, trades) in ledger.iter() {
            let Some(holding) = Holding::from_trades(symbol, trades)? else {
                tracing::debug!(symbol, "skipping symbol with zero net quantity");
                continue;
            };

            let market_price = self.prices.market_price(symbol)?;
            let value = holding.valuation(market_price)?;
            tracing::debug!(
                symbol,
                quantity = %holding.quantity,
                average_cost = %holding.average_cost,
                %market_price,
                source = self.prices.name(),
                "holding valued"
            );

            snapshot.insert(symbol, market_price);
            self.alerts.dispatch(symbol, market_price)?;
            priced.push((holding, value));
        }

        // Stable: equal valuations keep ledger order
        priced.sort_by(|(_, a), (_, b)| b.cmp(a));

        Ok(Valuation {
            holdings: priced.into_iter().map(|(holding, _)| holding).collect(),
            snapshot,
        })
    }
}

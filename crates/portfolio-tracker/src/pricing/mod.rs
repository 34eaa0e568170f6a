//! Price Lookup
//!
//! Abstraction over where market prices come from. The calculator only
//! sees this trait; the CLI backs it with a `PriceTable` loaded from disk.

mod table;

pub use table::PriceTable;

use rust_decimal::Decimal;

use crate::error::Result;

/// Market price source (Strategy pattern)
///
/// Unknown symbols must fail with `TrackerError::SymbolNotFound`.
pub trait PriceLookup: Send + Sync {
    /// Get current market price for a symbol
    fn market_price(&self, symbol: &str) -> Result<Decimal>;

    /// Source name, used in logs
    fn name(&self) -> &str {
        "price-lookup"
    }
}

impl<F> PriceLookup for F
where
    F: Fn(&str) -> Result<Decimal> + Send + Sync,
{
    fn market_price(&self, symbol: &str) -> Result<Decimal> {
        self(symbol)
    }
}

//! Console price listener

use rust_decimal::Decimal;

use super::PriceListener;
use crate::config::CurrencyConversion;
use crate::error::{Result, TrackerError};
use crate::report::round_to;

/// Logs every price used in a valuation pass, in both currencies
#[derive(Clone, Debug, Default)]
pub struct ConsoleListener {
    conversion: CurrencyConversion,
}

impl ConsoleListener {
    pub fn new(conversion: CurrencyConversion) -> Self {
        Self { conversion }
    }

    pub fn describe(&self, symbol: &str, price: Decimal) -> Result<String> {
        let converted = self
            .conversion
            .convert(price)
            .ok_or_else(|| TrackerError::overflow(symbol))?;

        Ok(format!(
            "Price update: {} → {}{} ({}{})",
            symbol,
            self.conversion.primary_symbol,
            round_to(price, 2),
            self.conversion.converted_symbol,
            round_to(converted, 2),
        ))
    }
}

impl PriceListener for ConsoleListener {
    fn on_price_change(&self, symbol: &str, price: Decimal) -> Result<()> {
        tracing::info!("{}", self.describe(symbol, price)?);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

//! Threshold alert listener
//!
//! Appends an alert record whenever a market price exceeds the configured
//! threshold. The alert file is opened in append mode for each record and
//! never truncated.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use rust_decimal::Decimal;

use super::PriceListener;
use crate::config::CurrencyConversion;
use crate::error::{Result, TrackerError};
use crate::report::round_to;

/// Local time with zone, e.g. `Sun Oct 18 09:05:03 +02:00 2026`
const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

#[derive(Clone, Debug)]
pub struct ThresholdAlertListener {
    path: PathBuf,
    threshold: Decimal,
    conversion: CurrencyConversion,
}

impl ThresholdAlertListener {
    pub fn new(path: impl Into<PathBuf>, threshold: Decimal, conversion: CurrencyConversion) -> Self {
        Self {
            path: path.into(),
            threshold,
            conversion,
        }
    }

    /// Whether a price triggers an alert (strictly above the threshold)
    pub fn triggers(&self, price: Decimal) -> bool {
        price > self.threshold
    }

    /// Render the alert record for a symbol, without timestamp
    pub fn alert_message(&self, symbol: &str, price: Decimal) -> Result<String> {
        let converted = self
            .conversion
            .convert(price)
            .ok_or_else(|| TrackerError::overflow(symbol))?;

        Ok(format!(
            "{} exceeded {}{} → {}{} ({}{})",
            symbol,
            self.conversion.primary_symbol,
            self.threshold.normalize(),
            self.conversion.primary_symbol,
            round_to(price, 2),
            self.conversion.converted_symbol,
            round_to(converted, 2),
        ))
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "ALERT [{}]: {}", Local::now().format(TIMESTAMP_FORMAT), message)
    }
}

impl PriceListener for ThresholdAlertListener {
    /// Write failures are logged and swallowed so one bad alert never
    /// aborts a valuation pass. A price that cannot be converted fails it.
    fn on_price_change(&self, symbol: &str, price: Decimal) -> Result<()> {
        if !self.triggers(price) {
            return Ok(());
        }

        let message = self.alert_message(symbol, price)?;
        match self.append(&message) {
            Ok(()) => tracing::debug!(symbol, %price, path = %self.path.display(), "alert recorded"),
            Err(e) => tracing::error!(
                symbol,
                path = %self.path.display(),
                error = %e,
                "Failed to write alert"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "threshold-alert"
    }
}

//! P&L Report
//!
//! Renders a valuation into one record per holding, plus the portfolio
//! summary line. Formatting is pure; `write_report` is the only part that
//! touches the filesystem.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::calculator::Valuation;
use crate::config::{CurrencyConversion, ReportFormat};
use crate::error::{Result, TrackerError};

/// Round half away from zero and pin the scale, so `Display` always shows
/// exactly `dp` decimals.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// One formatted report record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub symbol: String,
    /// 4 decimals
    pub quantity: Decimal,
    pub value: Decimal,
    pub value_converted: Decimal,
    pub pnl: Decimal,
    pub pnl_converted: Decimal,
    pub profit_percent: Decimal,

    #[serde(skip)]
    currency: (String, String),
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (primary, converted) = &self.currency;
        write!(
            f,
            "{}, Qty: {}, Value: {primary}{} ({converted}{}), P&L: {primary}{} ({converted}{}), Profit%: {}%",
            self.symbol,
            self.quantity,
            self.value,
            self.value_converted,
            self.pnl,
            self.pnl_converted,
            self.profit_percent,
        )
    }
}

/// Turns valuations into report records
#[derive(Clone, Debug, Default)]
pub struct ReportFormatter {
    conversion: CurrencyConversion,
}

impl ReportFormatter {
    pub fn new(conversion: CurrencyConversion) -> Self {
        Self { conversion }
    }

    /// One record per holding, in valuation order.
    ///
    /// Fails with `TrackerError::Overflow` if any amount leaves the `Decimal`
    /// range; no partial report is produced.
    pub fn format(&self, valuation: &Valuation) -> Result<Vec<ReportLine>> {
        valuation
            .entries()
            .map(|(holding, market_price)| {
                let value = holding.valuation(market_price)?;
                let pnl = holding.pnl(market_price)?;

                Ok(ReportLine {
                    symbol: holding.symbol.clone(),
                    quantity: round_to(holding.quantity, 4),
                    value: round_to(value, 2),
                    value_converted: round_to(convert(&self.conversion, &holding.symbol, value)?, 2),
                    pnl: round_to(pnl, 2),
                    pnl_converted: round_to(convert(&self.conversion, &holding.symbol, pnl)?, 2),
                    profit_percent: round_to(holding.profit_percent(market_price)?, 2),
                    currency: (
                        self.conversion.primary_symbol.clone(),
                        self.conversion.converted_symbol.clone(),
                    ),
                })
            })
            .collect()
    }

    pub fn summary(&self, valuation: &Valuation) -> Result<PortfolioSummary> {
        PortfolioSummary::from_valuation(valuation, &self.conversion)
    }
}

fn convert(conversion: &CurrencyConversion, symbol: &str, amount: Decimal) -> Result<Decimal> {
    conversion
        .convert(amount)
        .ok_or_else(|| TrackerError::overflow(symbol))
}

/// Portfolio-wide totals for one valuation pass
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub holdings: usize,
    pub total_value: Decimal,
    pub total_value_converted: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_converted: Decimal,

    #[serde(skip)]
    currency: (String, String),
}

impl PortfolioSummary {
    pub fn from_valuation(valuation: &Valuation, conversion: &CurrencyConversion) -> Result<Self> {
        let total_value = valuation.total_value()?;
        let total_pnl = valuation.total_pnl()?;

        Ok(Self {
            holdings: valuation.len(),
            total_value: round_to(total_value, 2),
            total_value_converted: round_to(convert(conversion, "portfolio total", total_value)?, 2),
            total_pnl: round_to(total_pnl, 2),
            total_pnl_converted: round_to(convert(conversion, "portfolio total", total_pnl)?, 2),
            currency: (
                conversion.primary_symbol.clone(),
                conversion.converted_symbol.clone(),
            ),
        })
    }
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (primary, converted) = &self.currency;
        write!(
            f,
            "Portfolio Summary: {} holdings, Total Value: {primary}{} ({converted}{}), Total P&L: {primary}{} ({converted}{})",
            self.holdings,
            self.total_value,
            self.total_value_converted,
            self.total_pnl,
            self.total_pnl_converted,
        )
    }
}

/// Write report records in the requested format
pub fn render<W: Write>(out: &mut W, lines: &[ReportLine], format: ReportFormat) -> Result<()> {
    for line in lines {
        match format {
            ReportFormat::Text => writeln!(out, "{line}")?,
            ReportFormat::Json => {
                serde_json::to_writer(&mut *out, line)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Truncate-and-write the report to `path`
pub fn write_report(path: &Path, lines: &[ReportLine], format: ReportFormat) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    render(&mut out, lines, format)?;
    out.flush()?;

    tracing::info!(path = %path.display(), records = lines.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::HoldingsCalculator;
    use crate::ledger::TradeLedger;
    use crate::model::Trade;
    use crate::pricing::PriceTable;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn sample_valuation() -> Valuation {
        let mut ledger = TradeLedger::new();
        ledger.add_trade(Trade::new("BTC", dec!(1), dec!(100))).unwrap();
        ledger.add_trade(Trade::new("BTC", dec!(1), dec!(300))).unwrap();
        ledger.add_trade(Trade::new("ETH", dec!(3), dec!(60))).unwrap();

        let prices: PriceTable = [("BTC", dec!(400)), ("ETH", dec!(40))].into_iter().collect();
        HoldingsCalculator::new(Arc::new(prices))
            .compute_holdings(&ledger)
            .unwrap()
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(dec!(800), 2).to_string(), "800.00");
        assert_eq!(round_to(dec!(1.005), 2).to_string(), "1.01");
        assert_eq!(round_to(dec!(-1.005), 2).to_string(), "-1.01");
        assert_eq!(round_to(dec!(0.123456), 4).to_string(), "0.1235");
    }

    #[test]
    fn test_text_lines() {
        let lines = ReportFormatter::new(CurrencyConversion::new(dec!(84)))
            .format(&sample_valuation())
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].to_string(),
            "BTC, Qty: 2.0000, Value: $800.00 (₹67200.00), P&L: $400.00 (₹33600.00), Profit%: 100.00%"
        );
        assert_eq!(
            lines[1].to_string(),
            "ETH, Qty: 3.0000, Value: $120.00 (₹10080.00), P&L: $-60.00 (₹-5040.00), Profit%: -33.33%"
        );
    }

    #[test]
    fn test_json_lines() {
        let lines = ReportFormatter::default().format(&sample_valuation()).unwrap();
        let mut buf = Vec::new();
        render(&mut buf, &lines, ReportFormat::Json).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["symbol"], "BTC");
        assert_eq!(first["value"], "800.00");
        assert_eq!(first["profit_percent"], "100.00");
        assert!(first.get("currency").is_none());
    }

    #[test]
    fn test_summary() {
        let summary = ReportFormatter::default().summary(&sample_valuation()).unwrap();

        assert_eq!(summary.holdings, 2);
        assert_eq!(summary.total_value, dec!(920));
        assert_eq!(
            summary.to_string(),
            "Portfolio Summary: 2 holdings, Total Value: $920.00 (₹77280.00), Total P&L: $340.00 (₹28560.00)"
        );
    }

    #[test]
    fn test_write_report_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pnl_report.csv");
        std::fs::write(&path, "stale line\nanother stale line\nthird\n").unwrap();

        let lines = ReportFormatter::default().format(&sample_valuation()).unwrap();
        write_report(&path, &lines, ReportFormat::Text).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("BTC, Qty: 2.0000"));
        assert!(!contents.contains("stale"));
    }

    #[test]
    fn test_write_report_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");
        let lines = ReportFormatter::default().format(&sample_valuation()).unwrap();

        assert!(write_report(&path, &lines, ReportFormat::Text).is_err());
    }

    #[test]
    fn test_unconvertible_value_fails_format() {
        let mut ledger = TradeLedger::new();
        ledger.add_trade(Trade::new("BTC", dec!(1), dec!(100))).unwrap();
        let huge = Decimal::from(10_i64.pow(14)) * Decimal::from(10_i64.pow(13));
        let prices: PriceTable = [("BTC", huge)].into_iter().collect();
        let valuation = HoldingsCalculator::new(Arc::new(prices))
            .compute_holdings(&ledger)
            .unwrap();

        let formatter = ReportFormatter::new(CurrencyConversion::new(dec!(84)));
        assert!(matches!(
            formatter.format(&valuation),
            Err(TrackerError::Overflow { symbol }) if symbol == "BTC"
        ));
        assert!(matches!(formatter.summary(&valuation), Err(TrackerError::Overflow { .. })));
    }
}

//! Input Parsing
//!
//! Line-oriented `symbol,quantity,price` trade records and `symbol,price`
//! quotes. Bad lines never stop a load: they are counted, logged and skipped.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Result, TrackerError};
use crate::ledger::TradeLedger;
use crate::model::Trade;
use crate::pricing::PriceTable;

/// Outcome counters for a trade load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Trades added to the ledger
    pub loaded: usize,
    /// Exact repeats of an earlier line
    pub duplicates: usize,
    /// Wrong field count
    pub malformed: usize,
    /// Non-numeric values or failed validation
    pub rejected: usize,
}

/// Parse a decimal, accepting plain and scientific notation.
///
/// Digit separators (`1_000`) are not numbers here.
fn parse_number(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.contains('_') {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Headerless, unquoted comma-separated records with trimmed fields, each
/// paired with its trimmed source line
fn records(input: &str) -> impl Iterator<Item = Result<(&str, StringRecord)>> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(input.as_bytes())
        .into_records()
        .map(move |record| {
            record
                .map(|record| (source_line(input, &record), record))
                .map_err(TrackerError::from)
        })
}

fn source_line<'a>(input: &'a str, record: &StringRecord) -> &'a str {
    let start = record
        .position()
        .and_then(|pos| usize::try_from(pos.byte()).ok())
        .unwrap_or_default();

    input
        .get(start..)
        .and_then(|rest| rest.lines().next())
        .unwrap_or_default()
        .trim()
}

/// Record fields with trailing empty ones dropped, so `BTC,1,100,` has three
fn record_fields(record: &StringRecord) -> Vec<&str> {
    let mut fields: Vec<&str> = record.iter().collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}

/// Read trades into the ledger.
///
/// Blank lines, duplicate lines and lines without exactly three fields are
/// ignored. Lines whose numbers don't parse or that the ledger rejects are
/// skipped with a warning.
pub fn read_trades<R: Read>(reader: R, ledger: &mut TradeLedger) -> Result<IngestStats> {
    let input = std::io::read_to_string(reader)?;
    let mut stats = IngestStats::default();
    let mut seen = HashSet::new();

    for record in records(&input) {
        let (line, record) = record?;
        if line.is_empty() {
            continue;
        }
        if !seen.insert(line) {
            stats.duplicates += 1;
            continue;
        }

        let fields = record_fields(&record);
        let &[symbol, quantity, price] = fields.as_slice() else {
            tracing::debug!(line, "ignoring trade line with wrong field count");
            stats.malformed += 1;
            continue;
        };

        let (Some(quantity), Some(price)) = (parse_number(quantity), parse_number(price)) else {
            tracing::warn!(line, "Skipping invalid line");
            stats.rejected += 1;
            continue;
        };

        match ledger.add_trade(Trade::new(symbol, quantity, price)) {
            Ok(()) => {
                tracing::info!("{}: {} @ ${}", symbol, quantity.round_dp(4), price.round_dp(2));
                stats.loaded += 1;
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(line, error = %e, "Skipping invalid line");
                stats.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(stats)
}

/// Read trades from a file into the ledger
pub fn load_trades(path: &Path, ledger: &mut TradeLedger) -> Result<IngestStats> {
    tracing::info!(path = %path.display(), "Loading trades");
    let file = File::open(path)?;
    let stats = read_trades(file, ledger)?;

    tracing::info!(
        duplicates = stats.duplicates,
        malformed = stats.malformed,
        rejected = stats.rejected,
        "Loaded {} trades successfully",
        stats.loaded
    );
    Ok(stats)
}

/// Read `symbol,price` quotes. A later quote for a symbol replaces the earlier one.
pub fn read_prices<R: Read>(reader: R) -> Result<PriceTable> {
    let input = std::io::read_to_string(reader)?;
    let mut table = PriceTable::new();
    let mut quotes = 0usize;

    for record in records(&input) {
        let (line, record) = record?;
        if line.is_empty() {
            continue;
        }

        let fields = record_fields(&record);
        let &[symbol, price] = fields.as_slice() else {
            continue;
        };

        let Some(price) = parse_number(price) else {
            tracing::warn!(line, "Invalid price format");
            continue;
        };

        tracing::info!("{}: ${}", symbol, price.round_dp(2));
        table.insert(symbol, price);
        quotes += 1;
    }

    tracing::info!("Loaded {} price quotes", quotes);
    Ok(table)
}

/// Load the price file.
///
/// A missing or unreadable file gives an empty table; any symbol then
/// fails lookup during valuation.
pub fn load_prices(path: &Path) -> PriceTable {
    tracing::info!(path = %path.display(), "Loading prices");

    let loaded = File::open(path)
        .map_err(TrackerError::from)
        .and_then(read_prices);

    match loaded {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load prices");
            PriceTable::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ingest(input: &str) -> (TradeLedger, IngestStats) {
        let mut ledger = TradeLedger::new();
        let stats = read_trades(input.as_bytes(), &mut ledger).unwrap();
        (ledger, stats)
    }

    #[test]
    fn test_reads_valid_trades() {
        let (ledger, stats) = ingest("BTC,0.5,40000\n ETH , 2 , 3000 \n\nBTC,0.25,60000\n");

        assert_eq!(stats.loaded, 3);
        assert_eq!(ledger.trades("BTC").len(), 2);
        assert_eq!(ledger.trades("ETH")[0], Trade::new("ETH", dec!(2), dec!(3000)));
    }

    #[test]
    fn test_duplicate_lines_ingested_once() {
        let (ledger, stats) = ingest("BTC,1,100\nBTC,1,100\n  BTC,1,100  \nBTC,1,100.0\n");

        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.duplicates, 2);
        assert_eq!(ledger.trades("BTC").len(), 2);
    }

    #[test]
    fn test_trailing_empty_fields_are_ignored() {
        let (ledger, stats) = ingest("BTC,1,100,
ETH,2,50,,
SOL,,10
");

        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(ledger.trades("BTC")[0], Trade::new("BTC", dec!(1), dec!(100)));
        assert_eq!(ledger.trades("ETH")[0], Trade::new("ETH", dec!(2), dec!(50)));

        let table = read_prices("BTC,97500,
".as_bytes()).unwrap();
        assert_eq!(table.get("BTC"), Some(dec!(97500)));
    }

    #[test]
    fn test_digit_separators_rejected() {
        let (ledger, stats) = ingest("BTC,1_000,100
ETH,1,2_000
SOL,10,20
");

        assert_eq!(stats.loaded, 1);
        assert_eq!(stats.rejected, 2);
        assert!(ledger.trades("BTC").is_empty());
        assert_eq!(parse_number("1_000"), None);
        assert_eq!(parse_number("1000"), Some(dec!(1000)));
    }

    #[test]
    fn test_whitespace_only_and_crlf_lines() {
        let (ledger, stats) = ingest("BTC,1,100\r\n   \r\nETH,2,50\r\nBTC,1,100\r\n");

        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.malformed, 0);
        assert_eq!(ledger.trades("ETH")[0].price, dec!(50));
    }

    #[test]
    fn test_oversized_values_load_then_fail_valuation() {
        use crate::calculator::HoldingsCalculator;
        use std::sync::Arc;

        let (ledger, stats) = ingest("BTC,1e15,1e15\n");
        assert_eq!(stats.loaded, 1);

        let prices: PriceTable = [("BTC", dec!(1))].into_iter().collect();
        let result = HoldingsCalculator::new(Arc::new(prices)).compute_holdings(&ledger);
        assert!(matches!(result, Err(TrackerError::Overflow { symbol }) if symbol == "BTC"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let input = "BTC,1,100\nETH,2\nSOL,abc,10\nADA,1,2,3\nDOT,-1,5\nLINK,3,0\nETH,2,3000\n";
        let (ledger, stats) = ingest(input);

        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.rejected, 3);
        let symbols: Vec<_> = ledger.symbols().collect();
        assert_eq!(symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn test_scientific_notation() {
        let (ledger, _) = ingest("SHIB,1e6,2.2e-5\n");
        assert_eq!(ledger.trades("SHIB")[0].quantity, dec!(1000000));
        assert_eq!(ledger.trades("SHIB")[0].price, dec!(0.000022));
    }

    #[test]
    fn test_read_prices() {
        let table = read_prices("BTC,97500\n\nETH, 3450\nBAD\nSOL,oops\nETH,3500\n".as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("BTC"), Some(dec!(97500)));
        assert_eq!(table.get("ETH"), Some(dec!(3500)));
        assert!(table.get("SOL").is_none());
    }

    #[test]
    fn test_missing_price_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_prices(&dir.path().join("nope.csv"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_trade_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = TradeLedger::new();
        assert!(load_trades(&dir.path().join("nope.csv"), &mut ledger).is_err());
    }
}

//! Run Configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! by the binary beforehand), falling back to the defaults below.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

pub const DEFAULT_CONVERSION_RATE: Decimal = dec!(84);
pub const DEFAULT_ALERT_THRESHOLD: Decimal = dec!(1000);

/// Fixed conversion from the primary currency to a second display currency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    /// Units of converted currency per unit of primary currency
    pub rate: Decimal,

    /// Symbol printed before primary amounts
    pub primary_symbol: String,

    /// Symbol printed before converted amounts
    pub converted_symbol: String,
}

impl Default for CurrencyConversion {
    fn default() -> Self {
        Self {
            rate: DEFAULT_CONVERSION_RATE,
            primary_symbol: "$".into(),
            converted_symbol: "₹".into(),
        }
    }
}

impl CurrencyConversion {
    pub fn new(rate: Decimal) -> Self {
        Self {
            rate,
            ..Default::default()
        }
    }

    /// Amount in the converted currency, `None` if it leaves the `Decimal` range
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.rate)
    }
}

/// Output format of the P&L report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One human-readable line per holding
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for ReportFormat {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TrackerError::Config(format!("unknown report format '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub trades_file: PathBuf,
    pub prices_file: PathBuf,
    pub report_file: PathBuf,
    pub alerts_file: PathBuf,
    pub conversion: CurrencyConversion,

    /// Prices strictly above this trigger an alert record
    pub alert_threshold: Decimal,

    pub report_format: ReportFormat,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            trades_file: "trades.csv".into(),
            prices_file: "prices.csv".into(),
            report_file: "pnl_report.csv".into(),
            alerts_file: "alerts.txt".into(),
            conversion: CurrencyConversion::default(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            report_format: ReportFormat::Text,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| lookup(key).map_or(default, PathBuf::from);

        let rate = match lookup("CONVERSION_RATE") {
            Some(raw) => parse_decimal_setting("CONVERSION_RATE", &raw)?,
            None => defaults.conversion.rate,
        };
        if rate <= Decimal::ZERO {
            return Err(TrackerError::Config(format!(
                "CONVERSION_RATE must be positive, got {rate}"
            )));
        }

        let alert_threshold = match lookup("ALERT_THRESHOLD") {
            Some(raw) => parse_decimal_setting("ALERT_THRESHOLD", &raw)?,
            None => defaults.alert_threshold,
        };

        let report_format = match lookup("REPORT_FORMAT") {
            Some(raw) => raw.parse::<ReportFormat>()?,
            None => defaults.report_format,
        };

        let conversion = CurrencyConversion {
            rate,
            primary_symbol: lookup("PRIMARY_CURRENCY").unwrap_or(defaults.conversion.primary_symbol),
            converted_symbol: lookup("CONVERTED_CURRENCY")
                .unwrap_or(defaults.conversion.converted_symbol),
        };

        Ok(Self {
            trades_file: path("TRADES_FILE", defaults.trades_file),
            prices_file: path("PRICES_FILE", defaults.prices_file),
            report_file: path("REPORT_FILE", defaults.report_file),
            alerts_file: path("ALERTS_FILE", defaults.alerts_file),
            conversion,
            alert_threshold,
            report_format,
        })
    }
}

fn parse_decimal_setting(key: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| TrackerError::Config(format!("{key}='{raw}' is not a number: {e}")))
}

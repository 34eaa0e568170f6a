//! Error Types for the Portfolio Tracker

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid trade for {symbol}: quantity {quantity} and price {price} must be positive")]
    InvalidTrade {
        symbol: String,
        quantity: Decimal,
        price: Decimal,
    },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Arithmetic overflow while valuing {symbol}")]
    Overflow { symbol: String },

    #[error("Price listener '{listener}' failed: {reason}")]
    Listener {
        listener: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrackerError {
    pub fn overflow(symbol: impl Into<String>) -> Self {
        Self::Overflow {
            symbol: symbol.into(),
        }
    }

    /// Errors raised while reading input records; the record is skipped
    /// and ingestion carries on.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidTrade { .. })
    }
}

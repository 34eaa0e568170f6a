//! # portfolio-tracker
//!
//! Profit-and-loss reporting for recorded cryptocurrency trades.
//!
//! ## Pipeline
//!
//! ```text
//! trades.csv ──► TradeLedger ──┐
//!                              ├──► HoldingsCalculator ──► Valuation ──► ReportFormatter ──► pnl_report.csv
//! prices.csv ──► PriceTable ───┘            │
//!                                           └──► AlertDispatcher ──► console / alerts.txt
//! ```
//!
//! ## Example: averaging cost basis
//!
//! ```text
//! BTC  1 @ $100
//! BTC  1 @ $300      →  BTC  qty 2, avg $200
//! market $400        →  value $800, P&L +$400, +100%
//! ```
//!
//! All amounts are `rust_decimal::Decimal`, so a single trade at price P
//! averages to exactly P.

pub mod alerts;
pub mod calculator;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod model;
pub mod pricing;
pub mod report;

pub use alerts::{AlertDispatcher, ConsoleListener, PriceListener, ThresholdAlertListener};
pub use calculator::{HoldingsCalculator, Valuation};
pub use config::{CurrencyConversion, ReportFormat, TrackerConfig};
pub use error::{Result, TrackerError};
pub use ingest::IngestStats;
pub use ledger::TradeLedger;
pub use model::{Holding, PriceSnapshot, Trade};
pub use pricing::{PriceLookup, PriceTable};
pub use report::{PortfolioSummary, ReportFormatter, ReportLine};

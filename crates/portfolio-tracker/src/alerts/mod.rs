//! Price Alerts
//!
//! Listeners are registered on an `AlertDispatcher` and told about every
//! market price used during a valuation pass. Dispatch is synchronous and
//! follows registration order.

mod console;
mod threshold;

pub use console::ConsoleListener;
pub use threshold::ThresholdAlertListener;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};

/// Price change observer - implement to react to valuation passes
pub trait PriceListener: Send + Sync {
    /// Called once per priced symbol per valuation pass
    fn on_price_change(&self, symbol: &str, price: Decimal) -> Result<()>;

    /// Listener name, used in logs and errors
    fn name(&self) -> &str {
        "listener"
    }
}

impl<F> PriceListener for F
where
    F: Fn(&str, Decimal) -> Result<()> + Send + Sync,
{
    fn on_price_change(&self, symbol: &str, price: Decimal) -> Result<()> {
        self(symbol, price)
    }
}

/// Ordered set of price listeners
#[derive(Clone, Default)]
pub struct AlertDispatcher {
    listeners: Vec<Arc<dyn PriceListener>>,
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("listeners", &self.names())
            .finish()
    }
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener
    pub fn register<L: PriceListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Arc::new(listener));
    }

    /// Notify every listener in registration order.
    ///
    /// Stops at the first failing listener; later listeners are not called.
    pub fn dispatch(&self, symbol: &str, price: Decimal) -> Result<()> {
        for listener in &self.listeners {
            listener
                .on_price_change(symbol, price)
                .map_err(|e| TrackerError::Listener {
                    listener: listener.name().to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

//! Application state for the Payroll Computation Engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::store::PayrollLedger;

/// Shared application state.
///
/// Holds the loaded statutory schedule and the ledger all handlers read from
/// and commit to.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    ledger: Arc<PayrollLedger>,
}

impl AppState {
    /// Creates a new application state with an empty ledger.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_ledger(config, Arc::new(PayrollLedger::new()))
    }

    /// Creates a new application state over an existing ledger.
    pub fn with_ledger(config: ConfigLoader, ledger: Arc<PayrollLedger>) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a reference to the ledger.
    pub fn ledger(&self) -> &PayrollLedger {
        &self.ledger
    }

    /// Returns a shared handle to the ledger.
    pub fn ledger_handle(&self) -> Arc<PayrollLedger> {
        Arc::clone(&self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone_and_send() {
        fn assert_state<T: Clone + Send + Sync + 'static>() {}
        assert_state::<AppState>();
    }

    #[test]
    fn test_clones_share_the_ledger() {
        let state = AppState::new(ConfigLoader::default());
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.ledger_handle(), &clone.ledger_handle()));
    }
}

use std::sync::Arc;

use crate::bank::BankApi;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Account lifecycle + transfer engine over the configured store
    pub bank: Arc<dyn BankApi>,
}

impl AppState {
    pub fn new(bank: Arc<dyn BankApi>) -> Self {
        Self { bank }
    }
}

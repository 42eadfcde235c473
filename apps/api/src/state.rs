//! Shared application state.

use std::sync::Arc;

use orderdesk_db::Database;
use orderdesk_pay::PaymentProvider;

use crate::config::ApiConfig;

/// Everything a request handler can reach.
pub struct AppState {
    pub db: Database,
    pub payments: Arc<dyn PaymentProvider>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, payments: Arc<dyn PaymentProvider>, config: ApiConfig) -> Arc<Self> {
        Arc::new(AppState {
            db,
            payments,
            config,
        })
    }
}

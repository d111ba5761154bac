pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod testing;
pub mod views;

use std::sync::Arc;

use services::auth::{AuthGateway, IdentityProvider};
use services::dashboard::DashboardSettings;
use services::page::PageHost;
use services::report_store::ReportStore;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: AuthGateway,
    pub store: Arc<dyn ReportStore>,
    pub pages: PageHost,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn ReportStore>,
        settings: DashboardSettings,
    ) -> Self {
        let gateway = AuthGateway::new(provider);
        let pages = PageHost::new(gateway.clone(), store.clone(), settings);
        Self {
            gateway,
            store,
            pages,
        }
    }
}

//! Hosts the single live dashboard page of the process.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::services::auth::AuthGateway;
use crate::services::dashboard::{self, DashboardController, DashboardPhase, DashboardSettings};
use crate::services::report_store::ReportStore;
use crate::views::{MemoryPage, Surface};

struct OpenPage {
    page: Arc<MemoryPage>,
    task: JoinHandle<DashboardPhase>,
}

/// Page loads, reloads and logout for the one dashboard page instance.
#[derive(Clone)]
pub struct PageHost {
    gateway: AuthGateway,
    store: Arc<dyn ReportStore>,
    settings: DashboardSettings,
    open: Arc<Mutex<Option<OpenPage>>>,
}

impl PageHost {
    pub fn new(
        gateway: AuthGateway,
        store: Arc<dyn ReportStore>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            gateway,
            store,
            settings,
            open: Arc::new(Mutex::new(None)),
        }
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    /// Replace any open page with a fresh instance and start its controller.
    pub async fn reload(&self) -> Arc<MemoryPage> {
        let mut open = self.open.lock().await;
        if let Some(previous) = open.take() {
            previous.task.abort();
        }
        let started = self.start_page();
        let page = started.page.clone();
        *open = Some(started);
        page
    }

    /// The open page, loading one if none exists yet.
    pub async fn current(&self) -> Arc<MemoryPage> {
        let mut open = self.open.lock().await;
        if let Some(existing) = open.as_ref() {
            return existing.page.clone();
        }
        let started = self.start_page();
        let page = started.page.clone();
        *open = Some(started);
        page
    }

    /// Sign out and send the open page (if any) to the sign-in entry point.
    pub async fn logout(&self) {
        let page = self.open.lock().await.as_ref().map(|o| o.page.clone());
        match page {
            Some(page) => {
                let surface = Surface::memory(&page);
                dashboard::logout(&self.gateway, &surface, &self.settings.sign_in_path).await
            }
            None => {
                if let Err(e) = self.gateway.sign_out().await {
                    tracing::warn!(error = %e, "Sign-out failed");
                }
            }
        }
    }

    fn start_page(&self) -> OpenPage {
        tracing::info!("Opening dashboard page");
        let page = Arc::new(MemoryPage::new());
        let controller = DashboardController::new(
            self.gateway.clone(),
            self.store.clone(),
            Surface::memory(&page),
            self.settings.clone(),
        );
        let task = tokio::spawn(async move {
            let phase = controller.run().await;
            tracing::info!(phase = ?phase, "Dashboard page finished processing auth events");
            phase
        });
        OpenPage { page, task }
    }
}

//! Dashboard controller: admin gate, single report load per session, and the
//! page state machine.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::errors::DashboardError;
use crate::models::account::AuthUser;
use crate::services::aggregator::{ReportWindow, SummaryTiles};
use crate::services::auth::{AuthGateway, AuthState, AuthSubscription};
use crate::services::report_store::ReportStore;
use crate::views::{StatusKind, Surface};

/// Number of weekly reports shown on the dashboard.
pub const REPORT_WINDOW_SIZE: i64 = 8;

pub const CHECKING_PERMISSIONS: &str = "Checking permissions...";
pub const ACCESS_DENIED: &str = "Access denied. Admin only.";
pub const PERMISSION_HINT: &str = "Permission error: check report store access rules.";
pub const LOADING_REPORTS: &str = "Loading latest weekly reports...";
pub const NO_REPORTS: &str = "No reports found.";
pub const LOAD_FAILED: &str = "Error loading data. Please retry.";
pub const AUTH_UNAVAILABLE: &str = "Auth not initialized.";

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Where unauthenticated and denied users are sent.
    pub sign_in_path: String,
    /// How long a denial message stays visible before the redirect.
    pub denial_redirect_delay: Duration,
    pub window_size: i64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            sign_in_path: "login.html".to_string(),
            denial_redirect_delay: Duration::from_millis(1200),
            window_size: REPORT_WINDOW_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPhase {
    #[default]
    Starting,
    AuthUnavailable,
    Unauthenticated,
    CheckingPermission,
    Denied,
    Loading,
    Loaded,
    Empty,
    Error,
}

impl DashboardPhase {
    /// Phases that end event processing for the page instance.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::AuthUnavailable | Self::Unauthenticated | Self::Denied
        )
    }
}

/// Auth state of one page instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionAuthState {
    pub user: Option<AuthUser>,
    /// Only meaningful after a successful claim check.
    pub is_admin: bool,
    pub has_loaded_once: bool,
}

pub struct DashboardController {
    gateway: AuthGateway,
    store: Arc<dyn ReportStore>,
    surface: Surface,
    settings: DashboardSettings,
    session: SessionAuthState,
    phase: DashboardPhase,
    status: (String, StatusKind),
    window: Option<ReportWindow>,
    pending_redirect: Option<JoinHandle<()>>,
}

impl DashboardController {
    pub fn new(
        gateway: AuthGateway,
        store: Arc<dyn ReportStore>,
        surface: Surface,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            gateway,
            store,
            surface,
            settings,
            session: SessionAuthState::default(),
            phase: DashboardPhase::Starting,
            status: (String::new(), StatusKind::Neutral),
            window: None,
            pending_redirect: None,
        }
    }

    pub fn phase(&self) -> DashboardPhase {
        self.phase
    }

    pub fn session(&self) -> &SessionAuthState {
        &self.session
    }

    /// The window from the last successful fetch.
    pub fn window(&self) -> Option<&ReportWindow> {
        self.window.as_ref()
    }

    /// Detach the delayed redirect task, if one was scheduled.
    pub fn take_pending_redirect(&mut self) -> Option<JoinHandle<()>> {
        self.pending_redirect.take()
    }

    /// Subscribe to auth state and process events in order until the page
    /// reaches a terminal phase or the provider goes away.
    pub async fn run(mut self) -> DashboardPhase {
        let mut events = match self.gateway.subscribe() {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "Identity provider not initialized");
                self.show(AUTH_UNAVAILABLE, StatusKind::Error);
                self.enter(DashboardPhase::AuthUnavailable);
                return self.phase;
            }
        };

        while let Some(state) = events.next().await {
            if self.handle_auth_state(state, &events).await.is_terminal() {
                break;
            }
        }

        events.unsubscribe();
        self.phase
    }

    /// Apply one auth-state event. `events` is consulted to detect whether a
    /// newer event arrived while a capability check was in flight.
    pub async fn handle_auth_state(
        &mut self,
        state: AuthState,
        events: &AuthSubscription,
    ) -> DashboardPhase {
        let Some(user) = state else {
            self.session.user = None;
            self.session.is_admin = false;
            self.session.has_loaded_once = false;
            tracing::info!("No signed-in user, redirecting to sign-in");
            self.surface.clear();
            self.enter(DashboardPhase::Unauthenticated);
            self.surface.chrome.redirect(&self.settings.sign_in_path);
            return self.phase;
        };

        let previous = (self.phase, self.status.clone());
        self.enter(DashboardPhase::CheckingPermission);
        self.show(CHECKING_PERMISSIONS, StatusKind::Neutral);

        let capability = self.gateway.check_admin_capability(&user).await;

        if events.is_superseded() {
            tracing::debug!(uid = %user.uid, "Discarding capability check for superseded auth state");
            let (phase, (message, kind)) = previous;
            self.show(&message, kind);
            self.enter(phase);
            return self.phase;
        }

        match capability {
            Ok(true) => {
                if self.session.user.as_ref().map(|u| u.uid) != Some(user.uid) {
                    // A different account is a new session.
                    self.session.has_loaded_once = false;
                }
                self.session.user = Some(user.clone());
                self.session.is_admin = true;
                let label = user.email.as_deref().unwrap_or("Admin");
                self.surface.chrome.set_user_label(label);

                if self.session.has_loaded_once {
                    // Re-auth after a token refresh; leave the current view as is.
                    let (phase, (message, kind)) = previous;
                    self.show(&message, kind);
                    self.enter(phase);
                } else {
                    self.ensure_loaded(events).await;
                }
            }
            Ok(false) => {
                tracing::warn!(uid = %user.uid, "Admin claim missing, denying access");
                self.deny(ACCESS_DENIED).await;
            }
            Err(e) => {
                tracing::error!(uid = %user.uid, error = %e, "Auth check failed");
                self.deny(PERMISSION_HINT).await;
            }
        }

        self.phase
    }

    /// Load reports once per authorized session; later calls are no-ops.
    pub async fn ensure_loaded(&mut self, events: &AuthSubscription) {
        if !self.session.is_admin || self.session.has_loaded_once {
            return;
        }
        self.session.has_loaded_once = true;
        self.load_reports(events).await;
    }

    async fn load_reports(&mut self, events: &AuthSubscription) {
        self.enter(DashboardPhase::Loading);
        self.show(LOADING_REPORTS, StatusKind::Neutral);

        let limit = self.settings.window_size;
        let fetched = self.store.fetch_recent_reports(limit).await;

        if events.is_superseded() {
            // The queued auth event decides what the page shows next.
            tracing::debug!("Discarding report fetch for superseded auth state");
            self.session.has_loaded_once = false;
            return;
        }

        match fetched {
            Ok(reports) if reports.is_empty() => {
                tracing::info!("No weekly reports available");
                self.surface.chrome.set_tiles(&SummaryTiles::zero());
                self.surface.table.clear();
                self.surface.chart.destroy();
                self.show(NO_REPORTS, StatusKind::Success);
                self.window = Some(ReportWindow::default());
                self.enter(DashboardPhase::Empty);
            }
            Ok(reports) => {
                let window =
                    ReportWindow::bounded(reports, usize::try_from(limit).unwrap_or(0));
                tracing::info!(count = window.descending.len(), "Weekly reports loaded");
                self.surface.chrome.set_tiles(&window.summary_tiles());
                self.surface.table.repopulate(&window.table_rows());
                self.surface.chart.rebuild(&window.chart_series());
                self.show("", StatusKind::Neutral);
                self.window = Some(window);
                self.enter(DashboardPhase::Loaded);
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading reports");
                let message = match e {
                    DashboardError::PermissionDenied => PERMISSION_HINT,
                    _ => LOAD_FAILED,
                };
                self.show(message, StatusKind::Error);
                self.enter(DashboardPhase::Error);
            }
        }
    }

    /// Show `message`, sign the user out and redirect after the delay.
    async fn deny(&mut self, message: &str) {
        self.session.is_admin = false;
        self.show(message, StatusKind::Error);

        if let Err(e) = self.gateway.sign_out().await {
            tracing::warn!(error = %e, "Sign-out after denial failed");
        }
        self.session.user = None;
        self.surface.clear();

        self.enter(DashboardPhase::Denied);
        self.schedule_redirect();
    }

    fn schedule_redirect(&mut self) {
        let chrome = self.surface.chrome.clone();
        let target = self.settings.sign_in_path.clone();
        let delay = self.settings.denial_redirect_delay;
        self.pending_redirect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            chrome.redirect(&target);
        }));
    }

    fn show(&mut self, message: &str, kind: StatusKind) {
        self.status = (message.to_string(), kind);
        self.surface.chrome.set_status(message, kind);
    }

    fn enter(&mut self, phase: DashboardPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "Dashboard phase change");
        }
        self.phase = phase;
        self.surface.chrome.set_phase(phase);
    }
}

/// Sign the current user out, wipe the page and send it to the sign-in entry
/// point.
pub async fn logout(gateway: &AuthGateway, surface: &Surface, sign_in_path: &str) {
    if let Err(e) = gateway.sign_out().await {
        tracing::warn!(error = %e, "Sign-out failed");
    }
    surface.clear();
    surface.chrome.set_phase(DashboardPhase::Unauthenticated);
    surface.chrome.redirect(sign_in_path);
}

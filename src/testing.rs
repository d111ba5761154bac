//! In-process fakes of the identity provider and report store, used by the
//! unit and integration tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::DashboardError;
use crate::models::account::AuthUser;
use crate::models::report::WeeklyReport;
use crate::services::auth::{
    AuthState, AuthStateRegistry, AuthSubscription, IdTokenClaims, IdTokenResult,
    IdentityProvider,
};
use crate::services::report_store::ReportStore;

#[derive(Debug, Clone)]
struct FakeAccount {
    user: AuthUser,
    password: String,
    admin: bool,
}

pub struct FakeIdentityProvider {
    registry: Arc<AuthStateRegistry>,
    accounts: Mutex<Vec<FakeAccount>>,
    available: AtomicBool,
    fail_refresh: AtomicBool,
    refresh_calls: AtomicU64,
    sign_out_calls: AtomicU64,
}

impl Default for FakeIdentityProvider {
    fn default() -> Self {
        Self {
            registry: AuthStateRegistry::new(),
            accounts: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            fail_refresh: AtomicBool::new(false),
            refresh_calls: AtomicU64::new(0),
            sign_out_calls: AtomicU64::new(0),
        }
    }
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, email: &str, password: &str, admin: bool) -> AuthUser {
        let user = AuthUser {
            uid: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.accounts.lock().await.push(FakeAccount {
            user: user.clone(),
            password: password.to_string(),
            admin,
        });
        user
    }

    /// Grant or revoke the admin claim for future token refreshes.
    pub async fn set_admin(&self, uid: Uuid, admin: bool) {
        for account in self.accounts.lock().await.iter_mut() {
            if account.user.uid == uid {
                account.admin = admin;
            }
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    /// Publish a provider-originated auth change.
    pub fn emit(&self, state: AuthState) {
        self.registry.publish(state);
    }

    pub fn current(&self) -> AuthState {
        self.registry.current()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.subscriber_count()
    }

    pub fn refresh_calls(&self) -> u64 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> u64 {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn on_auth_state_changed(&self) -> Result<AuthSubscription, DashboardError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(DashboardError::AuthUnavailable);
        }
        Ok(self.registry.subscribe())
    }

    async fn get_id_token_result(
        &self,
        user: &AuthUser,
        _force_refresh: bool,
    ) -> Result<IdTokenResult, DashboardError> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(DashboardError::ProviderError(
                "token refresh failed".to_string(),
            ));
        }

        let admin = self
            .accounts
            .lock()
            .await
            .iter()
            .find(|a| a.user.uid == user.uid)
            .is_some_and(|a| a.admin);

        let now = Utc::now();
        Ok(IdTokenResult {
            token: format!("fake-id-token-{n}"),
            claims: IdTokenClaims {
                sub: user.uid.to_string(),
                email: user.email.clone(),
                admin: admin.then_some(true),
                exp: (now + Duration::hours(1)).timestamp(),
                iat: now.timestamp(),
            },
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DashboardError> {
        let user = self
            .accounts
            .lock()
            .await
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| a.user.clone())
            .ok_or(DashboardError::InvalidCredentials)?;
        self.registry.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), DashboardError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.registry.publish(None);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeReportStore {
    reports: Mutex<Vec<WeeklyReport>>,
    failure: Mutex<Option<DashboardError>>,
    fetch_calls: AtomicU64,
}

impl FakeReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reports(reports: Vec<WeeklyReport>) -> Self {
        Self {
            reports: Mutex::new(reports),
            ..Self::default()
        }
    }

    pub async fn set_reports(&self, reports: Vec<WeeklyReport>) {
        *self.reports.lock().await = reports;
    }

    /// Make subsequent fetches fail with `failure`, or succeed again on `None`.
    pub async fn fail_with(&self, failure: Option<DashboardError>) {
        *self.failure.lock().await = failure;
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportStore for FakeReportStore {
    async fn fetch_recent_reports(&self, limit: i64) -> Result<Vec<WeeklyReport>, DashboardError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure.lock().await.clone() {
            return Err(failure);
        }

        let mut reports = self.reports.lock().await.clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(reports)
    }

    async fn ping(&self) -> Result<(), DashboardError> {
        match self.failure.lock().await.clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

/// `weeks` consecutive weekly reports ending at the week of `end`, newest
/// first. Metrics grow with the week index so ordering is easy to assert.
pub fn sample_reports(weeks: u32, end: DateTime<Utc>) -> Vec<WeeklyReport> {
    (0..weeks)
        .map(|offset| {
            let index = weeks - offset;
            WeeklyReport {
                week_label: Some(format!("Week {index}")),
                new_users: Some(f64::from(index * 120)),
                active_users: Some(f64::from(index * 1_500)),
                total_transactions: Some(f64::from(index * 900)),
                created_at: end - Duration::weeks(i64::from(offset)),
            }
        })
        .collect()
}

/// Fixed reference instant for deterministic report timestamps.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 31, 6, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

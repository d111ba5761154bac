//! Read-only access to the `weekly_reports` collection.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::DashboardError;
use crate::models::report::WeeklyReport;

/// Postgres SQLSTATE for `insufficient_privilege`.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// The report store boundary.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Up to `limit` reports, most recent `created_at` first. An empty result
    /// means no reports exist and is not an error.
    async fn fetch_recent_reports(&self, limit: i64) -> Result<Vec<WeeklyReport>, DashboardError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), DashboardError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn fetch_recent_reports(&self, limit: i64) -> Result<Vec<WeeklyReport>, DashboardError> {
        sqlx::query_as::<_, WeeklyReport>(
            r#"
            SELECT week_label, new_users, active_users, total_transactions, created_at
            FROM weekly_reports
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_error)
    }

    async fn ping(&self) -> Result<(), DashboardError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_store_error)
    }
}

/// Rejected reads become `PermissionDenied`; everything else is transient.
fn map_store_error(err: sqlx::Error) -> DashboardError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) => {
            tracing::warn!(error = %err, "Report store rejected read");
            DashboardError::PermissionDenied
        }
        _ => {
            tracing::error!(error = %err, "Report store read failed");
            DashboardError::DataUnavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct ServerError {
        code: &'static str,
    }

    impl fmt::Display for ServerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "server error {}", self.code)
        }
    }

    impl StdError for ServerError {}

    impl DatabaseError for ServerError {
        fn message(&self) -> &str {
            "permission denied for table weekly_reports"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn insufficient_privilege_maps_to_permission_denied() {
        let err = map_store_error(sqlx::Error::Database(Box::new(ServerError {
            code: INSUFFICIENT_PRIVILEGE,
        })));
        assert_eq!(err, DashboardError::PermissionDenied);

        // undefined_table is a different failure.
        let err = map_store_error(sqlx::Error::Database(Box::new(ServerError { code: "42P01" })));
        assert!(matches!(err, DashboardError::DataUnavailable(_)));
    }

    #[test]
    fn non_database_errors_are_transient() {
        let err = map_store_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DashboardError::DataUnavailable(_)));

        let err = map_store_error(sqlx::Error::ColumnNotFound("new_users".to_string()));
        assert!(matches!(err, DashboardError::DataUnavailable(_)));
    }
}

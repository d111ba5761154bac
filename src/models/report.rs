//! Weekly aggregate report records as read from the report store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One pre-aggregated week of user and transaction metrics.
///
/// Metric fields are kept as the store returned them; use the accessor
/// methods, which normalize missing or non-finite values to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WeeklyReport {
    pub week_label: Option<String>,
    pub new_users: Option<f64>,
    pub active_users: Option<f64>,
    pub total_transactions: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl WeeklyReport {
    pub fn new_users(&self) -> u64 {
        metric_count(self.new_users)
    }

    pub fn active_users(&self) -> u64 {
        metric_count(self.active_users)
    }

    pub fn total_transactions(&self) -> u64 {
        metric_count(self.total_transactions)
    }

    /// Display label, `-` when the record has none.
    pub fn label(&self) -> &str {
        match self.week_label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => "-",
        }
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            week_label: self.week_label.clone(),
            new_users: self.new_users(),
            active_users: self.active_users(),
            total_transactions: self.total_transactions(),
        }
    }
}

/// Normalized metrics of a single report. `Default` is the zero snapshot
/// shown when no reports exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSnapshot {
    pub week_label: Option<String>,
    pub new_users: u64,
    pub active_users: u64,
    pub total_transactions: u64,
}

/// Missing, non-finite and negative values count as zero; fractions truncate.
pub fn metric_count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_count_normalizes_bad_values() {
        assert_eq!(metric_count(None), 0);
        assert_eq!(metric_count(Some(f64::NAN)), 0);
        assert_eq!(metric_count(Some(f64::INFINITY)), 0);
        assert_eq!(metric_count(Some(f64::NEG_INFINITY)), 0);
        assert_eq!(metric_count(Some(-4.0)), 0);
        assert_eq!(metric_count(Some(12.9)), 12);
        assert_eq!(metric_count(Some(1500.0)), 1500);
    }

    #[test]
    fn label_falls_back_to_dash() {
        let mut report = WeeklyReport {
            week_label: None,
            new_users: Some(1.0),
            active_users: None,
            total_transactions: Some(f64::NAN),
            created_at: Utc::now(),
        };
        assert_eq!(report.label(), "-");
        report.week_label = Some(String::new());
        assert_eq!(report.label(), "-");
        report.week_label = Some("2025-W14".to_string());
        assert_eq!(report.label(), "2025-W14");
    }

    #[test]
    fn snapshot_uses_normalized_metrics() {
        let report = WeeklyReport {
            week_label: Some("2025-W14".to_string()),
            new_users: Some(42.0),
            active_users: None,
            total_transactions: Some(f64::NAN),
            created_at: Utc::now(),
        };
        let snapshot = report.snapshot();
        assert_eq!(snapshot.new_users, 42);
        assert_eq!(snapshot.active_users, 0);
        assert_eq!(snapshot.total_transactions, 0);
    }
}

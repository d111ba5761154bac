//! Pure projections of a fetched report batch: the latest snapshot for the
//! summary tiles, table rows, and the chronological chart series.

use serde::Serialize;

use crate::models::report::{ReportSnapshot, WeeklyReport};

/// The bounded, ordered set of reports currently displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportWindow {
    /// Most recent first, as fetched.
    pub descending: Vec<WeeklyReport>,
    /// First element of `descending`, or the zero snapshot.
    pub latest: ReportSnapshot,
    /// Oldest first, for a left-to-right time axis.
    pub chronological: Vec<WeeklyReport>,
}

impl ReportWindow {
    pub fn from_descending(descending: Vec<WeeklyReport>) -> Self {
        let latest = descending
            .first()
            .map(WeeklyReport::snapshot)
            .unwrap_or_default();
        let chronological = descending.iter().rev().cloned().collect();
        Self {
            descending,
            latest,
            chronological,
        }
    }

    /// Like `from_descending`, keeping at most `size` of the newest reports.
    pub fn bounded(mut descending: Vec<WeeklyReport>, size: usize) -> Self {
        descending.truncate(size);
        Self::from_descending(descending)
    }

    pub fn is_empty(&self) -> bool {
        self.descending.is_empty()
    }

    pub fn summary_tiles(&self) -> SummaryTiles {
        SummaryTiles::from_snapshot(&self.latest)
    }

    /// Table rows, newest first.
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.descending.iter().map(TableRow::from_report).collect()
    }

    /// Chart series, oldest first.
    pub fn chart_series(&self) -> ChartSeries {
        let mut series = ChartSeries::default();
        for report in &self.chronological {
            series.labels.push(report.label().to_string());
            series.new_users.push(report.new_users());
            series.active_users.push(report.active_users());
            series.transactions.push(report.total_transactions());
        }
        series
    }
}

/// Formatted values of the four summary tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTiles {
    pub total_users: String,
    pub new_users: String,
    pub active_users: String,
    pub total_transactions: String,
}

impl SummaryTiles {
    /// The total-users tile reports the latest active user count; the
    /// weekly job does not publish a separate cumulative total.
    pub fn from_snapshot(snapshot: &ReportSnapshot) -> Self {
        Self {
            total_users: format_count(snapshot.active_users),
            new_users: format_count(snapshot.new_users),
            active_users: format_count(snapshot.active_users),
            total_transactions: format_count(snapshot.total_transactions),
        }
    }

    pub fn zero() -> Self {
        Self::from_snapshot(&ReportSnapshot::default())
    }
}

impl Default for SummaryTiles {
    fn default() -> Self {
        Self::zero()
    }
}

/// One rendered row of the recent-reports table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub week_label: String,
    pub new_users: String,
    pub active_users: String,
    pub total_transactions: String,
}

impl TableRow {
    pub fn from_report(report: &WeeklyReport) -> Self {
        Self {
            week_label: report.label().to_string(),
            new_users: format_count(report.new_users()),
            active_users: format_count(report.active_users()),
            total_transactions: format_count(report.total_transactions()),
        }
    }
}

/// Trend chart input: one label and one point per series for each week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub new_users: Vec<u64>,
    pub active_users: Vec<u64>,
    pub transactions: Vec<u64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Render a count with `,` thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Reports for `weeks` consecutive weeks, newest first.
    fn descending_reports(weeks: u32) -> Vec<WeeklyReport> {
        let base = Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap();
        (0..weeks)
            .rev()
            .map(|w| WeeklyReport {
                week_label: Some(format!("2025-W{:02}", w + 1)),
                new_users: Some(f64::from(10 * (w + 1))),
                active_users: Some(f64::from(1000 * (w + 1))),
                total_transactions: Some(f64::from(250 * (w + 1))),
                created_at: base + Duration::weeks(i64::from(w)),
            })
            .collect()
    }

    #[test]
    fn chronological_is_exact_reverse_and_latest_is_first() {
        for weeks in 1..=8 {
            let reports = descending_reports(weeks);
            let window = ReportWindow::from_descending(reports.clone());

            let mut reversed = reports.clone();
            reversed.reverse();
            assert_eq!(window.chronological, reversed);
            assert_eq!(window.latest, reports[0].snapshot());
            assert_eq!(window.descending, reports);
        }
    }

    #[test]
    fn bounded_window_keeps_only_newest_reports() {
        let reports = descending_reports(12);
        let window = ReportWindow::bounded(reports.clone(), 8);

        assert_eq!(window.descending.len(), 8);
        assert_eq!(window.descending, reports[..8]);
        assert_eq!(window.latest, reports[0].snapshot());
        assert_eq!(window.chronological.first(), Some(&reports[7]));
        assert_eq!(window.table_rows().len(), 8);

        let small = ReportWindow::bounded(descending_reports(3), 8);
        assert_eq!(small.descending.len(), 3);
    }

    #[test]
    fn empty_window_has_zero_snapshot() {
        let window = ReportWindow::from_descending(Vec::new());
        assert!(window.is_empty());
        assert_eq!(window.latest, ReportSnapshot::default());
        assert_eq!(window.summary_tiles(), SummaryTiles::zero());
        assert!(window.table_rows().is_empty());
        assert!(window.chart_series().is_empty());
    }

    #[test]
    fn non_finite_and_missing_metrics_format_as_zero() {
        let report = WeeklyReport {
            week_label: None,
            new_users: Some(f64::NAN),
            active_users: None,
            total_transactions: Some(f64::INFINITY),
            created_at: Utc::now(),
        };
        let window = ReportWindow::from_descending(vec![report]);

        let row = &window.table_rows()[0];
        assert_eq!(row.week_label, "-");
        assert_eq!(row.new_users, "0");
        assert_eq!(row.active_users, "0");
        assert_eq!(row.total_transactions, "0");

        let tiles = window.summary_tiles();
        assert_eq!(tiles.total_users, "0");
        assert_eq!(tiles.total_transactions, "0");

        assert_eq!(window.chart_series().new_users, vec![0]);
    }

    #[test]
    fn eight_weeks_project_newest_first_rows_and_oldest_first_chart() {
        let window = ReportWindow::from_descending(descending_reports(8));

        let rows = window.table_rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].week_label, "2025-W08");
        assert_eq!(rows[7].week_label, "2025-W01");

        let series = window.chart_series();
        assert_eq!(series.len(), 8);
        assert_eq!(series.labels.first().map(String::as_str), Some("2025-W01"));
        assert_eq!(series.labels.last().map(String::as_str), Some("2025-W08"));
        assert_eq!(series.active_users[0], 1000);
        assert_eq!(series.active_users[7], 8000);

        let tiles = window.summary_tiles();
        assert_eq!(tiles.new_users, "80");
        assert_eq!(tiles.active_users, "8,000");
        assert_eq!(tiles.total_users, "8,000");
        assert_eq!(tiles.total_transactions, "2,000");
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(123456), "123,456");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}

//! Line chart configuration for the weekly growth trend.

use serde::Serialize;

use crate::services::aggregator::ChartSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: &'static str,
    pub data: Vec<u64>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub tension: f32,
    pub fill: bool,
}

/// Chart.js `options`, nested the way Chart.js reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub plugins: PluginOptions,
    pub scales: ScaleOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginOptions {
    pub legend: LegendOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub position: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleOptions {
    pub y: AxisOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub begin_at_zero: bool,
    pub ticks: TickOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOptions {
    /// Decimal places on axis labels; counts are whole numbers.
    pub precision: u8,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            maintain_aspect_ratio: false,
            plugins: PluginOptions {
                legend: LegendOptions { position: "top" },
            },
            scales: ScaleOptions {
                y: AxisOptions {
                    begin_at_zero: true,
                    ticks: TickOptions { precision: 0 },
                },
            },
        }
    }
}

impl ChartConfig {
    /// Three-series line chart: new users, active users, transactions.
    pub fn line(series: &ChartSeries) -> Self {
        Self {
            kind: "line",
            data: ChartData {
                labels: series.labels.clone(),
                datasets: vec![
                    dataset(
                        "New Users",
                        &series.new_users,
                        "#22c55e",
                        "rgba(34, 197, 94, 0.08)",
                    ),
                    dataset(
                        "Active Users",
                        &series.active_users,
                        "#2563eb",
                        "rgba(37, 99, 235, 0.08)",
                    ),
                    dataset(
                        "Transactions",
                        &series.transactions,
                        "#f59e0b",
                        "rgba(245, 158, 11, 0.1)",
                    ),
                ],
            },
            options: ChartOptions::default(),
        }
    }
}

fn dataset(
    label: &'static str,
    data: &[u64],
    border_color: &'static str,
    background_color: &'static str,
) -> ChartDataset {
    ChartDataset {
        label,
        data: data.to_vec(),
        border_color,
        background_color,
        tension: 0.3,
        fill: false,
    }
}

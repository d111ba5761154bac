//! Rendering sinks driven by the dashboard controller.
//!
//! Every call fully replaces the sink's previous output; sinks keep no memory
//! of earlier data beyond what they currently display.

pub mod chart;
pub mod memory;

use std::sync::Arc;

use serde::Serialize;

use crate::services::aggregator::{ChartSeries, SummaryTiles, TableRow};
use crate::services::dashboard::DashboardPhase;

pub use memory::{MemoryPage, PageSnapshot};

/// Styling of the status banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Neutral,
    Success,
    Error,
}

/// Trend chart sink.
pub trait ChartView: Send + Sync {
    /// Destroy any existing chart and construct a new one from `series`.
    fn rebuild(&self, series: &ChartSeries);

    /// Destroy the current chart, if any.
    fn destroy(&self);
}

/// Recent-reports table sink.
pub trait TableView: Send + Sync {
    /// Clear all rows, then append `rows` in order.
    fn repopulate(&self, rows: &[TableRow]);

    fn clear(&self);
}

/// Everything else on the page: status banner, tiles, user label, navigation.
pub trait PageChrome: Send + Sync {
    fn set_status(&self, message: &str, kind: StatusKind);

    fn set_tiles(&self, tiles: &SummaryTiles);

    fn set_user_label(&self, label: &str);

    fn clear_user_label(&self);

    fn set_phase(&self, phase: DashboardPhase);

    /// Navigate the page away to `target`.
    fn redirect(&self, target: &str);
}

/// The set of sinks one controller renders into.
#[derive(Clone)]
pub struct Surface {
    pub chart: Arc<dyn ChartView>,
    pub table: Arc<dyn TableView>,
    pub chrome: Arc<dyn PageChrome>,
}

impl Surface {
    /// A surface whose sinks all render into the same in-memory page.
    pub fn memory(page: &Arc<MemoryPage>) -> Self {
        Self {
            chart: page.clone(),
            table: page.clone(),
            chrome: page.clone(),
        }
    }

    /// Remove all report data and the signed-in identity from the page.
    pub fn clear(&self) {
        self.table.clear();
        self.chart.destroy();
        self.chrome.set_tiles(&SummaryTiles::zero());
        self.chrome.clear_user_label();
    }
}

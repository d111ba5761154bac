//! In-memory page model. The HTTP layer serves its snapshot as JSON and a
//! browser client paints it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::services::aggregator::{ChartSeries, SummaryTiles, TableRow};
use crate::services::dashboard::DashboardPhase;
use crate::views::chart::ChartConfig;
use crate::views::{ChartView, PageChrome, StatusKind, TableView};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusBanner {
    pub message: String,
    pub kind: StatusKind,
}

/// A constructed chart. A rebuild always yields a new `instance_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartInstance {
    pub instance_id: u64,
    pub config: ChartConfig,
}

/// Everything the page currently displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub phase: DashboardPhase,
    pub status: StatusBanner,
    pub user_label: Option<String>,
    pub tiles: SummaryTiles,
    pub chart: Option<ChartInstance>,
    pub rows: Vec<TableRow>,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryPage {
    state: RwLock<PageSnapshot>,
    chart_instances: AtomicU64,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, PageSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PageSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChartView for MemoryPage {
    fn rebuild(&self, series: &ChartSeries) {
        let mut state = self.write();
        state.chart = None;
        let instance_id = self.chart_instances.fetch_add(1, Ordering::Relaxed) + 1;
        state.chart = Some(ChartInstance {
            instance_id,
            config: ChartConfig::line(series),
        });
    }

    fn destroy(&self) {
        self.write().chart = None;
    }
}

impl TableView for MemoryPage {
    fn repopulate(&self, rows: &[TableRow]) {
        let mut state = self.write();
        state.rows.clear();
        state.rows.extend_from_slice(rows);
    }

    fn clear(&self) {
        self.write().rows.clear();
    }
}

impl PageChrome for MemoryPage {
    fn set_status(&self, message: &str, kind: StatusKind) {
        self.write().status = StatusBanner {
            message: message.to_string(),
            kind,
        };
    }

    fn set_tiles(&self, tiles: &SummaryTiles) {
        self.write().tiles = tiles.clone();
    }

    fn set_user_label(&self, label: &str) {
        self.write().user_label = Some(label.to_string());
    }

    fn clear_user_label(&self) {
        self.write().user_label = None;
    }

    fn set_phase(&self, phase: DashboardPhase) {
        self.write().phase = phase;
    }

    fn redirect(&self, target: &str) {
        self.write().redirect_to = Some(target.to_string());
    }
}

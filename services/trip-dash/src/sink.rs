// services/trip-dash/src/sink.rs
//
// Render-sink seam. The dashboard core writes to these and owns nothing
// about how they are presented.
//

use std::collections::HashMap;
use std::sync::Mutex;

use crate::adapters::{ChartData, ChartId};
use crate::controller::PageState;
use crate::health::BackendStatus;
use crate::notice::Notice;
use crate::summary::{Kpis, TableRow};

/// A drawn chart. Must be disposed before its replacement is drawn.
pub trait ChartHandle: Send {
    fn dispose(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl From<PageState> for PaginationView {
    fn from(page: PageState) -> Self {
        Self {
            current_page: page.current_page,
            total_pages: page.total_pages,
            previous_enabled: page.has_previous(),
            next_enabled: page.has_next(),
        }
    }
}

pub trait RenderSink: Send + Sync {
    fn draw_chart(&self, data: &ChartData) -> Box<dyn ChartHandle>;
    fn update_table(&self, rows: &[TableRow]);
    fn update_kpis(&self, kpis: &Kpis);
    fn update_pagination(&self, view: PaginationView);
    fn update_status(&self, status: BackendStatus);
    fn update_borough_options(&self, boroughs: &[String]);
    fn update_notice(&self, notice: Option<&Notice>);
    fn update_clock(&self, now: &str);
}

/// One live handle per chart
#[derive(Default)]
pub struct ChartSlots {
    handles: Mutex<HashMap<ChartId, Box<dyn ChartHandle>>>,
}

impl ChartSlots {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Dispose the chart's current handle, then draw and install the new one
    pub fn redraw(&self, sink: &dyn RenderSink, data: &ChartData) {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut previous) = handles.remove(&data.id()) {
            previous.dispose();
        }
        handles.insert(data.id(), sink.draw_chart(data));
    }
    
    pub fn dispose_all(&self) {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        for (_, mut handle) in handles.drain() {
            handle.dispose();
        }
    }
}

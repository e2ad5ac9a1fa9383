// services/trip-dash/src/dashboard.rs
//
// Dashboard session: the one object that owns table state, chart handles and
// the borough option set, and sequences every load against the render sink.
//

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use svckit::config::ApiConfig;
use svckit::errors::DashError;
use svckit::transport::Transport;
use svckit::types::{DataEnvelope, FareBucketRow, HourlyDemandRow, RevenueRow, TopZoneRow, TripsPage};

use crate::adapters::{self, ChartData};
use crate::aggregation::BoroughTotals;
use crate::api::Endpoints;
use crate::controller::{Completion, Direction, PageState, TableController, TripsQuery};
use crate::filters::{FilterDraft, FilterSet};
use crate::gateway::Gateway;
use crate::health::{BackendStatus, HealthMonitor};
use crate::notice::Notifier;
use crate::sink::{ChartSlots, RenderSink};
use crate::summary::{table_rows, Kpis, PageSummary};

const CLOCK_TICK: Duration = Duration::from_secs(1);

pub struct Dashboard {
    endpoints: Endpoints,
    gateway: Gateway,
    health: HealthMonitor,
    sink: Arc<dyn RenderSink>,
    charts: ChartSlots,
    table: Mutex<TableController>,
    boroughs: RwLock<Vec<String>>,
    peak_hour: RwLock<Option<u32>>,
    top_zones: u32,
}

impl Dashboard {
    pub fn new(
        api: &ApiConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<Notifier>,
        sink: Arc<dyn RenderSink>,
    ) -> Result<Self, DashError> {
        let endpoints = Endpoints::new(&api.base_url)?;
        let health = HealthMonitor::new(
            transport.clone(),
            endpoints.top_revenue_zones(1),
            api.health_timeout(),
        );
        
        Ok(Self {
            gateway: Gateway::new(transport, notifier),
            health,
            endpoints,
            sink,
            charts: ChartSlots::new(),
            table: Mutex::new(TableController::new()),
            boroughs: RwLock::new(Vec::new()),
            peak_hour: RwLock::new(None),
            top_zones: api.top_zones_clamped(),
        })
    }
    
    /// Startup sequence: clock, health probe, the four charts behind one
    /// barrier, then page 1 of the trips table. Returns the clock task.
    pub async fn initialize(&self) -> JoinHandle<()> {
        let clock = self.start_clock();
        
        let status = self.check_health().await;
        info!("Backend status: {:?}", status);
        
        self.load_charts().await;
        
        let query = self.table.lock().await.begin_initial_load();
        self.run_trips_query(query).await;
        
        info!("Dashboard initialized");
        clock
    }
    
    /// Ticks every second, independent of data loading. Also expires notices.
    pub fn start_clock(&self) -> JoinHandle<()> {
        let sink = self.sink.clone();
        let notifier = self.gateway.notifier().clone();
        
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLOCK_TICK);
            loop {
                interval.tick().await;
                sink.update_clock(&Local::now().format("%H:%M:%S").to_string());
                sink.update_notice(notifier.current().as_ref());
            }
        })
    }
    
    pub async fn check_health(&self) -> BackendStatus {
        let status = self.health.probe().await;
        self.sink.update_status(status);
        status
    }
    
    /// All four must settle. Each absorbs its own failure.
    pub async fn load_charts(&self) {
        tokio::join!(
            self.load_hourly_demand(),
            self.load_revenue_by_borough(),
            self.load_fare_per_distance(),
            self.load_top_zones(),
        );
        self.publish_notice();
    }
    
    pub async fn load_hourly_demand(&self) {
        let url = self.endpoints.hourly_demand();
        let Some(body) = self.gateway.fetch::<DataEnvelope<HourlyDemandRow>>("hourly demand", &url).await else {
            return;
        };
        
        let chart = adapters::hourly_demand(&body.data);
        if let ChartData::HourlyDemand { peak_hour, .. } = &chart {
            *self.peak_hour.write().await = *peak_hour;
        }
        self.charts.redraw(self.sink.as_ref(), &chart);
    }
    
    pub async fn load_revenue_by_borough(&self) {
        let url = self.endpoints.revenue_by_zone();
        let Some(body) = self.gateway.fetch::<DataEnvelope<RevenueRow>>("revenue by zone", &url).await else {
            return;
        };
        
        let totals = BoroughTotals::from_rows(&body.data);
        if totals.is_empty() {
            warn!("Revenue response carried no zones; borough options cleared");
        } else {
            debug!("Aggregated {} zones into {} boroughs", body.data.len(), totals.len());
        }
        
        let boroughs = totals.boroughs();
        self.sink.update_borough_options(&boroughs);
        *self.boroughs.write().await = boroughs;
        
        self.charts.redraw(self.sink.as_ref(), &adapters::revenue_by_borough(&totals));
    }
    
    pub async fn load_fare_per_distance(&self) {
        let url = self.endpoints.average_fare_per_mile();
        let Some(body) = self.gateway.fetch::<DataEnvelope<FareBucketRow>>("fare per mile", &url).await else {
            return;
        };
        self.charts.redraw(self.sink.as_ref(), &adapters::fare_per_distance(&body.data));
    }
    
    pub async fn load_top_zones(&self) {
        let url = self.endpoints.top_revenue_zones(self.top_zones);
        let Some(body) = self.gateway.fetch::<DataEnvelope<TopZoneRow>>("top revenue zones", &url).await else {
            return;
        };
        self.charts.redraw(self.sink.as_ref(), &adapters::top_zones(&body.data));
    }
    
    /// Validated Apply. Returns false when the draft was rejected.
    pub async fn apply_filters(&self, draft: &FilterDraft) -> bool {
        let result = self.table.lock().await.apply_draft(draft);
        match result {
            Ok(query) => {
                self.run_trips_query(query).await;
                true
            }
            Err(e) => {
                self.gateway.notifier().warning(e.to_string());
                self.publish_notice();
                false
            }
        }
    }
    
    pub async fn reset_filters(&self) {
        let query = self.table.lock().await.reset();
        self.run_trips_query(query).await;
    }
    
    /// Returns false when the move was out of range and nothing was fetched
    pub async fn navigate(&self, direction: Direction) -> bool {
        let query = self.table.lock().await.navigate(direction);
        match query {
            Some(query) => {
                self.run_trips_query(query).await;
                true
            }
            None => false,
        }
    }
    
    async fn run_trips_query(&self, query: TripsQuery) {
        self.sink.update_pagination(self.page().await.into());
        
        let url = self.endpoints.trips(query.page, &query.filters);
        let response = self.gateway.fetch::<TripsPage>("trips", &url).await;
        let peak_hour = *self.peak_hour.read().await;
        
        // No awaits while the table is locked
        let mut table = self.table.lock().await;
        if table.complete(&query, response) == Completion::Applied {
            let summary = PageSummary::from_page(table.rows(), table.total_count());
            let kpis = Kpis::new(&summary, peak_hour);
            self.sink.update_table(&table_rows(table.rows()));
            self.sink.update_kpis(&kpis);
        }
        self.sink.update_pagination(table.page().into());
        table.settle();
        drop(table);
        
        self.publish_notice();
    }
    
    fn publish_notice(&self) {
        self.sink.update_notice(self.gateway.notifier().current().as_ref());
    }
    
    pub async fn page(&self) -> PageState {
        self.table.lock().await.page()
    }
    
    pub async fn active_filters(&self) -> FilterSet {
        self.table.lock().await.active_filters().clone()
    }
    
    pub async fn boroughs(&self) -> Vec<String> {
        self.boroughs.read().await.clone()
    }
    
    pub fn shutdown(&self) {
        self.charts.dispose_all();
    }
}

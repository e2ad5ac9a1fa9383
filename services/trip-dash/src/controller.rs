// services/trip-dash/src/controller.rs
//
// Filter & pagination state machine for the trips table.
// Pure and synchronous: triggers hand back a `TripsQuery` to fetch, and the
// fetch result is fed back through `complete`.
//

use tracing::{debug, info, warn};

use svckit::errors::DashError;
use svckit::metrics;
use svckit::types::{TripRecord, TripsPage};

use crate::filters::{FilterDraft, FilterSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub total_pages: u32,
}

impl PageState {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
    
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn offset(self) -> i64 {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// A trips fetch the controller wants issued
#[derive(Debug, Clone, PartialEq)]
pub struct TripsQuery {
    pub seq: u64,
    pub page: u32,
    pub filters: FilterSet,
    /// Initial load: commit `filters` as the baseline once this settles
    pub commits_baseline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// Older than the last applied response; dropped
    Stale,
}

#[derive(Debug)]
pub struct TableController {
    active_filters: FilterSet,
    page: PageState,
    phase: Phase,
    rows: Vec<TripRecord>,
    total_count: u64,
    /// Page of the rows currently held
    applied_page: u32,
    /// Set once an Apply or Reset has replaced the filters
    filters_chosen: bool,
    last_issued: u64,
    last_applied: u64,
}

impl Default for TableController {
    fn default() -> Self {
        Self {
            active_filters: FilterSet::default(),
            page: PageState::default(),
            phase: Phase::default(),
            rows: Vec::new(),
            total_count: 0,
            applied_page: 1,
            filters_chosen: false,
            last_issued: 0,
            last_applied: 0,
        }
    }
}

impl TableController {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn active_filters(&self) -> &FilterSet {
        &self.active_filters
    }
    
    pub fn page(&self) -> PageState {
        self.page
    }
    
    pub fn phase(&self) -> Phase {
        self.phase
    }
    
    pub fn rows(&self) -> &[TripRecord] {
        &self.rows
    }
    
    pub fn total_count(&self) -> u64 {
        self.total_count
    }
    
    fn issue(&mut self, page: u32, filters: FilterSet, commits_baseline: bool) -> TripsQuery {
        self.last_issued += 1;
        self.phase = Phase::Loading;
        debug!("Issuing trips query #{} for page {}", self.last_issued, page);
        TripsQuery {
            seq: self.last_issued,
            page,
            filters,
            commits_baseline,
        }
    }
    
    /// Page 1 with the default window. Filters stay empty until it settles.
    pub fn begin_initial_load(&mut self) -> TripsQuery {
        self.page.current_page = 1;
        self.issue(1, FilterSet::default_window(), true)
    }
    
    /// Validated Apply. On rejection nothing changes and nothing is fetched.
    pub fn apply(&mut self, candidate: FilterSet) -> Result<TripsQuery, DashError> {
        if let Err(e) = candidate.validate() {
            warn!("Filter apply rejected: {}", e);
            return Err(e);
        }
        info!("Applying filters: {:?}", candidate);
        self.active_filters = candidate.clone();
        self.filters_chosen = true;
        self.page.current_page = 1;
        Ok(self.issue(1, candidate, false))
    }
    
    pub fn apply_draft(&mut self, draft: &FilterDraft) -> Result<TripsQuery, DashError> {
        match draft.parse() {
            Ok(candidate) => self.apply(candidate),
            Err(e) => {
                warn!("Filter apply rejected: {}", e);
                Err(e)
            }
        }
    }
    
    pub fn reset(&mut self) -> TripsQuery {
        info!("Resetting filters to the default window");
        self.active_filters = FilterSet::default_window();
        self.filters_chosen = true;
        self.page.current_page = 1;
        self.issue(1, self.active_filters.clone(), false)
    }
    
    /// Step one page. Out-of-range requests are silent no-ops.
    pub fn navigate(&mut self, direction: Direction) -> Option<TripsQuery> {
        let target = self.page.current_page as i64 + direction.offset();
        if target < 1 || target > self.page.total_pages as i64 {
            debug!("Ignoring navigation to page {} of {}", target, self.page.total_pages);
            return None;
        }
        self.page.current_page = target as u32;
        Some(self.issue(self.page.current_page, self.active_filters.clone(), false))
    }
    
    /// Feed a settled fetch back in. `None` is the gateway's "no data".
    pub fn complete(&mut self, query: &TripsQuery, response: Option<TripsPage>) -> Completion {
        // A later Apply or Reset wins over the baseline, whatever the arrival order
        if query.commits_baseline && !self.filters_chosen {
            self.active_filters = query.filters.clone();
        }
        
        if query.seq < self.last_applied {
            warn!("Discarding stale trips response #{} (already applied #{})", query.seq, self.last_applied);
            metrics::record_stale_response();
            return Completion::Stale;
        }
        
        let superseded = query.seq < self.last_issued;
        let Some(response) = response else {
            if !superseded {
                self.phase = Phase::Failed;
                self.page.current_page = self.applied_page;
            }
            return Completion::Failed;
        };
        
        self.last_applied = query.seq;
        self.page.total_pages = response.total_pages.max(1);
        self.page.current_page = response.page.clamp(1, self.page.total_pages);
        self.applied_page = self.page.current_page;
        self.total_count = response.total_count;
        self.rows = response.data;
        if !superseded {
            self.phase = Phase::Loaded;
        }
        
        debug!(
            "Applied trips response #{}: page {}/{} ({} rows)",
            query.seq, self.page.current_page, self.page.total_pages, self.rows.len()
        );
        Completion::Applied
    }
    
    /// Loaded/Failed -> Idle once the outcome has been rendered
    pub fn settle(&mut self) {
        if matches!(self.phase, Phase::Loaded | Phase::Failed) {
            self.phase = Phase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ROWS_PER_PAGE;
    use chrono::NaiveDate;
    
    fn trips(page: u32, total_pages: u32, rows: usize) -> TripsPage {
        TripsPage {
            data: vec![TripRecord::default(); rows],
            page,
            total_pages,
            total_count: total_pages as u64 * ROWS_PER_PAGE as u64,
            limit: Some(ROWS_PER_PAGE),
        }
    }
    
    fn loaded(total_pages: u32) -> TableController {
        let mut controller = TableController::new();
        let query = controller.begin_initial_load();
        controller.complete(&query, Some(trips(1, total_pages, 50)));
        controller.settle();
        controller
    }
    
    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }
    
    #[test]
    fn test_initial_state() {
        let controller = TableController::new();
        assert_eq!(controller.page(), PageState { current_page: 1, total_pages: 1 });
        assert!(controller.active_filters().is_empty());
        assert_eq!(controller.phase(), Phase::Idle);
    }
    
    #[test]
    fn test_initial_load_commits_baseline() {
        let mut controller = TableController::new();
        let query = controller.begin_initial_load();
        assert_eq!(query.page, 1);
        assert_eq!(query.filters, FilterSet::default_window());
        assert!(controller.active_filters().is_empty());
        
        assert_eq!(controller.complete(&query, Some(trips(1, 77, 50))), Completion::Applied);
        assert_eq!(controller.active_filters(), &FilterSet::default_window());
        assert_eq!(controller.page().total_pages, 77);
    }
    
    #[test]
    fn test_baseline_committed_even_when_initial_load_fails() {
        let mut controller = TableController::new();
        let query = controller.begin_initial_load();
        assert_eq!(controller.complete(&query, None), Completion::Failed);
        assert_eq!(controller.active_filters(), &FilterSet::default_window());
        assert_eq!(controller.phase(), Phase::Failed);
    }
    
    #[test]
    fn test_previous_on_first_page_is_noop() {
        let mut controller = loaded(5);
        assert!(controller.navigate(Direction::Previous).is_none());
        assert_eq!(controller.page().current_page, 1);
        assert_eq!(controller.phase(), Phase::Idle);
    }
    
    #[test]
    fn test_next_on_last_page_is_noop() {
        let mut controller = loaded(5);
        for expected in 2..=5 {
            let query = controller.navigate(Direction::Next).unwrap();
            assert_eq!(query.page, expected);
            controller.complete(&query, Some(trips(expected, 5, 50)));
        }
        assert!(controller.navigate(Direction::Next).is_none());
        assert_eq!(controller.page().current_page, 5);
    }
    
    #[test]
    fn test_navigation_reuses_active_filters() {
        let mut controller = loaded(3);
        let query = controller.navigate(Direction::Next).unwrap();
        assert_eq!(query.filters, FilterSet::default_window());
        assert_eq!(controller.page().current_page, 2);
        assert_eq!(controller.phase(), Phase::Loading);
    }
    
    #[test]
    fn test_reversed_dates_rejected_without_mutation() {
        let mut controller = loaded(3);
        let before = controller.active_filters().clone();
        let draft = FilterDraft {
            start_date: "2019-02-01".into(),
            end_date: "2019-01-01".into(),
            ..FilterDraft::default()
        };
        assert!(controller.apply_draft(&draft).is_err());
        assert_eq!(controller.active_filters(), &before);
        assert_eq!(controller.phase(), Phase::Idle);
    }
    
    #[test]
    fn test_reversed_fares_rejected_without_mutation() {
        let mut controller = loaded(3);
        let candidate = FilterSet { min_fare: Some(20.0), max_fare: Some(5.0), ..FilterSet::default() };
        assert!(controller.apply(candidate).is_err());
        assert_eq!(controller.active_filters(), &FilterSet::default_window());
    }
    
    #[test]
    fn test_apply_replaces_filters_and_rewinds_page() {
        let mut controller = loaded(5);
        let next = controller.navigate(Direction::Next).unwrap();
        controller.complete(&next, Some(trips(2, 5, 50)));
        
        let candidate = FilterSet {
            start_date: date("2019-01-10"),
            pickup_zone: Some("JFK".into()),
            ..FilterSet::default()
        };
        let query = controller.apply(candidate.clone()).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(controller.page().current_page, 1);
        // Wholesale: the end date from the old window is gone
        assert_eq!(controller.active_filters(), &candidate);
    }
    
    #[test]
    fn test_reset_is_idempotent() {
        let mut controller = loaded(5);
        controller.apply(FilterSet { min_fare: Some(3.0), ..FilterSet::default() }).unwrap();
        
        let first = controller.reset();
        let state_after_first = (controller.active_filters().clone(), controller.page());
        let second = controller.reset();
        
        assert_eq!(first.filters, second.filters);
        assert_eq!(state_after_first, (controller.active_filters().clone(), controller.page()));
        assert_eq!(controller.page().current_page, 1);
        assert_eq!(controller.active_filters(), &FilterSet::default_window());
    }
    
    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = loaded(10);
        let older = controller.navigate(Direction::Next).unwrap();
        let newer = controller.navigate(Direction::Next).unwrap();
        
        assert_eq!(controller.complete(&newer, Some(trips(3, 10, 7))), Completion::Applied);
        assert_eq!(controller.complete(&older, Some(trips(2, 10, 50))), Completion::Stale);
        assert_eq!(controller.page().current_page, 3);
        assert_eq!(controller.rows().len(), 7);
    }
    
    #[test]
    fn test_in_order_responses_both_apply() {
        let mut controller = loaded(10);
        let older = controller.navigate(Direction::Next).unwrap();
        let newer = controller.navigate(Direction::Next).unwrap();
        
        assert_eq!(controller.complete(&older, Some(trips(2, 10, 50))), Completion::Applied);
        assert_eq!(controller.phase(), Phase::Loading, "a newer query is still outstanding");
        assert_eq!(controller.complete(&newer, Some(trips(3, 10, 50))), Completion::Applied);
        assert_eq!(controller.phase(), Phase::Loaded);
        assert_eq!(controller.page().current_page, 3);
    }
    
    #[test]
    fn test_failed_response_keeps_previous_rows() {
        let mut controller = loaded(4);
        let query = controller.navigate(Direction::Next).unwrap();
        assert_eq!(controller.page().current_page, 2);
        assert_eq!(controller.complete(&query, None), Completion::Failed);
        assert_eq!(controller.rows().len(), 50);
        assert_eq!(controller.total_count(), 4 * 50);
        assert_eq!(controller.page(), PageState { current_page: 1, total_pages: 4 });
        assert_eq!(controller.phase(), Phase::Failed);
        controller.settle();
        assert_eq!(controller.phase(), Phase::Idle);
        
        // The retry asks for page 2 again rather than skipping ahead
        assert_eq!(controller.navigate(Direction::Next).unwrap().page, 2);
    }
    
    #[test]
    fn test_superseded_failure_leaves_page_alone() {
        let mut controller = loaded(10);
        let older = controller.navigate(Direction::Next).unwrap();
        let newer = controller.navigate(Direction::Next).unwrap();
        
        assert_eq!(controller.complete(&older, None), Completion::Failed);
        assert_eq!(controller.page().current_page, 3);
        assert_eq!(controller.phase(), Phase::Loading);
        
        assert_eq!(controller.complete(&newer, Some(trips(3, 10, 50))), Completion::Applied);
        assert_eq!(controller.page().current_page, 3);
    }
    
    #[test]
    fn test_late_initial_load_keeps_applied_filters() {
        let mut controller = TableController::new();
        let initial = controller.begin_initial_load();
        
        let chosen = FilterSet { pickup_zone: Some("JFK".into()), ..FilterSet::default() };
        let applied = controller.apply(chosen.clone()).unwrap();
        assert_eq!(controller.complete(&applied, Some(trips(1, 2, 50))), Completion::Applied);
        
        assert_eq!(controller.complete(&initial, Some(trips(1, 77, 50))), Completion::Stale);
        assert_eq!(controller.active_filters(), &chosen);
        assert_eq!(controller.page().total_pages, 2);
    }
    
    #[test]
    fn test_failed_initial_load_after_apply_keeps_applied_filters() {
        let mut controller = TableController::new();
        let initial = controller.begin_initial_load();
        let chosen = FilterSet { min_fare: Some(3.0), ..FilterSet::default() };
        controller.apply(chosen.clone()).unwrap();
        
        assert_eq!(controller.complete(&initial, None), Completion::Failed);
        assert_eq!(controller.active_filters(), &chosen);
        assert_eq!(controller.phase(), Phase::Loading, "the apply is still outstanding");
    }
    
    #[test]
    fn test_reported_page_is_clamped() {
        let mut controller = TableController::new();
        let query = controller.begin_initial_load();
        controller.complete(&query, Some(trips(9, 0, 0)));
        assert_eq!(controller.page(), PageState { current_page: 1, total_pages: 1 });
    }
}

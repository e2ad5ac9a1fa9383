// services/trip-dash/src/mock.rs
//
// Demo-mode backend: answers the analytics REST contract with generated data
// so the dashboard runs without the service.
//

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use rand::Rng;
use reqwest::Url;
use serde_json::{json, Value};

use svckit::errors::DashError;
use svckit::transport::Transport;

use crate::api::{AVERAGE_FARE_PER_MILE, HOURLY_DEMAND, REVENUE_BY_ZONE, ROWS_PER_PAGE, TOP_REVENUE_ZONES, TRIPS};

const ZONES: &[(&str, &str)] = &[
    ("Upper East Side North", "Manhattan"),
    ("Upper East Side South", "Manhattan"),
    ("Midtown Center", "Manhattan"),
    ("Times Sq/Theatre District", "Manhattan"),
    ("Penn Station/Madison Sq West", "Manhattan"),
    ("Greenwich Village North", "Manhattan"),
    ("JFK Airport", "Queens"),
    ("LaGuardia Airport", "Queens"),
    ("Astoria", "Queens"),
    ("Williamsburg (North Side)", "Brooklyn"),
    ("Park Slope", "Brooklyn"),
    ("Downtown Brooklyn/MetroTech", "Brooklyn"),
    ("Mott Haven/Port Morris", "Bronx"),
    ("St. George/New Brighton", "Staten Island"),
    ("Newark Airport", "EWR"),
];

const BUCKETS: &[(&str, f64, f64)] = &[
    ("0-1 miles", 0.2, 1.0),
    ("1-3 miles", 1.0, 3.0),
    ("3-5 miles", 3.0, 5.0),
    ("5-10 miles", 5.0, 10.0),
    ("10-20 miles", 10.0, 20.0),
    ("20+ miles", 20.0, 35.0),
];

/// Trips in the full January 2019 window before any filter narrows it
const BASE_TRIP_COUNT: u64 = 7_667;

/// Ceilings for generated trips; filters beyond them match nothing
const MAX_FARE: f64 = 500.0;
const MAX_TRIP_MILES: f64 = 200.0;

pub struct MockBackend {
    zone_revenue: Vec<f64>,
}

impl MockBackend {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let zone_revenue = ZONES
            .iter()
            .map(|(_, borough)| {
                let scale = match *borough {
                    "Manhattan" => 600_000.0,
                    "Queens" => 450_000.0,
                    "Brooklyn" => 150_000.0,
                    _ => 40_000.0,
                };
                (scale * rng.gen_range(0.6..1.4_f64) * 100.0).round() / 100.0
            })
            .collect();
        
        Self { zone_revenue }
    }
    
    fn hourly_demand(&self) -> Value {
        let mut rng = rand::thread_rng();
        let data: Vec<Value> = (0..24u32)
            .map(|hour| {
                // Overnight trough, evening peak
                let shape = match hour {
                    0..=5 => 0.25,
                    6..=9 => 0.8,
                    10..=15 => 0.7,
                    16..=20 => 1.0,
                    _ => 0.55,
                };
                let count = (400_000.0 * shape * rng.gen_range(0.85..1.15_f64)) as u64;
                json!({ "pickup_hour": hour, "trip_count": count })
            })
            .collect();
        json!({ "data": data })
    }
    
    fn revenue_by_zone(&self) -> Value {
        let data: Vec<Value> = ZONES
            .iter()
            .zip(&self.zone_revenue)
            .map(|((zone, borough), revenue)| {
                let trips = (revenue / 17.5) as u64;
                json!({
                    "zone_name": zone,
                    "borough_name": borough,
                    "trip_count": trips,
                    "total_revenue": revenue,
                    "avg_revenue_per_trip": (revenue / trips.max(1) as f64 * 100.0).round() / 100.0,
                })
            })
            .collect();
        json!({ "data": data })
    }
    
    fn average_fare_per_mile(&self) -> Value {
        let mut rng = rand::thread_rng();
        let data: Vec<Value> = BUCKETS
            .iter()
            .map(|(bucket, low, high)| {
                let miles = (low + high) / 2.0;
                let fare = 3.5 + miles * rng.gen_range(2.3..2.8_f64);
                json!({
                    "distance_bucket": bucket,
                    "trip_count": rng.gen_range(5_000..90_000u64),
                    "avg_fare": (fare * 100.0).round() / 100.0,
                    "avg_fare_per_mile": (fare / miles * 10_000.0).round() / 10_000.0,
                    "avg_speed_mph": (rng.gen_range(7.0..24.0_f64) * 100.0).round() / 100.0,
                })
            })
            .collect();
        json!({ "data": data })
    }
    
    fn top_revenue_zones(&self, n: usize) -> Value {
        let mut ranked: Vec<(usize, f64)> = self.zone_revenue.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        
        let data: Vec<Value> = ranked
            .into_iter()
            .take(n)
            .map(|(i, revenue)| {
                json!({
                    "zone_name": ZONES[i].0,
                    "borough_name": ZONES[i].1,
                    "trip_count": (revenue / 17.5) as u64,
                    "total_revenue": revenue,
                })
            })
            .collect();
        json!({ "data": data })
    }
    
    fn trips(&self, url: &Url) -> Value {
        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        let number = |name: &str| {
            param(name)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        
        let page = param("page").and_then(|v| v.parse::<u32>().ok()).unwrap_or(1).max(1);
        let limit = param("limit").and_then(|v| v.parse::<u32>().ok()).unwrap_or(ROWS_PER_PAGE).max(1);
        let start = param("start_date")
            .and_then(|v| NaiveDateTime::parse_from_str(&v, "%Y-%m-%d %H:%M:%S").ok())
            .or_else(|| NaiveDate::from_ymd_opt(2019, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)));
        let end = param("end_date")
            .and_then(|v| NaiveDateTime::parse_from_str(&v, "%Y-%m-%d %H:%M:%S").ok())
            .or_else(|| NaiveDate::from_ymd_opt(2019, 1, 31).and_then(|d| d.and_hms_opt(23, 59, 59)));
        let min_fare = number("min_fare").unwrap_or(2.5).max(0.0);
        let max_fare = number("max_fare").unwrap_or(120f64.max(min_fare + 10.0)).min(MAX_FARE);
        let min_distance = number("min_distance").unwrap_or(0.1).max(0.1);
        
        let zones = matching_zones(param("pickup_zone"));
        let dropoffs = matching_zones(param("dropoff_zone"));
        
        let (Some(start), Some(end)) = (start, end) else {
            return empty_page(page, limit);
        };
        if zones.is_empty() || dropoffs.is_empty() || end < start {
            return empty_page(page, limit);
        }
        if min_fare > max_fare || min_distance > MAX_TRIP_MILES {
            return empty_page(page, limit);
        }
        
        // Narrow the base count roughly in proportion to each filter
        let days = ((end - start).num_hours() as f64 / 24.0).clamp(0.05, 31.0);
        let mut share = days / 31.0 * zones.len() as f64 / ZONES.len() as f64;
        share *= dropoffs.len() as f64 / ZONES.len() as f64;
        share *= ((max_fare - min_fare) / 117.5).clamp(0.02, 1.0);
        share *= (1.0 - min_distance / 40.0).clamp(0.02, 1.0);
        let total_count = ((BASE_TRIP_COUNT as f64 * share).round() as u64).max(1);
        let total_pages = ((total_count + limit as u64 - 1) / limit as u64).max(1) as u32;
        
        let offset = (page as u64 - 1) * limit as u64;
        let rows_here = total_count.saturating_sub(offset).min(limit as u64);
        
        let mut rng = rand::thread_rng();
        let span_secs = (end - start).num_seconds().max(1);
        let data: Vec<Value> = (0..rows_here)
            .map(|i| {
                let pickup_at = start + ChronoDuration::seconds(rng.gen_range(0..span_secs));
                let distance = rng.gen_range(min_distance..=(min_distance + 12.0).min(MAX_TRIP_MILES));
                let fare = rng.gen_range(min_fare..=max_fare);
                let tip = if rng.gen_ratio(2, 3) { fare * rng.gen_range(0.1..0.25) } else { 0.0 };
                let minutes = distance * rng.gen_range(2.5..6.0);
                let dropoff_at = pickup_at + ChronoDuration::seconds((minutes * 60.0) as i64);
                let pickup = ZONES[zones[rng.gen_range(0..zones.len())]];
                let dropoff = ZONES[dropoffs[rng.gen_range(0..dropoffs.len())]];
                
                // Occasional gaps, as in the real feed
                let total = if rng.gen_ratio(1, 40) { Value::Null } else { json!(round2(fare + tip + 1.3)) };
                
                json!({
                    "trip_id": offset + i + 1,
                    "pickup_datetime": pickup_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "dropoff_datetime": dropoff_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "trip_distance": round2(distance),
                    "fare_amount": round2(fare),
                    "total_amount": total,
                    "tip_amount": round2(tip),
                    "passenger_count": rng.gen_range(1..=4u32),
                    "fare_per_mile": round2(fare / distance),
                    "trip_duration_minutes": round2(minutes),
                    "avg_speed_mph": round2(distance / (minutes / 60.0)),
                    "pickup_zone": pickup.0,
                    "dropoff_zone": dropoff.0,
                    "pickup_borough": pickup.1,
                    "dropoff_borough": dropoff.1,
                })
            })
            .collect();
        
        json!({
            "data": data,
            "page": page,
            "limit": limit,
            "total_count": total_count,
            "total_pages": total_pages,
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Zone indices whose name contains `needle`, case-insensitively; all when unset
fn matching_zones(needle: Option<String>) -> Vec<usize> {
    let Some(needle) = needle.map(|n| n.to_lowercase()) else {
        return (0..ZONES.len()).collect();
    };
    ZONES
        .iter()
        .enumerate()
        .filter(|(_, (zone, _))| zone.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

fn empty_page(page: u32, limit: u32) -> Value {
    json!({ "data": [], "page": page, "limit": limit, "total_count": 0, "total_pages": 1 })
}

#[async_trait]
impl Transport for MockBackend {
    async fn get_json(&self, url: &str) -> Result<Value, DashError> {
        let url = Url::parse(url).map_err(|e| DashError::NetworkError(e.to_string()))?;
        
        match url.path() {
            HOURLY_DEMAND => Ok(self.hourly_demand()),
            REVENUE_BY_ZONE => Ok(self.revenue_by_zone()),
            AVERAGE_FARE_PER_MILE => Ok(self.average_fare_per_mile()),
            TOP_REVENUE_ZONES => {
                let n = url
                    .query_pairs()
                    .find(|(k, _)| k == "n")
                    .and_then(|(_, v)| v.parse::<usize>().ok())
                    .unwrap_or(10);
                if !(1..=50).contains(&n) {
                    return Err(DashError::HttpStatus {
                        status: 400,
                        message: "Parameter 'n' must be between 1 and 50.".to_string(),
                    });
                }
                Ok(self.top_revenue_zones(n))
            }
            TRIPS => Ok(self.trips(&url)),
            other => Err(DashError::HttpStatus {
                status: 404,
                message: format!("No route for {}", other),
            }),
        }
    }
    
    fn name(&self) -> &str {
        "mock"
    }
}

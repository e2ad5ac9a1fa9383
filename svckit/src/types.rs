// svckit/src/types.rs
//
// Wire shapes returned by the taxi analytics REST service.
// Every trip field is nullable on the wire, so it is optional here.

use serde::{Deserialize, Serialize};

/// `{ "data": [...] }` envelope shared by every analytics endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataEnvelope<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyDemandRow {
    pub pickup_hour: u32,
    pub trip_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueRow {
    pub zone_name: Option<String>,
    pub borough_name: Option<String>,
    pub total_revenue: f64,
    pub trip_count: Option<u64>,
    pub avg_revenue_per_trip: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareBucketRow {
    pub distance_bucket: String,
    pub avg_fare: f64,
    pub avg_fare_per_mile: f64,
    pub trip_count: Option<u64>,
    pub avg_speed_mph: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopZoneRow {
    pub zone_name: String,
    pub total_revenue: f64,
    pub borough_name: Option<String>,
    pub trip_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TripRecord {
    pub trip_id: Option<u64>,
    pub pickup_datetime: Option<String>,
    pub dropoff_datetime: Option<String>,
    pub pickup_zone: Option<String>,
    pub dropoff_zone: Option<String>,
    pub pickup_borough: Option<String>,
    pub dropoff_borough: Option<String>,
    pub trip_distance: Option<f64>,
    pub fare_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub tip_amount: Option<f64>,
    pub trip_duration_minutes: Option<f64>,
    pub avg_speed_mph: Option<f64>,
    pub passenger_count: Option<u32>,
    pub fare_per_mile: Option<f64>,
    pub pickup_hour: Option<u8>,
    pub is_weekend: Option<u8>,
}

/// Response of `GET /api/trips`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripsPage {
    pub data: Vec<TripRecord>,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Error body the service sends alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

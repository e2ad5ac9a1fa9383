use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec,
    HistogramVec, IntCounter, IntCounterVec,
};

lazy_static! {
    pub static ref FETCH_DURATION: HistogramVec = register_histogram_vec!(
        "dashboard_fetch_duration_seconds",
        "Analytics API fetch duration in seconds",
        &["endpoint", "status"]
    ).unwrap();
    
    pub static ref FETCH_COUNTER: IntCounterVec = register_int_counter_vec!(
        "dashboard_fetches_total",
        "Total number of analytics API fetches",
        &["endpoint", "status"]
    ).unwrap();
    
    pub static ref STALE_RESPONSES: IntCounter = register_int_counter!(
        "dashboard_stale_responses_total",
        "Trips responses discarded because a newer query was already applied"
    ).unwrap();
}

pub fn record_fetch(endpoint: &str, success: bool, duration: f64) {
    let status = if success { "success" } else { "failure" };
    FETCH_DURATION
        .with_label_values(&[endpoint, status])
        .observe(duration);
    FETCH_COUNTER
        .with_label_values(&[endpoint, status])
        .inc();
}

pub fn record_stale_response() {
    STALE_RESPONSES.inc();
}

/// Render the default registry in the Prometheus text format
pub fn snapshot() -> String {
    use prometheus::Encoder;
    
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&prometheus::gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

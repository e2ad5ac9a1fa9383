// services/trip-dash/src/api.rs
//
// Endpoint URLs of the taxi analytics REST service
//

use reqwest::Url;
use svckit::errors::DashError;

use crate::filters::FilterSet;

/// Page size of the trips table. Fixed; never user-controlled.
pub const ROWS_PER_PAGE: u32 = 50;

pub const HOURLY_DEMAND: &str = "/api/analytics/hourly-demand";
pub const REVENUE_BY_ZONE: &str = "/api/analytics/revenue-by-zone";
pub const AVERAGE_FARE_PER_MILE: &str = "/api/analytics/average-fare-per-mile";
pub const TOP_REVENUE_ZONES: &str = "/api/analytics/top-revenue-zones";
pub const TRIPS: &str = "/api/trips";

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    prefix: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, DashError> {
        let base = Url::parse(base_url)
            .map_err(|e| DashError::ConfigError(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        let prefix = base.path().trim_end_matches('/').to_string();
        
        Ok(Self { base, prefix })
    }
    
    pub fn hourly_demand(&self) -> String {
        self.build(HOURLY_DEMAND, &[])
    }
    
    pub fn revenue_by_zone(&self) -> String {
        self.build(REVENUE_BY_ZONE, &[])
    }
    
    pub fn average_fare_per_mile(&self) -> String {
        self.build(AVERAGE_FARE_PER_MILE, &[])
    }
    
    pub fn top_revenue_zones(&self, n: u32) -> String {
        self.build(TOP_REVENUE_ZONES, &[("n", n.to_string())])
    }
    
    pub fn trips(&self, page: u32, filters: &FilterSet) -> String {
        let mut pairs = vec![
            ("page", page.to_string()),
            ("limit", ROWS_PER_PAGE.to_string()),
        ];
        pairs.extend(filters.query_pairs());
        self.build(TRIPS, &pairs)
    }
    
    fn build(&self, path: &str, pairs: &[(&str, String)]) -> String {
        let mut url = self.base.clone();
        url.set_path(&format!("{}{}", self.prefix, path));
        url.set_query(None);
        url.set_fragment(None);
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_plain_endpoints() {
        let endpoints = Endpoints::new("http://localhost:5000/").unwrap();
        assert_eq!(endpoints.hourly_demand(), "http://localhost:5000/api/analytics/hourly-demand");
        assert_eq!(endpoints.top_revenue_zones(10), "http://localhost:5000/api/analytics/top-revenue-zones?n=10");
    }
    
    #[test]
    fn test_base_path_is_kept() {
        let endpoints = Endpoints::new("https://example.org/taxi").unwrap();
        assert_eq!(endpoints.revenue_by_zone(), "https://example.org/taxi/api/analytics/revenue-by-zone");
    }
    
    #[test]
    fn test_trips_query_always_sends_fixed_limit() {
        let endpoints = Endpoints::new("http://localhost:5000").unwrap();
        let url = Url::parse(&endpoints.trips(3, &FilterSet::default_window())).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        
        assert_eq!(url.path(), TRIPS);
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "50".to_string())));
        assert!(pairs.contains(&("start_date".to_string(), "2019-01-01 00:00:00".to_string())));
        assert!(pairs.contains(&("end_date".to_string(), "2019-01-31 23:59:59".to_string())));
    }
    
    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(Endpoints::new("not a url"), Err(DashError::ConfigError(_))));
    }
}

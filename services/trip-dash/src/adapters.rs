// services/trip-dash/src/adapters.rs
//
// Pure transforms from fetched rows to renderable chart data
//

use svckit::types::{FareBucketRow, HourlyDemandRow, TopZoneRow};

use crate::aggregation::{shorten_label, BoroughTotals};

/// Labels and values with 1:1 index correspondence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    HourlyDemand,
    RevenueByBorough,
    FarePerDistance,
    TopZones,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::HourlyDemand,
        ChartId::RevenueByBorough,
        ChartId::FarePerDistance,
        ChartId::TopZones,
    ];
    
    pub fn title(&self) -> &'static str {
        match self {
            ChartId::HourlyDemand => "Hourly Demand",
            ChartId::RevenueByBorough => "Revenue by Borough",
            ChartId::FarePerDistance => "Fare per Distance",
            ChartId::TopZones => "Top Revenue Zones",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    HourlyDemand {
        series: Series,
        intensity: Vec<f64>,
        peak_hour: Option<u32>,
    },
    RevenueByBorough {
        series: Series,
    },
    FarePerDistance {
        avg_fare: Series,
        avg_fare_per_mile: Series,
    },
    TopZones {
        series: Series,
        intensity: Vec<f64>,
        /// Full zone names, index-aligned with the shortened labels
        zones: Vec<String>,
    },
}

impl ChartData {
    pub fn id(&self) -> ChartId {
        match self {
            ChartData::HourlyDemand { .. } => ChartId::HourlyDemand,
            ChartData::RevenueByBorough { .. } => ChartId::RevenueByBorough,
            ChartData::FarePerDistance { .. } => ChartId::FarePerDistance,
            ChartData::TopZones { .. } => ChartId::TopZones,
        }
    }
}

/// `base + (1 - base) * value / reference`; a zero reference yields `base`
fn scaled_intensity(values: &[f64], reference: f64, base: f64) -> Vec<f64> {
    values
        .iter()
        .map(|v| {
            if reference > 0.0 {
                base + (1.0 - base) * (v / reference)
            } else {
                base
            }
        })
        .collect()
}

pub fn hourly_demand(rows: &[HourlyDemandRow]) -> ChartData {
    let series = Series {
        labels: rows.iter().map(|r| format!("{}:00", r.pickup_hour)).collect(),
        values: rows.iter().map(|r| r.trip_count as f64).collect(),
    };
    let max = series.values.iter().copied().fold(0.0, f64::max);
    let intensity = scaled_intensity(&series.values, max, 0.4);
    
    // First hour reaching the maximum
    let peak_hour = rows
        .iter()
        .fold(None::<&HourlyDemandRow>, |best, r| match best {
            Some(b) if b.trip_count >= r.trip_count => Some(b),
            _ => Some(r),
        })
        .map(|r| r.pickup_hour);
    
    ChartData::HourlyDemand { series, intensity, peak_hour }
}

pub fn revenue_by_borough(totals: &BoroughTotals) -> ChartData {
    let (labels, values) = totals.ranked().into_iter().unzip();
    ChartData::RevenueByBorough {
        series: Series { labels, values },
    }
}

pub fn fare_per_distance(rows: &[FareBucketRow]) -> ChartData {
    let labels: Vec<String> = rows.iter().map(|r| r.distance_bucket.clone()).collect();
    ChartData::FarePerDistance {
        avg_fare: Series {
            labels: labels.clone(),
            values: rows.iter().map(|r| r.avg_fare).collect(),
        },
        avg_fare_per_mile: Series {
            labels,
            values: rows.iter().map(|r| r.avg_fare_per_mile).collect(),
        },
    }
}

/// Rows are taken in service order. The intensity scale is relative to the
/// first row, which the service guarantees is the largest.
pub fn top_zones(rows: &[TopZoneRow]) -> ChartData {
    let series = Series {
        labels: rows.iter().map(|r| shorten_label(&r.zone_name)).collect(),
        values: rows.iter().map(|r| r.total_revenue).collect(),
    };
    let first = series.values.first().copied().unwrap_or(0.0);
    let intensity = scaled_intensity(&series.values, first, 0.5);
    
    ChartData::TopZones {
        series,
        intensity,
        zones: rows.iter().map(|r| r.zone_name.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::types::RevenueRow;
    
    fn hour(h: u32, count: u64) -> HourlyDemandRow {
        HourlyDemandRow { pickup_hour: h, trip_count: count }
    }
    
    fn zone(name: &str, revenue: f64) -> TopZoneRow {
        TopZoneRow { zone_name: name.to_string(), total_revenue: revenue, borough_name: None, trip_count: None }
    }
    
    #[test]
    fn test_hourly_labels_and_intensity() {
        let rows = vec![hour(0, 50), hour(8, 200), hour(17, 200), hour(23, 0)];
        let ChartData::HourlyDemand { series, intensity, peak_hour } = hourly_demand(&rows) else {
            panic!("wrong chart");
        };
        assert_eq!(series.labels, vec!["0:00", "8:00", "17:00", "23:00"]);
        assert_eq!(series.values, vec![50.0, 200.0, 200.0, 0.0]);
        let expected = [0.55, 1.0, 1.0, 0.4];
        for (got, want) in intensity.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{} != {}", got, want);
        }
        assert_eq!(peak_hour, Some(8));
    }
    
    #[test]
    fn test_hourly_all_zero_and_empty() {
        let ChartData::HourlyDemand { intensity, .. } = hourly_demand(&[hour(1, 0)]) else { panic!() };
        assert_eq!(intensity, vec![0.4]);
        let ChartData::HourlyDemand { series, peak_hour, .. } = hourly_demand(&[]) else { panic!() };
        assert!(series.labels.is_empty() && series.values.is_empty());
        assert_eq!(peak_hour, None);
    }
    
    #[test]
    fn test_revenue_by_borough_uses_ranked_order() {
        let rows: Vec<RevenueRow> = [("Queens", 50.0), ("Manhattan", 300.0), ("Queens", 60.0)]
            .iter()
            .map(|(b, v)| RevenueRow {
                zone_name: None,
                borough_name: Some(b.to_string()),
                total_revenue: *v,
                trip_count: None,
                avg_revenue_per_trip: None,
            })
            .collect();
        let ChartData::RevenueByBorough { series } = revenue_by_borough(&BoroughTotals::from_rows(&rows)) else {
            panic!()
        };
        assert_eq!(series.labels, vec!["Manhattan", "Queens"]);
        assert_eq!(series.values, vec![300.0, 110.0]);
    }
    
    #[test]
    fn test_fare_series_share_labels() {
        let rows = vec![
            FareBucketRow { distance_bucket: "0-1 miles".into(), avg_fare: 9.25, avg_fare_per_mile: 11.4, trip_count: None, avg_speed_mph: None },
            FareBucketRow { distance_bucket: "1-3 miles".into(), avg_fare: 14.0, avg_fare_per_mile: 7.1, trip_count: None, avg_speed_mph: None },
        ];
        let ChartData::FarePerDistance { avg_fare, avg_fare_per_mile } = fare_per_distance(&rows) else { panic!() };
        assert_eq!(avg_fare.labels, avg_fare_per_mile.labels);
        assert_eq!(avg_fare.values, vec![9.25, 14.0]);
        assert_eq!(avg_fare_per_mile.values, vec![11.4, 7.1]);
    }
    
    #[test]
    fn test_top_zones_passthrough_and_intensity() {
        let long = "Upper East Side North Extended";
        let rows = vec![zone(long, 1000.0), zone("JFK Airport", 500.0), zone("Midtown", 0.0)];
        let ChartData::TopZones { series, intensity, zones } = top_zones(&rows) else { panic!() };
        
        assert_eq!(series.values, vec![1000.0, 500.0, 0.0]);
        assert_eq!(intensity, vec![1.0, 0.75, 0.5]);
        assert_eq!(series.labels[0].chars().count(), 23);
        assert_eq!(zones[0], long);
    }
    
    #[test]
    fn test_adapters_are_idempotent() {
        let rows = vec![hour(3, 10), hour(4, 20)];
        assert_eq!(hourly_demand(&rows), hourly_demand(&rows));
    }
}

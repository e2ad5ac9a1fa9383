// services/trip-dash/src/filters.rs
//
// Trip filter values and the Apply validation gate
//

use chrono::NaiveDate;
use svckit::errors::DashError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Active trip filters. Replaced wholesale, never patched field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pickup_zone: Option<String>,
    pub dropoff_zone: Option<String>,
    pub min_fare: Option<f64>,
    pub max_fare: Option<f64>,
    pub min_distance: Option<f64>,
}

impl FilterSet {
    /// The documented baseline window: January 2019, nothing else set
    pub fn default_window() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2019, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2019, 1, 31),
            ..Self::default()
        }
    }
    
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
    
    /// Cross-field checks, short-circuiting on the first failure
    pub fn validate(&self) -> Result<(), DashError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(DashError::ValidationError(
                    "Start date must be on or before end date".to_string(),
                ));
            }
        }
        
        if let (Some(min), Some(max)) = (self.min_fare, self.max_fare) {
            if min > max {
                return Err(DashError::ValidationError(
                    "Minimum fare cannot be greater than maximum fare".to_string(),
                ));
            }
        }
        
        Ok(())
    }
    
    /// Query-string pairs for `GET /api/trips`. Absent fields are not sent.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        
        if let Some(start) = self.start_date {
            pairs.push(("start_date", format!("{} 00:00:00", start.format(DATE_FORMAT))));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", format!("{} 23:59:59", end.format(DATE_FORMAT))));
        }
        if let Some(zone) = &self.pickup_zone {
            pairs.push(("pickup_zone", zone.clone()));
        }
        if let Some(zone) = &self.dropoff_zone {
            pairs.push(("dropoff_zone", zone.clone()));
        }
        if let Some(min) = self.min_fare {
            pairs.push(("min_fare", min.to_string()));
        }
        if let Some(max) = self.max_fare {
            pairs.push(("max_fare", max.to_string()));
        }
        if let Some(min) = self.min_distance {
            pairs.push(("min_distance", min.to_string()));
        }
        
        pairs
    }
}

/// Raw text of the filter inputs, as typed. Blank means "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDraft {
    pub start_date: String,
    pub end_date: String,
    pub pickup_zone: String,
    pub dropoff_zone: String,
    pub min_fare: String,
    pub max_fare: String,
    pub min_distance: String,
}

impl FilterDraft {
    /// Parse every field, then run the cross-field checks
    pub fn parse(&self) -> Result<FilterSet, DashError> {
        let filters = FilterSet {
            start_date: parse_date(&self.start_date, "start date")?,
            end_date: parse_date(&self.end_date, "end date")?,
            pickup_zone: parse_text(&self.pickup_zone),
            dropoff_zone: parse_text(&self.dropoff_zone),
            min_fare: parse_number(&self.min_fare, "minimum fare")?,
            max_fare: parse_number(&self.max_fare, "maximum fare")?,
            min_distance: parse_number(&self.min_distance, "minimum distance")?,
        };
        filters.validate()?;
        Ok(filters)
    }
}

fn parse_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(raw: &str, field: &str) -> Result<Option<NaiveDate>, DashError> {
    match parse_text(raw) {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| DashError::ValidationError(format!("Invalid {}: '{}' (expected YYYY-MM-DD)", field, text))),
    }
}

fn parse_number(raw: &str, field: &str) -> Result<Option<f64>, DashError> {
    match parse_text(raw) {
        None => Ok(None),
        Some(text) => match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(DashError::ValidationError(format!("Invalid {}: '{}'", field, text))),
        },
    }
}

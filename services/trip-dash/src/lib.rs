// services/trip-dash/src/lib.rs
//
// NYC taxi trip analytics dashboard: backend gateway, chart adapters,
// trips table state machine and the terminal render sink.
//

pub mod adapters;
pub mod aggregation;
pub mod api;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod filters;
pub mod gateway;
pub mod health;
pub mod mock;
pub mod notice;
pub mod sink;
pub mod summary;
pub mod tui;

pub use dashboard::Dashboard;
pub use filters::{FilterDraft, FilterSet};

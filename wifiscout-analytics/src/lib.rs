//! Aggregate reporting over stored access point telemetry.
//!
//! [`build_report`] condenses a window of [`MetricRecord`]s into a
//! [`NetworkReport`]: best and worst access points, per-building and
//! per-hour statistics, and congestion counts. Every score comes from
//! [`wifiscout_core::quality`], so reports agree with the advisor.
//!
//! Reporting is pure. Callers choose the window, typically with a store's
//! `metrics_since` query, and pass the records in.
//!
//! # Examples
//! ```
//! use wifiscout_analytics::build_report;
//!
//! let report = build_report(&[], 5);
//! assert!(report.is_empty());
//! ```
//!
//! [`MetricRecord`]: wifiscout_core::MetricRecord

#![forbid(unsafe_code)]

mod congestion;
mod report;
mod stats;

pub use congestion::CongestionLevel;
pub use report::{
    BuildingStats, DateRange, HourlyAverages, NetworkReport, OverallStats, PerformerSummary,
    build_report,
};

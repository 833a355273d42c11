//! Data access traits for access point telemetry.
//!
//! [`MetricStore`] is the read side consumed by the advisor; [`MetricSink`]
//! is the write side used by ingestion and the simulated collector. Both are
//! synchronous and `Send + Sync` so a single store can be shared across
//! threads behind an [`Arc`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{GeoPoint, MetricRecord, StoreError, proximity};

mod memory;
#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryMetricStore;
#[cfg(feature = "store-sqlite")]
pub use schema::MetricsSchemaError;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteMetricStore, SqliteMetricStoreError};

/// Read access to the latest and historical metrics of access points.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use wifiscout_core::{
///     AccessPoint, GeoPoint, Measurements, MemoryMetricStore, MetricRecord, MetricSink,
///     MetricStore,
/// };
///
/// let store = MemoryMetricStore::default();
/// let location = GeoPoint::new(40.7128, -74.0060).expect("valid coordinates");
/// let record = MetricRecord::new(
///     AccessPoint::new("LOBBY_AP").at(location),
///     Measurements::default(),
///     Utc::now(),
/// );
/// store.record(&record).expect("record metrics");
///
/// let latest = store.latest_located_metrics().expect("query store");
/// assert_eq!(latest.len(), 1);
/// ```
pub trait MetricStore: Send + Sync {
    /// The most recent record of every access point that has a location,
    /// in ascending identifier order.
    fn latest_located_metrics(&self) -> Result<Vec<MetricRecord>, StoreError>;

    /// The latest record of the located access point minimising
    /// `|Δlat| + |Δlon|` to `origin`. Ties go to the lowest identifier.
    ///
    /// The default scans [`MetricStore::latest_located_metrics`].
    fn closest_by_crude_distance(
        &self,
        origin: &GeoPoint,
    ) -> Result<Option<MetricRecord>, StoreError> {
        let snapshot = self.latest_located_metrics()?;
        Ok(proximity::crude_nearest(&snapshot, origin).cloned())
    }

    /// The most recent record of one access point, located or not.
    ///
    /// Returns `None` when no metrics exist for `access_point_id`.
    fn latest_metrics_for(
        &self,
        access_point_id: u64,
    ) -> Result<Option<MetricRecord>, StoreError>;

    /// Every record of one access point captured at or after `since`,
    /// oldest first.
    fn metric_history(
        &self,
        access_point_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, StoreError>;
}

/// Write access for incoming telemetry.
pub trait MetricSink: Send + Sync {
    /// Persist one record, creating its access point on first sight, and
    /// return the access point identifier.
    ///
    /// Access points are keyed by name. Metadata supplied with later
    /// records for an existing name is ignored.
    fn record(&self, record: &MetricRecord) -> Result<u64, StoreError>;
}

impl<T: MetricStore + ?Sized> MetricStore for Arc<T> {
    fn latest_located_metrics(&self) -> Result<Vec<MetricRecord>, StoreError> {
        (**self).latest_located_metrics()
    }

    fn closest_by_crude_distance(
        &self,
        origin: &GeoPoint,
    ) -> Result<Option<MetricRecord>, StoreError> {
        (**self).closest_by_crude_distance(origin)
    }

    fn latest_metrics_for(
        &self,
        access_point_id: u64,
    ) -> Result<Option<MetricRecord>, StoreError> {
        (**self).latest_metrics_for(access_point_id)
    }

    fn metric_history(
        &self,
        access_point_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        (**self).metric_history(access_point_id, since)
    }
}

impl<T: MetricSink + ?Sized> MetricSink for Arc<T> {
    fn record(&self, record: &MetricRecord) -> Result<u64, StoreError> {
        (**self).record(record)
    }
}

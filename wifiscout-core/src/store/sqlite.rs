//! SQLite-backed metric store.
//!
//! Timestamps are persisted as fixed-width RFC 3339 strings with
//! microsecond precision and a `Z` suffix so that lexical order in SQL
//! matches chronological order.

use std::io;
use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use rusqlite::{Connection, Params, Row, params};
use thiserror::Error;

use crate::metric::{latency_as_millis, latency_from_millis};
use crate::{AccessPoint, GeoPoint, Measurements, MetricRecord, StoreError, fs};

use super::schema::{MetricsSchemaError, initialise_schema};
use super::{MetricSink, MetricStore};

const RECORD_COLUMNS: &str = "ap.id, ap.ap_name, ap.building, ap.floor, ap.room_number,
    ap.latitude, ap.longitude, pm.download_speed, pm.upload_speed, pm.latency_ms,
    pm.packet_loss, pm.connected_users, pm.signal_strength, pm.bandwidth_usage,
    pm.captured_at";

/// Join yielding each access point with its latest metrics row. Equal
/// capture instants resolve to the most recently inserted row.
const LATEST_JOIN: &str = "FROM access_points AS ap
    JOIN performance_metrics AS pm ON pm.id = (
        SELECT latest.id FROM performance_metrics AS latest
        WHERE latest.ap_id = ap.id
        ORDER BY latest.captured_at DESC, latest.id DESC
        LIMIT 1
    )";

const LOCATED: &str = "ap.latitude IS NOT NULL AND ap.longitude IS NOT NULL";

/// Error raised when opening a SQLite metric store.
#[derive(Debug, Error)]
pub enum SqliteMetricStoreError {
    /// The parent directory of the database could not be created.
    #[error("failed to prepare directory for {path}: {source}")]
    PrepareDirectory {
        /// Location of the SQLite database on disk.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The schema could not be created or is from another release.
    #[error(transparent)]
    Schema(#[from] MetricsSchemaError),
}

/// Read-write metric store backed by a single SQLite connection.
///
/// The connection sits behind a [`Mutex`]; a poisoned lock surfaces as
/// [`StoreError::Poisoned`] rather than a panic.
#[derive(Debug)]
pub struct SqliteMetricStore {
    connection: Mutex<Connection>,
    path: Option<Utf8PathBuf>,
}

impl SqliteMetricStore {
    /// Open (or create) the database at `path`, creating parent directories
    /// and the schema as needed.
    ///
    /// # Errors
    /// Returns [`SqliteMetricStoreError`] when the directory, database or
    /// schema cannot be prepared.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteMetricStoreError> {
        fs::ensure_parent_dir(path).map_err(|source| SqliteMetricStoreError::PrepareDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path).map_err(|source| SqliteMetricStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::initialise(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteMetricStoreError`] when the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteMetricStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteMetricStoreError::OpenDatabase {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::initialise(connection, None)
    }

    fn initialise(
        mut connection: Connection,
        path: Option<Utf8PathBuf>,
    ) -> Result<Self, SqliteMetricStoreError> {
        initialise_schema(&mut connection)?;
        debug!(
            "opened metric store at {}",
            path.as_deref().map_or(":memory:", Utf8Path::as_str)
        );
        Ok(Self {
            connection: Mutex::new(connection),
            path,
        })
    }

    /// Location of the database file, or `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Latest record of every access point that has metrics, located or not,
    /// in ascending identifier order.
    ///
    /// [`MetricSink::record`] registers an access point together with its
    /// first metrics row. Access points inserted without metrics by other
    /// writers have nothing to score and are omitted.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the query fails or a row is corrupt.
    pub fn latest_metrics(&self) -> Result<Vec<MetricRecord>, StoreError> {
        let sql = format!("SELECT {RECORD_COLUMNS} {LATEST_JOIN} ORDER BY ap.id");
        self.query_records("latest metrics", &sql, [])
    }

    /// Every record captured at or after `since`, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the query fails or a row is corrupt.
    pub fn metrics_since(&self, since: DateTime<Utc>) -> Result<Vec<MetricRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM performance_metrics AS pm
             JOIN access_points AS ap ON ap.id = pm.ap_id
             WHERE pm.captured_at >= ?1
             ORDER BY pm.captured_at, pm.id"
        );
        self.query_records("metrics since", &sql, [encode_timestamp(since)])
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Poisoned { operation })
    }

    fn query_records<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        let connection = self.lock(operation)?;
        let mut statement = connection
            .prepare_cached(sql)
            .map_err(|source| StoreError::unavailable(operation, source))?;
        let rows = statement
            .query_map(params, StoredRow::from_row)
            .map_err(|source| StoreError::unavailable(operation, source))?;
        rows.map(|row| {
            row.map_err(|source| StoreError::unavailable(operation, source))
                .and_then(StoredRow::into_record)
        })
        .collect()
    }
}

impl MetricStore for SqliteMetricStore {
    fn latest_located_metrics(&self) -> Result<Vec<MetricRecord>, StoreError> {
        let sql = format!("SELECT {RECORD_COLUMNS} {LATEST_JOIN} WHERE {LOCATED} ORDER BY ap.id");
        let records = self.query_records("latest located metrics", &sql, [])?;
        debug!("sqlite store holds {} located access points", records.len());
        Ok(records)
    }

    fn closest_by_crude_distance(
        &self,
        origin: &GeoPoint,
    ) -> Result<Option<MetricRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} {LATEST_JOIN}
             WHERE {LOCATED}
             ORDER BY ABS(ap.latitude - ?1) + ABS(ap.longitude - ?2), ap.id
             LIMIT 1"
        );
        let mut records = self.query_records(
            "closest access point",
            &sql,
            params![origin.latitude(), origin.longitude()],
        )?;
        Ok(records.pop())
    }

    fn latest_metrics_for(
        &self,
        access_point_id: u64,
    ) -> Result<Option<MetricRecord>, StoreError> {
        let sql = format!("SELECT {RECORD_COLUMNS} {LATEST_JOIN} WHERE ap.id = ?1");
        let mut records =
            self.query_records("latest metrics for access point", &sql, [access_point_id])?;
        Ok(records.pop())
    }

    fn metric_history(
        &self,
        access_point_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM performance_metrics AS pm
             JOIN access_points AS ap ON ap.id = pm.ap_id
             WHERE pm.ap_id = ?1 AND pm.captured_at >= ?2
             ORDER BY pm.captured_at, pm.id"
        );
        self.query_records(
            "metric history",
            &sql,
            params![access_point_id, encode_timestamp(since)],
        )
    }
}

impl MetricSink for SqliteMetricStore {
    fn record(&self, record: &MetricRecord) -> Result<u64, StoreError> {
        const OPERATION: &str = "record metrics";
        let unavailable = |source| StoreError::unavailable(OPERATION, source);

        let mut connection = self.lock(OPERATION)?;
        let transaction = connection.transaction().map_err(unavailable)?;

        let access_point = &record.access_point;
        let inserted = transaction
            .execute(
                "INSERT OR IGNORE INTO access_points
                    (ap_name, building, floor, room_number, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    access_point.name,
                    access_point.building,
                    access_point.floor,
                    access_point.room,
                    access_point.location.map(|l| l.latitude()),
                    access_point.location.map(|l| l.longitude()),
                ],
            )
            .map_err(unavailable)?;
        let id: u64 = transaction
            .query_row(
                "SELECT id FROM access_points WHERE ap_name = ?1",
                [&access_point.name],
                |row| row.get(0),
            )
            .map_err(unavailable)?;
        if inserted > 0 {
            debug!("registered access point {} as {id}", access_point.name);
        }

        let measurements = &record.measurements;
        transaction
            .execute(
                "INSERT INTO performance_metrics
                    (ap_id, download_speed, upload_speed, latency_ms, packet_loss,
                     connected_users, signal_strength, bandwidth_usage, captured_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    measurements.download_mbps,
                    measurements.upload_mbps,
                    measurements.latency.map(latency_as_millis),
                    measurements.packet_loss,
                    measurements.connected_users,
                    measurements.signal_dbm,
                    measurements.bandwidth_usage,
                    encode_timestamp(record.captured_at),
                ],
            )
            .map_err(unavailable)?;
        transaction.commit().map_err(unavailable)?;
        Ok(id)
    }
}

fn encode_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A row exactly as SQLite returned it, before validation.
struct StoredRow {
    id: u64,
    name: String,
    building: String,
    floor: i32,
    room: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    download_mbps: Option<f64>,
    upload_mbps: Option<f64>,
    latency_ms: Option<f64>,
    packet_loss: Option<f64>,
    connected_users: Option<u32>,
    signal_dbm: Option<f64>,
    bandwidth_usage: Option<f64>,
    captured_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            building: row.get(2)?,
            floor: row.get(3)?,
            room: row.get(4)?,
            latitude: row.get(5)?,
            longitude: row.get(6)?,
            download_mbps: row.get(7)?,
            upload_mbps: row.get(8)?,
            latency_ms: row.get(9)?,
            packet_loss: row.get(10)?,
            connected_users: row.get(11)?,
            signal_dbm: row.get(12)?,
            bandwidth_usage: row.get(13)?,
            captured_at: row.get(14)?,
        })
    }

    fn into_record(self) -> Result<MetricRecord, StoreError> {
        let location = self.location()?;
        let latency = self
            .latency_ms
            .map(latency_from_millis)
            .transpose()
            .map_err(|err| self.corrupt(err.to_string()))?;
        let captured_at = DateTime::parse_from_rfc3339(&self.captured_at)
            .map_err(|err| self.corrupt(format!("timestamp {:?}: {err}", self.captured_at)))?
            .with_timezone(&Utc);

        let mut access_point = AccessPoint::new(self.name)
            .in_building(self.building, self.floor)
            .in_room(self.room)
            .with_id(self.id);
        access_point.location = location;

        let measurements = Measurements {
            download_mbps: self.download_mbps,
            upload_mbps: self.upload_mbps,
            latency,
            connected_users: self.connected_users,
            signal_dbm: self.signal_dbm,
            packet_loss: self.packet_loss,
            bandwidth_usage: self.bandwidth_usage,
        };
        Ok(MetricRecord::new(access_point, measurements, captured_at))
    }

    fn location(&self) -> Result<Option<GeoPoint>, StoreError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude)
                .map(Some)
                .map_err(|err| self.corrupt(err.to_string())),
            (None, None) => Ok(None),
            _ => {
                warn!("access point {} has a partial location", self.name);
                Err(self.corrupt("only one coordinate is stored".to_owned()))
            }
        }
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::Corrupt {
            access_point: self.name.clone(),
            reason,
        }
    }
}

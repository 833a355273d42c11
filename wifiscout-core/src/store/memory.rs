//! In-process metric store used by tests, demos and the simulator.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use log::debug;

use crate::{AccessPoint, MetricRecord, StoreError};

use super::{MetricSink, MetricStore};

#[derive(Debug, Default)]
struct Inventory {
    access_points: BTreeMap<u64, AccessPoint>,
    ids_by_name: BTreeMap<String, u64>,
    /// Records in insertion order, each tagged with its access point id.
    records: Vec<(u64, MetricRecord)>,
}

impl Inventory {
    fn register(&mut self, access_point: &AccessPoint) -> u64 {
        if let Some(id) = self.ids_by_name.get(&access_point.name) {
            return *id;
        }
        let id = self
            .access_points
            .last_key_value()
            .map_or(1, |(last, _)| last.saturating_add(1));
        let stored = access_point.clone().with_id(id);
        self.ids_by_name.insert(stored.name.clone(), id);
        self.access_points.insert(id, stored);
        id
    }

    fn with_identity(&self, id: u64, record: &MetricRecord) -> MetricRecord {
        let access_point = self
            .access_points
            .get(&id)
            .cloned()
            .unwrap_or_else(|| record.access_point.clone());
        MetricRecord {
            access_point,
            ..record.clone()
        }
    }

    /// Latest record per access point. Later insertions win equal timestamps.
    fn latest(&self) -> BTreeMap<u64, &MetricRecord> {
        let mut latest: BTreeMap<u64, &MetricRecord> = BTreeMap::new();
        for (id, record) in &self.records {
            let newer = latest
                .get(id)
                .is_none_or(|current| record.captured_at >= current.captured_at);
            if newer {
                latest.insert(*id, record);
            }
        }
        latest
    }
}

/// Thread-safe, in-memory [`MetricStore`] and [`MetricSink`].
///
/// Identifiers are assigned sequentially from 1 on first sight of a name,
/// mirroring the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryMetricStore {
    inventory: RwLock<Inventory>,
}

impl MemoryMetricStore {
    /// Build a store pre-populated with `records`, inserted in order.
    ///
    /// # Errors
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned, which cannot
    /// happen for a freshly built store but keeps the signature honest.
    pub fn with_records<I>(records: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = MetricRecord>,
    {
        let store = Self::default();
        for record in records {
            store.record(&record)?;
        }
        Ok(store)
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Inventory>, StoreError> {
        self.inventory
            .read()
            .map_err(|_| StoreError::Poisoned { operation })
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Inventory>, StoreError> {
        self.inventory
            .write()
            .map_err(|_| StoreError::Poisoned { operation })
    }

    /// Latest record of every access point, located or not.
    ///
    /// # Errors
    /// Returns [`StoreError::Poisoned`] if a writer panicked.
    pub fn latest_metrics(&self) -> Result<Vec<MetricRecord>, StoreError> {
        let inventory = self.read("latest metrics")?;
        Ok(inventory
            .latest()
            .into_iter()
            .map(|(id, record)| inventory.with_identity(id, record))
            .collect())
    }

    /// Every record captured at or after `since`, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::Poisoned`] if a writer panicked.
    pub fn metrics_since(&self, since: DateTime<Utc>) -> Result<Vec<MetricRecord>, StoreError> {
        let inventory = self.read("metrics since")?;
        let mut records: Vec<MetricRecord> = inventory
            .records
            .iter()
            .filter(|(_, record)| record.captured_at >= since)
            .map(|(id, record)| inventory.with_identity(*id, record))
            .collect();
        records.sort_by_key(|record| record.captured_at);
        Ok(records)
    }
}

impl MetricStore for MemoryMetricStore {
    fn latest_located_metrics(&self) -> Result<Vec<MetricRecord>, StoreError> {
        let mut latest = self.latest_metrics()?;
        latest.retain(|record| record.access_point.location.is_some());
        debug!("memory store holds {} located access points", latest.len());
        Ok(latest)
    }

    fn latest_metrics_for(
        &self,
        access_point_id: u64,
    ) -> Result<Option<MetricRecord>, StoreError> {
        let inventory = self.read("latest metrics for access point")?;
        Ok(inventory
            .latest()
            .get(&access_point_id)
            .map(|record| inventory.with_identity(access_point_id, record)))
    }

    fn metric_history(
        &self,
        access_point_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        let inventory = self.read("metric history")?;
        let mut history: Vec<MetricRecord> = inventory
            .records
            .iter()
            .filter(|(id, record)| *id == access_point_id && record.captured_at >= since)
            .map(|(id, record)| inventory.with_identity(*id, record))
            .collect();
        history.sort_by_key(|record| record.captured_at);
        Ok(history)
    }
}

impl MetricSink for MemoryMetricStore {
    fn record(&self, record: &MetricRecord) -> Result<u64, StoreError> {
        let mut inventory = self.write("record metrics")?;
        let id = inventory.register(&record.access_point);
        inventory.records.push((id, record.clone()));
        Ok(id)
    }
}

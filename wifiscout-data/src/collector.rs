//! Simulated telemetry collection.
//!
//! [`SimulatedProbe`] produces plausible measurements from a seeded
//! `ChaCha8` generator so runs are reproducible. Two drivers use it:
//!
//! - [`run_rounds`] writes a fixed number of rounds synchronously with
//!   evenly spaced timestamps ending at a chosen instant.
//! - [`CollectionSession`] runs an open-ended loop on a background thread
//!   until stopped. The session handle owns the thread; dropping it stops
//!   collection.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wifiscout_core::{AccessPoint, Measurements, MetricRecord, MetricSink};

use crate::CollectorError;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Pause between consecutive access points in a live session.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Deterministic source of simulated measurements.
#[derive(Debug, Clone)]
pub struct SimulatedProbe {
    rng: ChaCha8Rng,
}

impl SimulatedProbe {
    /// Create a probe whose output is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw one set of measurements.
    pub fn measure(&mut self) -> Measurements {
        Measurements {
            download_mbps: Some(self.rng.gen_range(5.0..100.0)),
            upload_mbps: Some(self.rng.gen_range(1.0..50.0)),
            latency: Some(Duration::from_micros(self.rng.gen_range(5_000..250_000))),
            connected_users: Some(self.rng.gen_range(0..=60)),
            signal_dbm: Some(self.rng.gen_range(-90.0..=-30.0)),
            packet_loss: Some(self.rng.gen_range(0.0..5.0)),
            bandwidth_usage: Some(self.rng.gen_range(10.0..95.0)),
        }
    }

    fn snapshot(&mut self, access_point: &AccessPoint, captured_at: DateTime<Utc>) -> MetricRecord {
        MetricRecord::new(access_point.clone(), self.measure(), captured_at)
    }
}

/// Parameters for [`run_rounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundsOptions {
    /// Number of passes over the fleet.
    pub rounds: u64,
    /// Probe seed.
    pub seed: u64,
    /// Capture instant of the final record.
    pub end: DateTime<Utc>,
    /// Gap between consecutive records.
    pub step: TimeDelta,
}

/// Write `rounds` passes over `fleet` into `sink` and return the number of
/// records written.
///
/// Timestamps advance by `step` per record and the last record is captured
/// at `end`, so a run backfills history up to that instant.
///
/// # Errors
/// Returns [`CollectorError::Store`] on the first sink failure and
/// [`CollectorError::HistoryTooLong`] when the timestamps would overflow.
pub fn run_rounds<S>(
    sink: &S,
    fleet: &[AccessPoint],
    options: RoundsOptions,
) -> Result<u64, CollectorError>
where
    S: MetricSink + ?Sized,
{
    let per_round = u64::try_from(fleet.len()).unwrap_or(u64::MAX);
    let records = options.rounds.saturating_mul(per_round);
    let too_long = || CollectorError::HistoryTooLong { records };
    let span = i32::try_from(records.saturating_sub(1))
        .ok()
        .and_then(|gaps| options.step.checked_mul(gaps))
        .ok_or_else(too_long)?;
    let mut captured_at = options.end.checked_sub_signed(span).ok_or_else(too_long)?;

    let mut probe = SimulatedProbe::seeded(options.seed);
    let mut written = 0_u64;
    for _ in 0..options.rounds {
        for access_point in fleet {
            sink.record(&probe.snapshot(access_point, captured_at))?;
            written = written.saturating_add(1);
            captured_at = captured_at
                .checked_add_signed(options.step)
                .ok_or_else(too_long)?;
        }
    }
    debug!("simulated {written} records over {} rounds", options.rounds);
    Ok(written)
}

/// Parameters for a live [`CollectionSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Probe seed.
    pub seed: u64,
    /// Pause after each access point.
    pub interval: Duration,
    /// Stop on its own after this many rounds, if set.
    pub max_rounds: Option<u64>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            interval: DEFAULT_INTERVAL,
            max_rounds: None,
        }
    }
}

/// Handle to a running background collector.
///
/// Only one loop runs per handle. [`CollectionSession::stop`] signals the
/// loop, waits for it and reports how many records were written.
#[derive(Debug)]
pub struct CollectionSession {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<u64>>,
}

impl CollectionSession {
    /// Start collecting from `fleet` into `sink` on a new thread.
    ///
    /// Sink failures are logged and the loop moves on to the next access
    /// point.
    ///
    /// # Errors
    /// Returns [`CollectorError::Spawn`] when the thread cannot be created.
    pub fn start<S>(
        sink: Arc<S>,
        fleet: Vec<AccessPoint>,
        options: CollectorOptions,
    ) -> Result<Self, CollectorError>
    where
        S: MetricSink + ?Sized + 'static,
    {
        let (stop, stopped) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("wifiscout-collector".to_owned())
            .spawn(move || collect_until_stopped(sink.as_ref(), &fleet, options, &stopped))
            .map_err(CollectorError::Spawn)?;
        info!("collector started with seed {}", options.seed);
        Ok(Self {
            stop: Some(stop),
            worker: Some(worker),
        })
    }

    /// Report whether the background loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Stop the loop and return the number of records written.
    ///
    /// # Errors
    /// Returns [`CollectorError::Panicked`] if the collector thread panicked.
    pub fn stop(mut self) -> Result<u64, CollectorError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64, CollectorError> {
        // Dropping the sender disconnects the channel, which wakes the loop.
        self.stop.take();
        let Some(worker) = self.worker.take() else {
            return Ok(0);
        };
        let written = worker.join().map_err(|_| CollectorError::Panicked)?;
        info!("collector stopped after {written} records");
        Ok(written)
    }
}

impl Drop for CollectionSession {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!("collector shutdown failed: {err}");
        }
    }
}

fn collect_until_stopped<S>(
    sink: &S,
    fleet: &[AccessPoint],
    options: CollectorOptions,
    stopped: &mpsc::Receiver<()>,
) -> u64
where
    S: MetricSink + ?Sized,
{
    let mut probe = SimulatedProbe::seeded(options.seed);
    let mut written = 0_u64;
    let mut round = 0_u64;
    while options.max_rounds.is_none_or(|max| round < max) && !fleet.is_empty() {
        for access_point in fleet {
            match sink.record(&probe.snapshot(access_point, Utc::now())) {
                Ok(_) => written = written.saturating_add(1),
                Err(err) => warn!("failed to record metrics for {}: {err}", access_point.name),
            }
            match stopped.recv_timeout(options.interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return written,
            }
        }
        round = round.saturating_add(1);
    }
    written
}

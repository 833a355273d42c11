//! Query entry points: scoring, nearby search, current location,
//! recommendations and trends.

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use serde::Serialize;

use crate::error::{check_radius, check_window};
use crate::proximity::{confirm_current, nearby_candidates, resolve_current};
use crate::quality::{self, Assessment};
use crate::{Advice, AdvisorError, GeoPoint, MetricRecord, MetricStore, ScoredCandidate};

/// Default search radius for nearby access points, in meters.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 1000.0;
/// Default radius within which the user counts as being at an access point.
pub const DEFAULT_CURRENT_RADIUS_M: f64 = 50.0;
/// Default number of recommendations.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;

/// Tunables applied by [`Advisor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisorConfig {
    /// Radius used by [`Advisor::current_location`], in meters.
    pub current_radius_m: f64,
    /// Radius used by [`Advisor::find_nearby_default`] and
    /// [`Advisor::recommend_default`], in meters.
    pub search_radius_m: f64,
    /// Number of alternatives returned by [`Advisor::recommend_default`].
    pub recommendation_limit: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            current_radius_m: DEFAULT_CURRENT_RADIUS_M,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

/// Output of [`Advisor::recommend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    /// Position the query was made from.
    pub user_location: GeoPoint,
    /// Access point the user is currently at, if any.
    #[serde(rename = "current_ap")]
    pub current: Option<ScoredCandidate>,
    /// Best alternatives, excluding the current access point.
    pub recommendations: Vec<ScoredCandidate>,
    /// Nearby access points other than the current one, before truncation.
    #[serde(rename = "total_nearby_aps")]
    pub total_nearby: usize,
    /// Structured advice; rendered into `message`.
    #[serde(skip)]
    pub advice: Advice,
    /// Human-readable advice.
    pub message: String,
}

/// Recommendation engine over a [`MetricStore`].
///
/// Every operation recomputes from the store's latest metrics; nothing is
/// cached between calls.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use wifiscout_core::{
///     AccessPoint, Advisor, GeoPoint, Measurements, MemoryMetricStore, MetricRecord,
/// };
///
/// let here = GeoPoint::new(40.7128, -74.0060).expect("valid coordinates");
/// let store = MemoryMetricStore::with_records([MetricRecord::new(
///     AccessPoint::new("LOBBY_AP").at(here),
///     Measurements { download_mbps: Some(80.0), ..Measurements::default() },
///     Utc::now(),
/// )])
/// .expect("populate store");
///
/// let advisor = Advisor::new(store);
/// let result = advisor.recommend(40.7128, -74.0060, 1000.0, 5).expect("recommend");
/// assert_eq!(
///     result.current.map(|c| c.record.access_point.name),
///     Some("LOBBY_AP".to_owned())
/// );
/// assert!(result.recommendations.is_empty());
/// ```
#[derive(Debug)]
pub struct Advisor<S> {
    store: S,
    config: AdvisorConfig,
}

impl<S: MetricStore> Advisor<S> {
    /// Build an advisor with default tunables.
    pub fn new(store: S) -> Self {
        Self::with_config(store, AdvisorConfig::default())
    }

    /// Build an advisor with explicit tunables.
    pub const fn with_config(store: S, config: AdvisorConfig) -> Self {
        Self { store, config }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Tunables in effect.
    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Score one record's telemetry.
    #[must_use]
    pub fn compute_score(&self, record: &MetricRecord) -> Assessment {
        quality::assess(&record.measurements)
    }

    /// Access points within `radius_m` meters of the user, best first.
    ///
    /// # Errors
    /// Returns [`AdvisorError::InvalidInput`] for bad coordinates or radius
    /// and [`AdvisorError::Store`] when the snapshot cannot be read.
    pub fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Vec<ScoredCandidate>, AdvisorError> {
        let origin = GeoPoint::new(latitude, longitude)?;
        let radius = check_radius(radius_m)?;
        let snapshot = self.store.latest_located_metrics()?;
        Ok(nearby_candidates(&snapshot, &origin, radius))
    }

    /// Access points within the configured search radius, best first.
    ///
    /// # Errors
    /// See [`Advisor::find_nearby`].
    pub fn find_nearby_default(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ScoredCandidate>, AdvisorError> {
        self.find_nearby(latitude, longitude, self.config.search_radius_m)
    }

    /// The access point the user is at, using the configured radius.
    ///
    /// # Errors
    /// See [`Advisor::current_location_within`].
    pub fn current_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ScoredCandidate>, AdvisorError> {
        self.current_location_within(latitude, longitude, self.config.current_radius_m)
    }

    /// The access point the user is at, if the crude-nearest one lies within
    /// `radius_m` great-circle meters.
    ///
    /// # Errors
    /// Returns [`AdvisorError::InvalidInput`] for bad coordinates or radius
    /// and [`AdvisorError::Store`] when the store fails.
    pub fn current_location_within(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Option<ScoredCandidate>, AdvisorError> {
        let origin = GeoPoint::new(latitude, longitude)?;
        let radius = check_radius(radius_m)?;
        let nearest = self.store.closest_by_crude_distance(&origin)?;
        Ok(confirm_current(nearest, &origin, radius))
    }

    /// Recommend up to `limit` nearby alternatives with advice.
    ///
    /// The current location and the nearby list come from one snapshot of
    /// the store.
    ///
    /// # Errors
    /// Returns [`AdvisorError::InvalidInput`] for bad coordinates or radius
    /// and [`AdvisorError::Store`] when the snapshot cannot be read.
    pub fn recommend(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        limit: usize,
    ) -> Result<RecommendationResult, AdvisorError> {
        let origin = GeoPoint::new(latitude, longitude)?;
        let radius = check_radius(radius_m)?;
        let snapshot = self.store.latest_located_metrics()?;

        let current = resolve_current(&snapshot, &origin, self.config.current_radius_m);
        let mut recommendations = nearby_candidates(&snapshot, &origin, radius);
        if let Some(here) = &current {
            recommendations.retain(|candidate| !candidate.access_point().is_same(here.access_point()));
        }
        let total_nearby = recommendations.len();
        recommendations.truncate(limit);

        let advice = Advice::compose(current.as_ref(), &recommendations);
        debug!(
            "recommendation at ({latitude}, {longitude}): {} of {total_nearby} alternatives, current {}",
            recommendations.len(),
            current.as_ref().map_or("undetected", |c| c.access_point().name.as_str())
        );
        Ok(RecommendationResult {
            user_location: origin,
            current,
            recommendations,
            total_nearby,
            message: advice.to_string(),
            advice,
        })
    }

    /// [`Advisor::recommend`] with the configured search radius and limit.
    ///
    /// # Errors
    /// See [`Advisor::recommend`].
    pub fn recommend_default(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RecommendationResult, AdvisorError> {
        self.recommend(
            latitude,
            longitude,
            self.config.search_radius_m,
            self.config.recommendation_limit,
        )
    }

    /// One access point with its latest assessment, or `None` when the
    /// identifier is unknown.
    ///
    /// # Errors
    /// Returns [`AdvisorError::Store`] when the store fails.
    pub fn access_point(
        &self,
        access_point_id: u64,
    ) -> Result<Option<ScoredCandidate>, AdvisorError> {
        let latest = self.store.latest_metrics_for(access_point_id)?;
        Ok(latest.map(ScoredCandidate::assess))
    }

    /// Scored history of one access point over the trailing `window`.
    ///
    /// # Errors
    /// Returns [`AdvisorError::InvalidInput`] for a negative window and
    /// [`AdvisorError::Store`] when the history cannot be read.
    pub fn trend(
        &self,
        access_point_id: u64,
        window: TimeDelta,
    ) -> Result<Vec<ScoredCandidate>, AdvisorError> {
        let window = check_window(window)?;
        let since = Utc::now()
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.trend_since(access_point_id, since)
    }

    /// Scored history of one access point from `since` onwards, oldest first.
    ///
    /// # Errors
    /// Returns [`AdvisorError::Store`] when the history cannot be read.
    pub fn trend_since(
        &self,
        access_point_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>, AdvisorError> {
        let history = self.store.metric_history(access_point_id, since)?;
        Ok(history.into_iter().map(ScoredCandidate::assess).collect())
    }
}

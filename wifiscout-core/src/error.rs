//! Error types shared by the advisor and metric stores.

use std::error::Error as StdError;

use chrono::TimeDelta;
use thiserror::Error;

use crate::CoordinateError;

/// Rejected query parameters. Raised before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InputError {
    /// The user's coordinates were invalid.
    #[error(transparent)]
    Coordinates(#[from] CoordinateError),
    /// The search radius was negative or non-finite.
    #[error("radius {0} m must be a finite, non-negative distance")]
    Radius(f64),
    /// A trailing time window was negative.
    #[error("time window {0} must not be negative")]
    Window(TimeDelta),
}

/// Validate a search radius in meters.
pub(crate) fn check_radius(radius_m: f64) -> Result<f64, InputError> {
    if radius_m.is_finite() && radius_m >= 0.0 {
        Ok(radius_m)
    } else {
        Err(InputError::Radius(radius_m))
    }
}

/// Validate a trailing time window.
pub(crate) fn check_window(window: TimeDelta) -> Result<TimeDelta, InputError> {
    if window < TimeDelta::zero() {
        Err(InputError::Window(window))
    } else {
        Ok(window)
    }
}

/// Failure reported by a metric store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("metric store unavailable during {operation}: {source}")]
    Unavailable {
        /// Store operation that failed.
        operation: &'static str,
        /// Underlying driver error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A persisted row could not be decoded into a metric record.
    #[error("stored metrics for access point {access_point} are corrupt: {reason}")]
    Corrupt {
        /// Name of the affected access point.
        access_point: String,
        /// Description of the decoding failure.
        reason: String,
    },
    /// A previous panic poisoned the store's lock.
    #[error("metric store lock poisoned during {operation}")]
    Poisoned {
        /// Store operation that observed the poisoned lock.
        operation: &'static str,
    },
}

impl StoreError {
    /// Wrap a driver error raised by `operation`.
    pub fn unavailable<E>(operation: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Unavailable {
            operation,
            source: Box::new(source),
        }
    }

    /// Report whether repeating the call could succeed.
    ///
    /// Corrupt rows stay corrupt; everything else is transient from the
    /// engine's point of view.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Corrupt { .. })
    }
}

/// Errors returned by [`crate::Advisor`] operations.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Query parameters were rejected.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// The metric store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CoordinateError> for AdvisorError {
    fn from(error: CoordinateError) -> Self {
        Self::InvalidInput(InputError::Coordinates(error))
    }
}

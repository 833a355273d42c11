//! Congestion bands keyed on connected client counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How crowded an access point is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CongestionLevel {
    /// At most five clients.
    Low,
    /// Six to fifteen clients.
    Medium,
    /// Sixteen to thirty clients.
    High,
    /// More than thirty clients.
    Severe,
}

impl CongestionLevel {
    /// Band for `connected_users` clients.
    #[must_use]
    pub const fn classify(connected_users: u32) -> Self {
        match connected_users {
            0..=5 => Self::Low,
            6..=15 => Self::Medium,
            16..=30 => Self::High,
            _ => Self::Severe,
        }
    }

    /// Label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Severe => "Severe",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

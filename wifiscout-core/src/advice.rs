//! Natural-language advice derived from a recommendation.

use std::fmt;

use crate::quality::Status;
use crate::ScoredCandidate;

/// Where the user could move to, as quoted in advice.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceTarget {
    /// Access point name.
    pub name: String,
    /// Building housing the access point.
    pub building: String,
    /// Floor within the building.
    pub floor: i32,
    /// Download throughput in Mbps; absent values read as zero.
    pub download_mbps: f64,
}

impl From<&ScoredCandidate> for AdviceTarget {
    fn from(candidate: &ScoredCandidate) -> Self {
        let access_point = candidate.access_point();
        Self {
            name: access_point.name.clone(),
            building: access_point.building.clone(),
            floor: access_point.floor,
            download_mbps: candidate.record.measurements.download_mbps.unwrap_or(0.0),
        }
    }
}

/// Outcome of the recommendation decision table.
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    /// No access point was found at the user's position.
    Undetected,
    /// The current connection is poor and an alternative exists.
    PoorWithAlternative {
        /// Status of the current connection.
        status: Status,
        /// Best recommendation.
        target: AdviceTarget,
    },
    /// The current connection is poor and nothing else is nearby.
    PoorWithoutAlternative {
        /// Status of the current connection.
        status: Status,
    },
    /// A nearby access point scores higher than the current one.
    BetterNearby {
        /// Status of the current connection.
        status: Status,
        /// Best recommendation.
        target: AdviceTarget,
    },
    /// Nearby alternatives exist but none beats the current one.
    AmongBest {
        /// Status of the current connection.
        status: Status,
    },
    /// No alternatives exist for a medium connection.
    LikelyBest {
        /// Status of the current connection.
        status: Status,
    },
    /// The current connection is good or excellent.
    Satisfied {
        /// Status of the current connection.
        status: Status,
    },
}

impl Advice {
    /// Apply the decision table to the current candidate and the ranked
    /// recommendations.
    #[must_use]
    pub fn compose(current: Option<&ScoredCandidate>, recommendations: &[ScoredCandidate]) -> Self {
        let Some(current) = current else {
            return Self::Undetected;
        };
        let status = current.status;
        let best = recommendations.first();
        match (status, best) {
            (Status::Poor, Some(best)) => Self::PoorWithAlternative {
                status,
                target: AdviceTarget::from(best),
            },
            (Status::Poor, None) => Self::PoorWithoutAlternative { status },
            (Status::Medium, Some(best)) if best.quality_score > current.quality_score => {
                Self::BetterNearby {
                    status,
                    target: AdviceTarget::from(best),
                }
            }
            (Status::Medium, Some(_)) => Self::AmongBest { status },
            (Status::Medium, None) => Self::LikelyBest { status },
            (Status::Good | Status::Excellent, _) => Self::Satisfied { status },
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetected => f.write_str(
                "We couldn't detect your current access point. Here are the best options nearby.",
            ),
            Self::PoorWithAlternative { status, target } => write!(
                f,
                "Your current connection is {status}. Best nearby location: {} Floor {} ({}) with {:?} Mbps speed.",
                target.building, target.floor, target.name, target.download_mbps
            ),
            Self::PoorWithoutAlternative { status } => write!(
                f,
                "Your current connection is {status}. Unfortunately, no better options detected nearby."
            ),
            Self::BetterNearby { status, target } => write!(
                f,
                "Your current connection is {status}. You could get better performance at: {} Floor {} ({}).",
                target.building, target.floor, target.name
            ),
            Self::AmongBest { status } => write!(
                f,
                "Your current connection is {status}. Current location is among the best options."
            ),
            Self::LikelyBest { status } => write!(
                f,
                "Your current connection is {status}. Current location is likely the best option."
            ),
            Self::Satisfied { status } => write!(
                f,
                "Your current connection is {status}. Enjoy your fast connection!"
            ),
        }
    }
}

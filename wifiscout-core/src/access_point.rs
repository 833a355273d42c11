use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// A wireless radio endpoint identified by a unique name.
///
/// The numeric `id` is assigned by a metric store when the access point is
/// first recorded; freshly constructed values carry `None`. Access points
/// without a `location` are kept by stores but never take part in
/// geospatial queries.
///
/// # Examples
/// ```
/// use wifiscout_core::{AccessPoint, GeoPoint};
///
/// let location = GeoPoint::new(40.7120, -74.0080).expect("valid coordinates");
/// let ap = AccessPoint::new("LIBRARY_AP_01")
///     .in_building("Library", 1)
///     .in_room("Main Hall")
///     .at(location);
///
/// assert_eq!(ap.name, "LIBRARY_AP_01");
/// assert_eq!(ap.floor, 1);
/// assert!(ap.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: Option<u64>,
    /// Unique access point name.
    #[serde(rename = "ap_name")]
    pub name: String,
    /// Building housing the access point.
    #[serde(default)]
    pub building: String,
    /// Floor number within the building.
    #[serde(default)]
    pub floor: i32,
    /// Free-form room label.
    #[serde(default, rename = "room_number")]
    pub room: String,
    /// Position of the access point, when surveyed.
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl AccessPoint {
    /// Construct an unlocated access point with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            building: String::new(),
            floor: 0,
            room: String::new(),
            location: None,
        }
    }

    /// Set the building and floor, returning `self` for chaining.
    #[must_use]
    pub fn in_building(mut self, building: impl Into<String>, floor: i32) -> Self {
        self.building = building.into();
        self.floor = floor;
        self
    }

    /// Set the room label.
    #[must_use]
    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    /// Set the surveyed position.
    #[must_use]
    pub fn at(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Report whether `other` denotes the same access point.
    ///
    /// Identifiers decide when both sides carry one; otherwise the unique
    /// name does.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            _ => self.name == other.name,
        }
    }
}

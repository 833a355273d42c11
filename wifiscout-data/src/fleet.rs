//! The simulated campus: named access points with surveyed positions.

use wifiscout_core::{AccessPoint, GeoPoint};

use crate::CollectorError;

/// Static description of one surveyed access point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetEntry {
    /// Unique access point name.
    pub name: &'static str,
    /// Building housing the access point.
    pub building: &'static str,
    /// Floor number.
    pub floor: i32,
    /// Room label.
    pub room: &'static str,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

const fn entry(
    name: &'static str,
    building: &'static str,
    floor: i32,
    room: &'static str,
    latitude: f64,
    longitude: f64,
) -> FleetEntry {
    FleetEntry {
        name,
        building,
        floor,
        room,
        latitude,
        longitude,
    }
}

/// Access points of the demonstration campus.
pub const CAMPUS: &[FleetEntry] = &[
    entry("CENTRAL_BLOCK_01", "Central Block", 1, "Main Lobby", 40.7125, -74.0070),
    entry("CENTRAL_BLOCK_02", "Central Block", 2, "Meeting Room", 40.7126, -74.0071),
    entry("CENTRAL_BLOCK_03", "Central Block", 3, "Conference Hall", 40.7127, -74.0072),
    entry("ADMIN_BLOCK_01", "Administration Block 2", 1, "Reception", 40.7115, -74.0060),
    entry("ADMIN_BLOCK_02", "Administration Block 2", 2, "Office Wing", 40.7116, -74.0061),
    entry("FOOD_STREET_01", "Food Street", 1, "Main Area", 40.7140, -74.0090),
    entry("FOOD_STREET_02", "Food Street", 1, "North Side", 40.7141, -74.0089),
    entry("FOOD_STREET_03", "Food Street", 1, "South Side", 40.7139, -74.0091),
    entry("ROCK_PLAZA_01", "Rock Plaza", 1, "Main Plaza", 40.7150, -74.0075),
    entry("ROCK_PLAZA_02", "Rock Plaza", 1, "Event Space", 40.7151, -74.0076),
    entry("HOSTEL_MH1_01", "Hostel MH1", 1, "Common Area", 40.7090, -74.0080),
    entry("HOSTEL_MH1_02", "Hostel MH1", 2, "Study Lounge", 40.7091, -74.0081),
    entry("HOSTEL_MH2_01", "Hostel MH2", 1, "Common Area", 40.7095, -74.0080),
    entry("HOSTEL_MH3_01", "Hostel MH3", 1, "Common Area", 40.7100, -74.0080),
    entry("HOSTEL_MH4_01", "Hostel MH4", 1, "Common Area", 40.7105, -74.0080),
    entry("HOSTEL_MH5_01", "Hostel MH5", 1, "Common Area", 40.7110, -74.0080),
    entry("HOSTEL_MH6_01", "Hostel MH6", 1, "Common Area", 40.7115, -74.0080),
    entry("LH1_01", "Ladies Hostel 1", 1, "Common Area", 40.7130, -74.0060),
    entry("LH2_01", "Ladies Hostel 2", 1, "Common Area", 40.7135, -74.0060),
    entry("LH3_01", "Ladies Hostel 3", 1, "Common Area", 40.7140, -74.0060),
    entry("LH4_01", "Ladies Hostel 4", 1, "Common Area", 40.7145, -74.0060),
    entry("LIBRARY_AP_01", "Library", 1, "Main Hall", 40.7120, -74.0080),
    entry("LIBRARY_AP_02", "Library", 2, "Study Room", 40.7122, -74.0082),
    entry("ENGINEERING_AP_01", "Engineering", 1, "Lab A", 40.7130, -74.0070),
    entry("ENGINEERING_AP_02", "Engineering", 2, "Lab B", 40.7132, -74.0072),
    entry("CAFETERIA_AP_01", "Cafeteria", 1, "Main Area", 40.7140, -74.0090),
];

impl FleetEntry {
    /// Build the located access point this entry describes.
    ///
    /// # Errors
    /// Returns [`CollectorError::Fleet`] when the coordinates are invalid.
    pub fn access_point(&self) -> Result<AccessPoint, CollectorError> {
        let location = GeoPoint::new(self.latitude, self.longitude).map_err(|source| {
            CollectorError::Fleet {
                name: self.name,
                source,
            }
        })?;
        Ok(AccessPoint::new(self.name)
            .in_building(self.building, self.floor)
            .in_room(self.room)
            .at(location))
    }
}

/// Located access points for every entry of `entries`.
///
/// # Errors
/// Returns the first [`CollectorError::Fleet`] encountered.
pub fn build_fleet(entries: &[FleetEntry]) -> Result<Vec<AccessPoint>, CollectorError> {
    entries.iter().map(FleetEntry::access_point).collect()
}

/// The demonstration campus as located access points.
///
/// # Errors
/// Returns [`CollectorError::Fleet`] if a campus entry is invalid.
pub fn campus_fleet() -> Result<Vec<AccessPoint>, CollectorError> {
    build_fleet(CAMPUS)
}

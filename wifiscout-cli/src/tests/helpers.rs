//! Temporary workspaces and output capture for CLI tests.

use super::*;
use camino::Utf8PathBuf;
use serde_json::Value;
use tempfile::TempDir;

/// Lobby of the test campus.
pub(super) const LOBBY: (f64, f64) = (40.7128, -74.0060);

/// Three located access points: the lobby, a faster one about 100 m east
/// and a remote one far outside any default radius.
pub(super) const CAMPUS_PAYLOAD: &str = r#"[
    {"ap_name": "LOBBY_AP", "building": "Central Block", "floor": 1,
     "room_number": "Lobby", "latitude": 40.7128, "longitude": -74.0060,
     "download_speed": 12.0, "upload_speed": 4.0, "latency_ms": 180,
     "connected_users": 40, "signal_strength": -75.0},
    {"ap_name": "LIBRARY_AP", "building": "Library", "floor": 1,
     "room_number": "Main Hall", "latitude": 40.7128, "longitude": -74.0048,
     "download_speed": 90.0, "upload_speed": 45.0, "latency_ms": 12,
     "connected_users": 3, "signal_strength": -48.0},
    {"ap_name": "REMOTE_AP", "building": "Field Station", "floor": 0,
     "latitude": 41.0, "longitude": -73.0, "download_speed": 99.0}
]"#;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("data").join("wifi_data.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write payload");
        path
    }

    /// Workspace whose database already holds [`CAMPUS_PAYLOAD`].
    pub(super) fn with_campus() -> Self {
        let workspace = Self::new();
        let config = ingest::SubmitConfig {
            payload_path: workspace.write("campus.json", CAMPUS_PAYLOAD),
            database: workspace.database(),
        };
        capture(|writer| ingest::submit_with(&config, writer));
        workspace
    }
}

/// Run a command against an in-memory writer and decode its JSON output.
pub(super) fn capture(
    command: impl FnOnce(&mut dyn std::io::Write) -> Result<(), CliError>,
) -> Value {
    let mut buffer = Vec::new();
    command(&mut buffer).expect("command should succeed");
    serde_json::from_slice(&buffer).expect("command output should be JSON")
}

pub(super) fn names(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|entry| entry["ap_name"].as_str())
        .collect()
}

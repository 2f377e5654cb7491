//! Registry fixtures shared by the unit tests.
use crate::path_de;
use crate::registry::{Snapshot, SnapshotRegistry};

pub const SAMPLE_SNAPSHOT: &str = include_str!("../fixtures/vips-snapshot.json");

pub fn sample_registry() -> SnapshotRegistry {
    let snapshot: Snapshot = path_de::from_str_with_path(SAMPLE_SNAPSHOT).unwrap();
    SnapshotRegistry::from_snapshot(snapshot).unwrap()
}

pub fn registry_from(value: serde_json::Value) -> SnapshotRegistry {
    let snapshot: Snapshot = path_de::from_value_with_path(value).unwrap();
    SnapshotRegistry::from_snapshot(snapshot).unwrap()
}

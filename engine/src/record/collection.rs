use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The array-of-object fields of a record.
///
/// Each collection has a fixed zero-value template used when appending new
/// entries. `cameras` and `electrode_groups` carry an integer `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    DataAcqDevice,
    Cameras,
    Tasks,
    AssociatedFiles,
    AssociatedVideoFiles,
    BehavioralEvents,
    ElectrodeGroups,
    NtrodeElectrodeGroupChannelMap,
}

impl Collection {
    /// Record key for this collection
    pub fn key(self) -> &'static str {
        match self {
            Collection::DataAcqDevice => "data_acq_device",
            Collection::Cameras => "cameras",
            Collection::Tasks => "tasks",
            Collection::AssociatedFiles => "associated_files",
            Collection::AssociatedVideoFiles => "associated_video_files",
            Collection::BehavioralEvents => "behavioral_events",
            Collection::ElectrodeGroups => "electrode_groups",
            Collection::NtrodeElectrodeGroupChannelMap => "ntrode_electrode_group_channel_map",
        }
    }

    /// Parse from a record key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.key() == key)
    }

    /// All collections in form order
    pub fn all() -> [Self; 8] {
        [
            Collection::DataAcqDevice,
            Collection::Cameras,
            Collection::Tasks,
            Collection::AssociatedFiles,
            Collection::AssociatedVideoFiles,
            Collection::BehavioralEvents,
            Collection::ElectrodeGroups,
            Collection::NtrodeElectrodeGroupChannelMap,
        ]
    }

    /// Whether items carry an integer `id` assigned on append.
    pub fn has_id(self) -> bool {
        self.template().get("id").is_some()
    }

    /// Zero-value item appended by `append_items`.
    pub fn template(self) -> Value {
        match self {
            Collection::DataAcqDevice => json!({
                "name": "",
                "system": "",
                "amplifier": "",
                "adc_circuit": "",
            }),
            Collection::Cameras => json!({
                "id": 0,
                "meters_per_pixel": 0,
                "manufacturer": "",
                "model": "",
                "lens": "",
                "camera_name": "",
            }),
            Collection::Tasks => json!({
                "task_name": "",
                "task_description": "",
                "task_environment": "",
                "camera_id": [],
                "task_epochs": [],
            }),
            Collection::AssociatedFiles => json!({
                "name": "",
                "description": "",
                "path": "",
                "task_epochs": [],
            }),
            Collection::AssociatedVideoFiles => json!({
                "name": "",
                "camera_id": "",
            }),
            Collection::BehavioralEvents => json!({
                "description": "Din1",
                "name": "",
            }),
            Collection::ElectrodeGroups => json!({
                "id": 0,
                "location": "",
                "device_type": "",
                "description": "",
                "targeted_location": "",
                "targeted_x": "",
                "targeted_y": "",
                "targeted_z": "",
                "units": "mm",
            }),
            Collection::NtrodeElectrodeGroupChannelMap => json!({
                "ntrode_id": 1,
                "electrode_group_id": "",
                "bad_channels": [],
                "map": {},
            }),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

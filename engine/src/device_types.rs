//! Device-type lookup table.
//!
//! Maps a probe's device-type key to its shank count and the ordered channel
//! properties used to seed `ntrode_electrode_group_channel_map` entries.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, Result};

/// One channel slot of a shank: `title` is the channel index shown in the
/// map, `default` the hardware channel it maps to on shank 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelProperty {
    pub title: String,
    pub default: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub shank_count: usize,
    pub channels: Vec<ChannelProperty>,
}

impl DeviceType {
    /// Probe whose channel titles and defaults are `0..channels_per_shank`.
    pub fn uniform(shank_count: usize, channels_per_shank: usize) -> Self {
        let channels = (0..channels_per_shank)
            .map(|i| ChannelProperty {
                title: i.to_string(),
                default: i as i64,
            })
            .collect();
        Self {
            shank_count,
            channels,
        }
    }

    /// Channel map for one shank: each default is offset by
    /// `channels.len() * shank_index`.
    pub fn shank_map(&self, shank_index: usize) -> Map<String, Value> {
        let offset = (self.channels.len() * shank_index) as i64;
        self.channels
            .iter()
            .map(|channel| {
                let key = channel_key(&channel.title);
                (key, Value::from(channel.default + offset))
            })
            .collect()
    }
}

/// Map keys are the integer value of the title; non-numeric titles are
/// rejected when a table is loaded, so this only normalises spelling.
fn channel_key(title: &str) -> String {
    title
        .trim()
        .parse::<i64>()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| title.to_string())
}

/// Read-only device-type table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTypeCatalog {
    entries: BTreeMap<String, DeviceType>,
}

impl DeviceTypeCatalog {
    /// Probes shipped with the application.
    pub fn builtin() -> Self {
        let entries = [
            ("tetrode_12.5", DeviceType::uniform(1, 4)),
            ("A1x32-6mm-50-177-H32_21mm", DeviceType::uniform(1, 32)),
            ("128c-4s8mm6cm-20um-40um-sl", DeviceType::uniform(4, 32)),
            ("128c-4s6mm6cm-15um-26um-sl", DeviceType::uniform(4, 32)),
            ("32c-2s8mm6cm-20um-40um-dl", DeviceType::uniform(2, 16)),
            ("64c-4s6mm6cm-20um-40um-dl", DeviceType::uniform(4, 16)),
            ("NET-EBL-128ch-single-shank", DeviceType::uniform(1, 128)),
        ]
        .into_iter()
        .map(|(key, device)| (key.to_string(), device))
        .collect();
        Self { entries }
    }

    pub fn from_entries(entries: BTreeMap<String, DeviceType>) -> Result<Self> {
        for (key, device) in &entries {
            for channel in &device.channels {
                if channel.title.trim().parse::<i64>().is_err() {
                    return Err(EngineError::DeviceTypes(format!(
                        "device type `{key}` has non-numeric channel title `{}`",
                        channel.title
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// Parse a table from JSON or YAML text.
    pub fn from_text(text: &str) -> Result<Self> {
        let entries: BTreeMap<String, DeviceType> =
            serde_yaml::from_str(text).map_err(|e| EngineError::DeviceTypes(e.to_string()))?;
        Self::from_entries(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_text(&text)?;
        tracing::debug!(
            "Loaded {} device types from {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&DeviceType> {
        self.entries.get(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DeviceTypeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_shank_map_offsets_by_channel_count() {
        let device = DeviceType::uniform(2, 4);
        assert_eq!(
            Value::Object(device.shank_map(0)),
            json!({"0": 0, "1": 1, "2": 2, "3": 3})
        );
        assert_eq!(
            Value::Object(device.shank_map(1)),
            json!({"0": 4, "1": 5, "2": 6, "3": 7})
        );
    }

    #[test]
    fn test_builtin_contains_tetrode() {
        let catalog = DeviceTypeCatalog::builtin();
        let tetrode = catalog.get("tetrode_12.5").expect("tetrode present");
        assert_eq!(tetrode.shank_count, 1);
        assert_eq!(tetrode.channels.len(), 4);
        assert!(catalog.get("no-such-probe").is_none());
    }

    #[test]
    fn test_from_text_accepts_yaml() {
        let catalog = DeviceTypeCatalog::from_text(
            r#"
custom-probe:
  shank_count: 2
  channels:
    - { title: "0", default: 10 }
    - { title: "1", default: 11 }
"#,
        )
        .expect("valid table");
        let probe = catalog.get("custom-probe").expect("probe present");
        assert_eq!(probe.shank_count, 2);
        assert_eq!(
            Value::Object(probe.shank_map(1)),
            json!({"0": 12, "1": 13})
        );
    }

    #[test]
    fn test_from_text_rejects_non_numeric_titles() {
        let err = DeviceTypeCatalog::from_text(
            r#"{"bad": {"shank_count": 1, "channels": [{"title": "a", "default": 0}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::DeviceTypes(_)));
    }

    #[test]
    fn test_keys_are_sorted() {
        let catalog = DeviceTypeCatalog::builtin();
        let keys: Vec<_> = catalog.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}

//! Mutation engine
//!
//! Pure functions from `(&Record, intent arguments)` to a new `Record`. The
//! input is never modified; callers swap the returned value into their
//! state slot and then run [`crate::derived::recompute_derived_state`].
//!
//! Adapters decode widget events once into an [`Intent`] and hand it to
//! [`Intent::apply`]; the free functions stay public for direct use.
//!
//! Every operation that indexes into a collection fails fast with
//! `EngineError::InvariantViolation` when the index or container does not
//! exist.

mod channel_map;
mod collections;
mod fields;

pub use channel_map::{
    duplicate_electrode_group, remap_channels_for_device_type, set_channel_map_entry,
};
pub use collections::{append_items, duplicate_item, remove_last_item};
pub use fields::{set_scalar, toggle_set_membership};

pub(crate) use channel_map::{renumber_ntrodes, same_group_id};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device_types::DeviceTypeCatalog;
use crate::input::{InputKind, coerce_field_input};
use crate::error::{EngineError, Result};
use crate::record::{Collection, Record};

/// A single form edit, one variant per engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Intent {
    /// Set a top-level field, a field of a nested object (`key`), or a field
    /// of `key[index]`. With `input`, a string `value` is raw widget text
    /// and is coerced before it is stored.
    SetScalar {
        field: String,
        value: Value,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<InputKind>,
    },

    /// Add or remove `value` in the list at `key[index].field`.
    ToggleSetMembership {
        field: String,
        value: Value,
        key: String,
        index: usize,
        included: bool,
    },

    AppendItems {
        collection: Collection,
        #[serde(default = "default_count")]
        count: usize,
    },

    RemoveLastItem { collection: Collection },

    DuplicateItem { collection: Collection, index: usize },

    DuplicateElectrodeGroup { index: usize },

    /// Select a probe for an electrode group and regenerate its channel maps.
    RemapChannelsForDeviceType {
        electrode_group_index: usize,
        device_type: String,
    },

    /// Edit one channel of one shank's map.
    SetChannelMapEntry {
        electrode_group_id: i64,
        shank: usize,
        channel: String,
        value: i64,
    },
}

fn default_count() -> usize {
    1
}

impl Intent {
    /// Operation name used in logs and invariant errors
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetScalar { .. } => "set_scalar",
            Intent::ToggleSetMembership { .. } => "toggle_set_membership",
            Intent::AppendItems { .. } => "append_items",
            Intent::RemoveLastItem { .. } => "remove_last_item",
            Intent::DuplicateItem { .. } => "duplicate_item",
            Intent::DuplicateElectrodeGroup { .. } => "duplicate_electrode_group",
            Intent::RemapChannelsForDeviceType { .. } => "remap_channels_for_device_type",
            Intent::SetChannelMapEntry { .. } => "set_channel_map_entry",
        }
    }

    pub fn apply(&self, state: &Record, catalog: &DeviceTypeCatalog) -> Result<Record> {
        tracing::debug!(op = self.name(), "applying intent");
        match self {
            Intent::SetScalar {
                field,
                value,
                key,
                index,
                input,
            } => {
                let value = match (input, value) {
                    (Some(kind), Value::String(raw)) => coerce_field_input(raw, *kind),
                    _ => value.clone(),
                };
                set_scalar(state, field, value, key.as_deref(), *index)
            }
            Intent::ToggleSetMembership {
                field,
                value,
                key,
                index,
                included,
            } => toggle_set_membership(state, field, value.clone(), key, *index, *included),
            Intent::AppendItems { collection, count } => append_items(state, *collection, *count),
            Intent::RemoveLastItem { collection } => remove_last_item(state, *collection),
            Intent::DuplicateItem { collection, index } => {
                duplicate_item(state, *collection, *index)
            }
            Intent::DuplicateElectrodeGroup { index } => duplicate_electrode_group(state, *index),
            Intent::RemapChannelsForDeviceType {
                electrode_group_index,
                device_type,
            } => remap_channels_for_device_type(
                state,
                *electrode_group_index,
                device_type,
                catalog,
            ),
            Intent::SetChannelMapEntry {
                electrode_group_id,
                shank,
                channel,
                value,
            } => set_channel_map_entry(state, *electrode_group_id, *shank, channel, *value),
        }
    }
}

/// Integer view of a JSON number; integral floats count.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

/// Largest integer found under `field` across `items`.
pub(crate) fn max_integer_field(items: &[Value], field: &str) -> Option<i64> {
    items
        .iter()
        .filter_map(|item| item.get(field))
        .filter_map(as_integer)
        .max()
}

/// One more than the largest integer under `field`, or 0 when none is set.
pub(crate) fn next_integer(items: &[Value], field: &str, operation: &'static str) -> Result<i64> {
    match max_integer_field(items, field) {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| id_space_exhausted(operation, field)),
    }
}

pub(crate) fn id_space_exhausted(operation: &'static str, field: &str) -> EngineError {
    EngineError::invariant(operation, format!("`{field}` space exhausted"))
}

//! Electrode group / channel map coupling.
//!
//! Every `ntrode_electrode_group_channel_map` entry belongs to the electrode
//! group whose `id` equals its `electrode_group_id`, and `ntrode_id`s run
//! 1..N in insertion order across the whole collection.

use serde_json::{Map, Value};

use crate::device_types::DeviceTypeCatalog;
use crate::error::{EngineError, Result};
use crate::record::{Collection, Record};

use super::{as_integer, id_space_exhausted, max_integer_field, next_integer};

/// Duplicate `electrode_groups[index]` together with its channel maps.
///
/// The copy gets `max(id) + 1` and is inserted at `index + 1`; the cloned
/// channel maps are appended with the new group id and `ntrode_id`s
/// continuing from the current maximum.
pub fn duplicate_electrode_group(state: &Record, index: usize) -> Result<Record> {
    const OP: &str = "duplicate_electrode_group";
    let mut next = state.clone();

    let groups = next.items(Collection::ElectrodeGroups);
    let Some(Value::Object(source)) = groups.get(index) else {
        return Err(EngineError::invariant(
            OP,
            format!(
                "no electrode group at index {index} (len {})",
                groups.len()
            ),
        ));
    };
    let source_id = source.get("id").cloned().unwrap_or(Value::Null);
    let new_id = next_integer(groups, "id", OP)?;

    let mut copy = source.clone();
    copy.insert("id".to_string(), Value::from(new_id));

    let channel_map = next.items_mut(Collection::NtrodeElectrodeGroupChannelMap, OP)?;
    let mut last_ntrode = max_integer_field(channel_map, "ntrode_id").unwrap_or(0);
    let mut clones = Vec::new();
    for entry in channel_map
        .iter()
        .filter(|entry| same_group_id(entry.get("electrode_group_id"), &source_id))
    {
        last_ntrode = last_ntrode
            .checked_add(1)
            .ok_or_else(|| id_space_exhausted(OP, "ntrode_id"))?;
        let mut entry = entry.clone();
        if let Value::Object(object) = &mut entry {
            object.insert("electrode_group_id".to_string(), Value::from(new_id));
            object.insert("ntrode_id".to_string(), Value::from(last_ntrode));
        }
        clones.push(entry);
    }
    tracing::debug!(
        "duplicated electrode group {source_id} as {new_id} with {} channel map(s)",
        clones.len()
    );
    channel_map.extend(clones);

    next.items_mut(Collection::ElectrodeGroups, OP)?
        .insert(index + 1, Value::Object(copy));
    Ok(next)
}

/// Select a device type for `electrode_groups[group_index]` and regenerate
/// that group's channel maps: one entry per shank, shank *n* mapping each
/// channel to `default + channels * n`. `ntrode_id`s are renumbered across
/// the whole collection afterwards.
///
/// An unknown device type is recorded on the group and yields no shanks.
pub fn remap_channels_for_device_type(
    state: &Record,
    group_index: usize,
    device_type: &str,
    catalog: &DeviceTypeCatalog,
) -> Result<Record> {
    const OP: &str = "remap_channels_for_device_type";
    let mut next = state.clone();

    let groups = next.items_mut(Collection::ElectrodeGroups, OP)?;
    let len = groups.len();
    let Some(Value::Object(group)) = groups.get_mut(group_index) else {
        return Err(EngineError::invariant(
            OP,
            format!("no electrode group at index {group_index} (len {len})"),
        ));
    };
    group.insert(
        "device_type".to_string(),
        Value::String(device_type.to_string()),
    );
    let group_id = group.get("id").cloned().unwrap_or(Value::Null);

    let entries: Vec<Value> = match catalog.get(device_type) {
        Some(device) => (0..device.shank_count)
            .map(|shank| {
                let mut entry = channel_map_template();
                entry.insert("electrode_group_id".to_string(), group_id.clone());
                entry.insert("map".to_string(), Value::Object(device.shank_map(shank)));
                Value::Object(entry)
            })
            .collect(),
        None => {
            tracing::warn!("unknown device type `{device_type}`; electrode group {group_id} gets no channel maps");
            Vec::new()
        }
    };

    let channel_map = next.items_mut(Collection::NtrodeElectrodeGroupChannelMap, OP)?;
    channel_map.retain(|entry| !same_group_id(entry.get("electrode_group_id"), &group_id));
    channel_map.extend(entries);
    renumber_ntrodes(channel_map);

    Ok(next)
}

/// Point channel `channel` of the `shank`-th map owned by
/// `electrode_group_id` at hardware channel `value`.
pub fn set_channel_map_entry(
    state: &Record,
    electrode_group_id: i64,
    shank: usize,
    channel: &str,
    value: i64,
) -> Result<Record> {
    const OP: &str = "set_channel_map_entry";
    let mut next = state.clone();
    let group_id = Value::from(electrode_group_id);

    let channel_map = next.items_mut(Collection::NtrodeElectrodeGroupChannelMap, OP)?;
    let entry = channel_map
        .iter_mut()
        .filter(|entry| same_group_id(entry.get("electrode_group_id"), &group_id))
        .nth(shank)
        .ok_or_else(|| {
            EngineError::invariant(
                OP,
                format!("electrode group {electrode_group_id} has no shank {shank}"),
            )
        })?;

    let Value::Object(entry) = entry else {
        return Err(EngineError::invariant(OP, "channel map entry is not an object"));
    };
    let map = entry
        .entry("map".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(map) = map else {
        return Err(EngineError::invariant(OP, "channel map `map` is not an object"));
    };
    map.insert(channel.trim().to_string(), Value::from(value));

    Ok(next)
}

/// Reassign `ntrode_id` to 1..N in current order.
pub(crate) fn renumber_ntrodes(entries: &mut [Value]) {
    for (position, entry) in entries.iter_mut().enumerate() {
        if let Value::Object(object) = entry {
            object.insert("ntrode_id".to_string(), Value::from(position as i64 + 1));
        }
    }
}

/// Move every channel map owned by `from` over to `to`.
pub(crate) fn reassign_group_id(record: &mut Record, from: &Value, to: &Value) -> Result<()> {
    let Ok(channel_map) =
        record.items_mut(Collection::NtrodeElectrodeGroupChannelMap, "set_scalar")
    else {
        return Ok(());
    };
    for entry in channel_map.iter_mut() {
        if same_group_id(entry.get("electrode_group_id"), from)
            && let Value::Object(object) = entry
        {
            object.insert("electrode_group_id".to_string(), to.clone());
        }
    }
    Ok(())
}

/// Group ids compare as integers when both sides are numeric, otherwise by
/// exact value.
pub(crate) fn same_group_id(candidate: Option<&Value>, group_id: &Value) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    match (as_integer(candidate), as_integer(group_id)) {
        (Some(a), Some(b)) => a == b,
        _ => candidate == group_id,
    }
}

fn channel_map_template() -> Map<String, Value> {
    match Collection::NtrodeElectrodeGroupChannelMap.template() {
        Value::Object(object) => object,
        _ => Map::new(),
    }
}

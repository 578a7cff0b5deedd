use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::record::{Collection, Record};

use super::channel_map::{renumber_ntrodes, same_group_id};
use super::{id_space_exhausted, next_integer};

/// Append `count` copies of the collection's template. Id-bearing
/// collections number the new items from `max(id) + 1`, or from 0 when no
/// item has an id yet.
pub fn append_items(state: &Record, collection: Collection, count: usize) -> Result<Record> {
    const OP: &str = "append_items";
    let mut next = state.clone();
    let template = collection.template();
    let items = next.items_mut(collection, OP)?;

    let mut ids = if collection.has_id() && count > 0 {
        let first = next_integer(items, "id", OP)?;
        let last = i64::try_from(count - 1)
            .ok()
            .and_then(|extra| first.checked_add(extra))
            .ok_or_else(|| id_space_exhausted(OP, "id"))?;
        Some(first..=last)
    } else {
        None
    };

    for _ in 0..count {
        let mut item = template.clone();
        if let (Some(id), Value::Object(object)) = (ids.as_mut().and_then(Iterator::next), &mut item)
        {
            object.insert("id".to_string(), Value::from(id));
        }
        items.push(item);
    }

    tracing::debug!("appended {count} item(s) to {collection}");
    Ok(next)
}

/// Remove the last item. Removing an electrode group also drops the
/// channel-map entries it owned.
pub fn remove_last_item(state: &Record, collection: Collection) -> Result<Record> {
    const OP: &str = "remove_last_item";
    let mut next = state.clone();
    let removed = next
        .items_mut(collection, OP)?
        .pop()
        .ok_or_else(|| EngineError::invariant(OP, format!("`{collection}` is empty")))?;

    match collection {
        Collection::ElectrodeGroups => {
            let group_id = removed.get("id").cloned().unwrap_or(Value::Null);
            let channel_map = next.items_mut(Collection::NtrodeElectrodeGroupChannelMap, OP)?;
            let before = channel_map.len();
            channel_map.retain(|entry| !same_group_id(entry.get("electrode_group_id"), &group_id));
            renumber_ntrodes(channel_map);
            tracing::debug!(
                "removed electrode group {group_id} and {} channel map(s)",
                before - channel_map.len()
            );
        }
        Collection::NtrodeElectrodeGroupChannelMap => {
            renumber_ntrodes(next.items_mut(collection, OP)?);
        }
        _ => {}
    }

    Ok(next)
}

/// Deep-copy `collection[index]` and insert the copy at `index + 1`.
///
/// Any field whose trimmed name equals `id` ignoring ASCII case gets one
/// more than the largest integer under that same field name across the
/// collection.
pub fn duplicate_item(state: &Record, collection: Collection, index: usize) -> Result<Record> {
    const OP: &str = "duplicate_item";
    let mut next = state.clone();
    let items = next.items_mut(collection, OP)?;
    let len = items.len();

    let source = items.get(index).ok_or_else(|| {
        EngineError::invariant(
            OP,
            format!("index {index} out of range for `{collection}` (len {len})"),
        )
    })?;
    let Value::Object(mut copy) = source.clone() else {
        return Err(EngineError::invariant(
            OP,
            format!("`{collection}[{index}]` is not an object"),
        ));
    };

    let id_fields: Vec<String> = copy.keys().filter(|k| is_id_field(k)).cloned().collect();
    for field in id_fields {
        let next_id = next_integer(items, &field, OP)?;
        copy.insert(field, Value::from(next_id));
    }

    items.insert(index + 1, Value::Object(copy));
    Ok(next)
}

pub(crate) fn is_id_field(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("id")
}

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::{EngineError, Result};
use crate::record::{Collection, Record};

use super::channel_map::reassign_group_id;

/// Set a field on the record.
///
/// * no `key`: top-level field
/// * `key` without `index`: field of the nested object `record[key]`
/// * `key` and `index`: field of `record[key][index]`; an index equal to the
///   collection length appends an empty object first
///
/// Changing `electrode_groups[i].id` carries the group's channel-map entries
/// over to the new id.
pub fn set_scalar(
    state: &Record,
    field: &str,
    value: Value,
    key: Option<&str>,
    index: Option<usize>,
) -> Result<Record> {
    const OP: &str = "set_scalar";
    let mut next = state.clone();

    let Some(key) = key else {
        next.as_map_mut().insert(field.to_string(), value);
        return Ok(next);
    };

    let Some(index) = index else {
        match next.as_map_mut().get_mut(key) {
            Some(Value::Object(object)) => {
                object.insert(field.to_string(), value);
                return Ok(next);
            }
            Some(_) => return Err(EngineError::invariant(OP, format!("`{key}` is not an object"))),
            None => return Err(EngineError::invariant(OP, format!("record has no `{key}` object"))),
        }
    };

    let item = item_for_write(&mut next, key, index, OP)?;
    let previous = item.insert(field.to_string(), value.clone());

    if key == Collection::ElectrodeGroups.key()
        && field == "id"
        && let Some(previous) = previous
        && previous != value
    {
        reassign_group_id(&mut next, &previous, &value)?;
    }

    Ok(next)
}

/// Add `value` to (or remove it from) the list at `key[index].field`, then
/// dedupe and sort ascending. A missing list starts empty.
pub fn toggle_set_membership(
    state: &Record,
    field: &str,
    value: Value,
    key: &str,
    index: usize,
    included: bool,
) -> Result<Record> {
    const OP: &str = "toggle_set_membership";
    let mut next = state.clone();
    let item = item_for_write(&mut next, key, index, OP)?;

    let entry = item
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if entry.is_null() {
        *entry = Value::Array(Vec::new());
    }
    let Value::Array(members) = entry else {
        return Err(EngineError::invariant(
            OP,
            format!("`{key}[{index}].{field}` is not a list"),
        ));
    };

    if included {
        members.push(value);
    } else {
        members.retain(|member| compare_values(member, &value) != Ordering::Equal);
    }
    members.sort_by(compare_values);
    members.dedup_by(|a, b| compare_values(a, b) == Ordering::Equal);

    Ok(next)
}

/// Locate `record[key][index]` as a writable object. `index == len` appends
/// a fresh empty object; a `null` slot is replaced by one.
fn item_for_write<'a>(
    record: &'a mut Record,
    key: &str,
    index: usize,
    operation: &'static str,
) -> Result<&'a mut Map<String, Value>> {
    let items = match record.as_map_mut().get_mut(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(EngineError::invariant(
                operation,
                format!("`{key}` is not a collection"),
            ));
        }
        None => {
            return Err(EngineError::invariant(
                operation,
                format!("record has no `{key}` collection"),
            ));
        }
    };

    if index > items.len() {
        return Err(EngineError::invariant(
            operation,
            format!("index {index} out of range for `{key}` (len {})", items.len()),
        ));
    }
    if index == items.len() {
        items.push(Value::Object(Map::new()));
    }

    let slot = &mut items[index];
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(object) => Ok(object),
        _ => Err(EngineError::invariant(
            operation,
            format!("`{key}[{index}]` is not an object"),
        )),
    }
}

/// Ascending order for list members: numbers numerically, then strings
/// lexically, then anything else by its JSON text.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            _ => 2,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::try_from(value).expect("mapping")
    }

    #[test]
    fn test_set_top_level_field() {
        let state = Record::default_template();
        let next = set_scalar(&state, "lab", json!("Frank Lab"), None, None).unwrap();
        assert_eq!(next.get("lab"), Some(&json!("Frank Lab")));
        assert_eq!(state.get("lab"), Some(&json!("Loren Frank Lab")));
    }

    #[test]
    fn test_set_nested_object_field() {
        let state = Record::default_template();
        let next = set_scalar(&state, "sex", json!("F"), Some("subject"), None).unwrap();
        assert_eq!(next.get("subject").and_then(|s| s.get("sex")), Some(&json!("F")));
    }

    #[test]
    fn test_set_nested_on_missing_object_fails() {
        let state = record(json!({}));
        let err = set_scalar(&state, "sex", json!("F"), Some("subject"), None).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_set_item_field_creates_slot_at_end() {
        let state = record(json!({"cameras": []}));
        let next = set_scalar(&state, "lens", json!("wide"), Some("cameras"), Some(0)).unwrap();
        assert_eq!(next.get("cameras"), Some(&json!([{"lens": "wide"}])));
    }

    #[test]
    fn test_set_item_field_past_end_fails() {
        let state = record(json!({"cameras": []}));
        let err = set_scalar(&state, "lens", json!("wide"), Some("cameras"), Some(3)).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_changing_group_id_moves_channel_maps() {
        let state = record(json!({
            "electrode_groups": [{"id": 0}, {"id": 1}],
            "ntrode_electrode_group_channel_map": [
                {"ntrode_id": 1, "electrode_group_id": 0, "bad_channels": [], "map": {}},
                {"ntrode_id": 2, "electrode_group_id": 1, "bad_channels": [], "map": {}},
            ],
        }));
        let next = set_scalar(&state, "id", json!(9), Some("electrode_groups"), Some(0)).unwrap();
        let owners: Vec<_> = next
            .items(Collection::NtrodeElectrodeGroupChannelMap)
            .iter()
            .map(|e| e["electrode_group_id"].clone())
            .collect();
        assert_eq!(owners, vec![json!(9), json!(1)]);
    }

    #[test]
    fn test_toggle_adds_dedupes_and_sorts() {
        let state = record(json!({"tasks": [{"camera_id": [3, 1]}]}));
        let next = toggle_set_membership(&state, "camera_id", json!(2), "tasks", 0, true).unwrap();
        let next = toggle_set_membership(&next, "camera_id", json!(3), "tasks", 0, true).unwrap();
        assert_eq!(next.items(Collection::Tasks)[0]["camera_id"], json!([1, 2, 3]));
    }

    #[test]
    fn test_toggle_sorts_numerically() {
        let state = record(json!({"tasks": [{"camera_id": [9]}]}));
        let next = toggle_set_membership(&state, "camera_id", json!(10), "tasks", 0, true).unwrap();
        assert_eq!(next.items(Collection::Tasks)[0]["camera_id"], json!([9, 10]));
    }

    #[test]
    fn test_toggle_removes_member() {
        let state = record(json!({"tasks": [{"camera_id": [1, 2]}]}));
        let next = toggle_set_membership(&state, "camera_id", json!(1), "tasks", 0, false).unwrap();
        assert_eq!(next.items(Collection::Tasks)[0]["camera_id"], json!([2]));
    }

    #[test]
    fn test_toggle_creates_missing_list() {
        let state = record(json!({"tasks": [{}]}));
        let next =
            toggle_set_membership(&state, "task_epochs", json!(4), "tasks", 0, true).unwrap();
        assert_eq!(next.items(Collection::Tasks)[0]["task_epochs"], json!([4]));
    }

    #[test]
    fn test_toggle_on_scalar_field_fails() {
        let state = record(json!({"tasks": [{"task_name": "sleep"}]}));
        let err = toggle_set_membership(&state, "task_name", json!(1), "tasks", 0, true)
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_compare_values_orders_numbers_before_strings() {
        let mut values = vec![json!("b"), json!(2), json!("a"), json!(1.5)];
        values.sort_by(compare_values);
        assert_eq!(values, vec![json!(1.5), json!(2), json!("a"), json!("b")]);
    }
}

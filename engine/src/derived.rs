//! Derived state recomputed after every transition.
//!
//! The camera-id set and task-epoch set are never stored on their own; they
//! are read off the record. Recomputing also drops references that went
//! stale: associated-file epochs no task declares any more, and channel maps
//! whose electrode group is gone.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::mutation::{as_integer, renumber_ntrodes, same_group_id};
use crate::record::{Collection, Record};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    /// Integer ids of `cameras[]`
    pub camera_ids: BTreeSet<i64>,
    /// Union of `tasks[].task_epochs`
    pub task_epochs: BTreeSet<i64>,
}

impl DerivedState {
    pub fn from_record(record: &Record) -> Self {
        let camera_ids = record
            .items(Collection::Cameras)
            .iter()
            .filter_map(|camera| camera.get("id"))
            .filter_map(as_integer)
            .collect();
        let task_epochs = record
            .items(Collection::Tasks)
            .iter()
            .filter_map(|task| task.get("task_epochs"))
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(as_integer)
            .collect();
        Self {
            camera_ids,
            task_epochs,
        }
    }
}

/// Recompute derived sets and prune stale references.
pub fn recompute_derived_state(record: &Record) -> (Record, DerivedState) {
    let derived = DerivedState::from_record(record);
    let mut next = record.clone();

    if let Ok(files) = next.items_mut(Collection::AssociatedFiles, "recompute_derived_state") {
        for file in files.iter_mut() {
            if let Some(Value::Array(epochs)) = file.get_mut("task_epochs") {
                epochs.retain(|epoch| {
                    as_integer(epoch).is_some_and(|epoch| derived.task_epochs.contains(&epoch))
                });
            }
        }
    }

    let group_ids: Vec<Value> = next
        .items(Collection::ElectrodeGroups)
        .iter()
        .filter_map(|group| group.get("id").cloned())
        .collect();
    if let Ok(channel_map) = next.items_mut(
        Collection::NtrodeElectrodeGroupChannelMap,
        "recompute_derived_state",
    ) {
        let before = channel_map.len();
        channel_map.retain(|entry| {
            group_ids
                .iter()
                .any(|id| same_group_id(entry.get("electrode_group_id"), id))
        });
        if channel_map.len() != before {
            tracing::debug!(
                "pruned {} orphaned channel map(s)",
                before - channel_map.len()
            );
        }
        renumber_ntrodes(channel_map);
    }

    (next, derived)
}

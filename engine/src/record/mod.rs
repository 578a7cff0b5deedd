//! The metadata record and its templates.
//!
//! A `Record` is an insertion-ordered mapping from top-level field name to
//! value. Records are values: mutation functions take `&Record` and return a
//! new one, so no caller ever observes a half-applied change.

mod collection;
pub mod vocabulary;

pub use collection::Collection;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{EngineError, Result};

/// Root metadata record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Initial form state, also the target of a full reset.
    pub fn default_template() -> Self {
        Self::from_template(json!({
            "experimenter_name": [],
            "lab": "Loren Frank Lab",
            "institution": "University of California, San Francisco",
            "experiment_description": "",
            "session_description": "",
            "session_id": "",
            "keywords": [],
            "subject": {
                "description": "Long-Evans Rat",
                "genotype": "",
                "sex": "M",
                "species": "Rattus norvegicus",
                "subject_id": "",
                "date_of_birth": "",
                "weight": 100,
            },
            "data_acq_device": [],
            "cameras": [],
            "tasks": [],
            "associated_files": [],
            "associated_video_files": [],
            "units": {
                "analog": "",
                "behavioral_events": "",
            },
            "times_period_multiplier": 1.0,
            "raw_data_to_volts": 0.000000195,
            "default_header_file_path": "",
            "behavioral_events": [],
            "device": {
                "name": ["Trodes"],
            },
            "electrode_groups": [],
            "ntrode_electrode_group_channel_map": [],
        }))
    }

    /// All-blank record with the same keys as the default template. Partial
    /// recovery on import starts from this.
    pub fn empty() -> Self {
        Self::from_template(json!({
            "experimenter_name": [],
            "lab": "",
            "institution": "",
            "experiment_description": "",
            "session_description": "",
            "session_id": "",
            "keywords": [],
            "subject": {
                "description": "",
                "genotype": "",
                "sex": "",
                "species": "",
                "subject_id": "",
                "date_of_birth": "",
                "weight": 0,
            },
            "data_acq_device": [],
            "cameras": [],
            "tasks": [],
            "associated_files": [],
            "associated_video_files": [],
            "units": {
                "analog": "",
                "behavioral_events": "",
            },
            "times_period_multiplier": 0,
            "raw_data_to_volts": 0,
            "default_header_file_path": "",
            "behavioral_events": [],
            "device": {
                "name": [],
            },
            "electrode_groups": [],
            "ntrode_electrode_group_channel_map": [],
        }))
    }

    fn from_template(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Items of a collection; empty when the field is absent or not an array.
    pub fn items(&self, collection: Collection) -> &[Value] {
        self.0
            .get(collection.key())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mutable access to a collection's items. Fails if the field is absent
    /// or holds something other than an array.
    pub(crate) fn items_mut(
        &mut self,
        collection: Collection,
        operation: &'static str,
    ) -> Result<&mut Vec<Value>> {
        match self.0.get_mut(collection.key()) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(EngineError::invariant(
                operation,
                format!("`{collection}` is not an array"),
            )),
            None => Err(EngineError::invariant(
                operation,
                format!("record has no `{collection}` collection"),
            )),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for Record {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(EngineError::Parse(format!(
                "document root must be a mapping, found {}",
                kind_name(&other)
            ))),
        }
    }
}

/// Coarse shape of a value, used when salvaging imported fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Object,
    Array,
    Scalar,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            _ => ValueKind::Scalar,
        }
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

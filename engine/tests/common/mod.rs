#![allow(dead_code, clippy::expect_used)]

use nwbmeta_engine::{
    ChannelProperty, DeviceType, DeviceTypeCatalog, FormSession, Record, SchemaValidator,
    text_to_value,
};
use serde_json::Value;
use std::collections::BTreeMap;

pub const COMPLETE_SESSION: &str = include_str!("../fixtures/complete_session.yml");

pub fn complete_document() -> Value {
    text_to_value(COMPLETE_SESSION).expect("fixture parses")
}

pub fn complete_record() -> Record {
    Record::try_from(complete_document()).expect("fixture is a mapping")
}

pub fn validator() -> SchemaValidator {
    SchemaValidator::bundled().expect("bundled schema compiles")
}

pub fn session() -> FormSession {
    FormSession::new(validator(), DeviceTypeCatalog::builtin())
}

/// Builtin probes plus a 2-shank, 4-channel probe with defaults 10..13.
pub fn catalog_with_two_shank_probe() -> DeviceTypeCatalog {
    let mut entries: BTreeMap<String, DeviceType> = BTreeMap::new();
    entries.insert(
        "two_shank_quad".to_string(),
        DeviceType {
            shank_count: 2,
            channels: (0..4)
                .map(|i| ChannelProperty {
                    title: i.to_string(),
                    default: 10 + i,
                })
                .collect(),
        },
    );
    entries.insert("tetrode_12.5".to_string(), DeviceType::uniform(1, 4));
    DeviceTypeCatalog::from_entries(entries).expect("catalog is valid")
}

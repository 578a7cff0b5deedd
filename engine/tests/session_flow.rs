mod common;

use nwbmeta_engine::config::{ConfigLoader, EngineConfig};
use nwbmeta_engine::{
    Collection, DocumentStore, FileDocumentStore, FormSession, InMemoryDocumentStore, Intent,
    SubmitOutcome, text_to_record,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn import_edit_submit_save() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("beans_03.yml");
    std::fs::write(&input, common::COMPLETE_SESSION).expect("write fixture");

    let mut store = FileDocumentStore::new(dir.path().join("out")).with_input(&input);
    let mut session = common::session();

    let outcome = session.import_from(&store).expect("imports");
    assert!(outcome.accepted_wholesale);
    assert_eq!(session.derived().camera_ids.len(), 2);

    session
        .dispatch(&Intent::SetScalar {
            field: "session_id".to_string(),
            value: json!("beans_04"),
            key: None,
            index: None,
            input: None,
        })
        .expect("set session id");

    let SubmitOutcome::Generated(document) = session.submit().expect("submit runs") else {
        panic!("edited fixture should still validate");
    };
    assert_eq!(document.file_name, "metaData.yml");

    let location = store
        .save_document(&document.text, &document.file_name)
        .expect("saves");
    let written = std::fs::read_to_string(&location).expect("read back");
    let record = text_to_record(&written).expect("parses");
    assert_eq!(record.get("session_id"), Some(&json!("beans_04")));
}

#[test]
fn removing_a_task_prunes_associated_file_epochs() {
    let mut session = common::session();
    session
        .import_text(common::COMPLETE_SESSION)
        .expect("imports");

    // epoch 2 belongs to the last task
    session
        .dispatch(&Intent::RemoveLastItem {
            collection: Collection::Tasks,
        })
        .expect("remove task");

    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.items(Collection::AssociatedFiles)[0]["task_epochs"],
        json!([])
    );
    assert_eq!(
        session.derived().task_epochs.iter().copied().collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[test]
fn removing_an_electrode_group_drops_its_channel_maps() {
    let mut session = common::session();
    session
        .import_text(common::COMPLETE_SESSION)
        .expect("imports");
    session
        .dispatch(&Intent::RemoveLastItem {
            collection: Collection::ElectrodeGroups,
        })
        .expect("remove group");
    assert!(
        session
            .snapshot()
            .items(Collection::NtrodeElectrodeGroupChannelMap)
            .is_empty()
    );
}

#[test]
fn rejected_submit_reports_every_problem() {
    let mut session = common::session();
    let mut store = InMemoryDocumentStore::new().with_upload(
        common::COMPLETE_SESSION.replace("sex: M", "sex: m").replace("lab: Loren Frank Lab\n", ""),
    );
    let outcome = session.import_from(&store).expect("imports");
    assert_eq!(outcome.messages().len(), 2, "{:#?}", outcome.messages());

    let SubmitOutcome::Rejected(report) = session.submit().expect("submit runs") else {
        panic!("partially recovered record must not validate");
    };
    let implicated: Vec<_> = report.implicated_fields().into_iter().collect();
    assert!(implicated.contains(&"lab".to_string()));
    assert!(implicated.contains(&"subject".to_string()));
    assert!(store.saved().is_empty());

    // nothing was written, but the store still works for a later save
    store.save_document("lab: x\n", "metaData.yml").expect("saves");
    assert_eq!(store.saved().len(), 1);
}

#[test]
fn session_from_configured_file_name() {
    let config = EngineConfig {
        output: nwbmeta_engine::config::OutputConfig {
            directory: ".".into(),
            file_name: "beans.yml".to_string(),
        },
        ..EngineConfig::default()
    };
    let mut session = FormSession::from_config(&config).expect("session");
    session
        .import_text(common::COMPLETE_SESSION)
        .expect("imports");
    let SubmitOutcome::Generated(document) = session.submit().expect("submit runs") else {
        panic!("fixture validates");
    };
    assert_eq!(document.file_name, "beans.yml");
}

#[test]
fn missing_config_file_is_reported() {
    let err = ConfigLoader::new()
        .with_file("/nonexistent/nwbmeta.toml")
        .load()
        .expect_err("missing file");
    assert!(err.to_string().contains("/nonexistent/nwbmeta.toml"));
}

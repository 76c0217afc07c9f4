#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Start/end events around public operations

mod common;

use std::time::Instant;

use common::{at, kolab_person, kolab_tree, BASE};
use dirmap_core::dirmap_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use dirmap_core::errors::DirError;
use dirmap_core::logging_facility::test_capture::init_test_capture;
use dirmap_core::{log_op_end, log_op_error, log_op_start};
use dirmap_core::{ListParams, Server, ServerConfig, Variant};

#[test]
fn test_macros_emit_canonical_events() {
    let capture = init_test_capture();
    let op = "logging_macros_unique_1";

    let start = Instant::now();
    log_op_start!(op, path = "cn=a,dc=example,dc=com");
    log_op_end!(op, start, result_len = 2);
    log_op_error!(op, &DirError::query("bad"), start);

    let events = capture.events_for_op(op);
    let kinds: Vec<_> = events.iter().filter_map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![EVENT_START, EVENT_END, EVENT_END_ERROR]);
    assert_eq!(events[0].field("path"), Some("cn=a,dc=example,dc=com"));
    assert!(events[1].field("duration_ms").is_some());
    assert_eq!(events[1].field("result_len"), Some("2"));
    assert_eq!(events[2].field("err.code"), Some("ERR_QUERY"));
    assert!(events[2].field("duration_ms").is_some());
}

#[test]
fn test_error_events_name_the_failing_attribute() {
    let capture = init_test_capture();
    let op = "logging_macros_unique_6";

    let err = DirError::attribute("cyrus-userquota", "not an integer");
    log_op_error!(op, &err, Instant::now(), variant = "user");

    let events = capture.events_for_op(op);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("err.attribute"), Some("cyrus-userquota"));
    assert_eq!(events[0].field("err.code"), Some("ERR_ATTRIBUTE"));
    assert_eq!(events[0].field("variant"), Some("user"));
}

#[test]
fn test_failed_read_logs_error_with_code() {
    let capture = init_test_capture();
    let server = Server::new(ServerConfig::new(BASE), kolab_tree()).unwrap();
    let missing = at("cn=logging-missing-2");

    let err = server.read(&missing, None).unwrap_err();
    assert!(matches!(err, DirError::NotFound { .. }));

    let ours = |event: &str| {
        capture.count_events(|e| {
            e.op.as_deref() == Some("read")
                && e.event.as_deref() == Some(event)
                && e.field("path") == Some(missing.as_str())
        })
    };
    assert_eq!(ours(EVENT_START), 1);
    assert_eq!(ours(EVENT_END_ERROR), 1);
    assert_eq!(ours(EVENT_END), 0);

    let error = capture
        .events_for_op("read")
        .into_iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_END_ERROR) && e.field("path") == Some(missing.as_str())
        })
        .expect("error event");
    assert_eq!(error.field("err.code"), Some("ERR_NOT_FOUND"));
    assert_eq!(error.field("err.path"), Some(missing.as_str()));
    assert!(error.field("duration_ms").is_some());
}

#[test]
fn test_determine_type_is_bracketed() {
    let capture = init_test_capture();
    let mut tree = kolab_tree();
    let path = at("cn=Logan Logging3");
    tree.insert(&path, kolab_person("Logan", "Logging3"));
    let server = Server::new(ServerConfig::new(BASE), tree).unwrap();

    assert_eq!(server.determine_type(&path).unwrap(), Variant::User);

    let started = capture.count_events(|e| {
        e.op.as_deref() == Some("determine_type")
            && e.event.as_deref() == Some(EVENT_START)
            && e.field("path") == Some(path.as_str())
    });
    assert_eq!(started, 1);
    assert!(
        capture.count_events(|e| {
            e.op.as_deref() == Some("determine_type")
                && e.event.as_deref() == Some(EVENT_END)
                && e.field("variant") == Some("user")
        }) >= 1
    );
    // Nested lookups log under their own operation names
    assert!(capture.count_events(|e| {
        e.op.as_deref() == Some("read") && e.field("path") == Some(path.as_str())
    }) >= 2);
}

#[test]
fn test_rejected_save_logs_attribute_error() {
    let capture = init_test_capture();
    let mut tree = kolab_tree();
    let path = at("cn=Rita Readonly4");
    tree.insert(&path, kolab_person("Rita", "Readonly4"));
    let mut server = Server::new(ServerConfig::new(BASE), tree).unwrap();

    let mut rita = server.fetch(&path).unwrap();
    rita.set("modifytimestamp", ["20200101000000Z"]).unwrap();
    assert!(server.save(&mut rita).is_err());

    let error = capture
        .events_for_op("save")
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR) && e.field("path") == Some(path.as_str()))
        .expect("save error event");
    assert_eq!(error.field("err.code"), Some("ERR_ATTRIBUTE"));
}

#[test]
fn test_failed_listing_logs_variant() {
    let capture = init_test_capture();
    let server = Server::new(ServerConfig::new(BASE), kolab_tree()).unwrap();
    let params = ListParams {
        required_group: Some("cn=logging-nobody-5".to_string()),
        ..ListParams::default()
    };

    assert!(server.list_objects(Variant::DistList, &params).is_err());

    capture.assert_event_exists("list_objects", EVENT_END_ERROR);
    assert!(capture.count_events(|e| {
        e.op.as_deref() == Some("list_objects")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("variant") == Some("distlist")
    }) >= 1);
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Creating and modifying objects through the server

mod common;

use common::{at, changes, kolab_server, BASE};
use dirmap_core::resolver::{VariantDef, VariantRegistry};
use dirmap_core::transport::Modification;
use dirmap_core::{CreationInfo, DirError, DirectoryObject, RawMap, UserKind, Variant};
use proptest::prelude::*;
use std::rc::Rc;

#[test]
fn test_create_user_writes_a_complete_entry() {
    // GIVEN a new user described by its parts
    let mut server = kolab_server();
    let mut user = server
        .create_object(
            Variant::User,
            changes(&[("givenName", "Jo"), ("sn", "Doe"), ("mail", "jo@example.com")]),
            &CreationInfo::default(),
        )
        .unwrap();
    assert_eq!(user.path(), "cn=Jo Doe,dc=example,dc=com");
    assert!(!user.exists());

    // WHEN saving it
    server.save(&mut user).unwrap();

    // THEN the store holds the composed name, classes and defaults
    let stored = server.transport().get(user.path()).unwrap();
    assert_eq!(stored.first("cn"), Some("Jo Doe"));
    assert_eq!(stored.first("kolabinvitationpolicy"), Some("ACT_MANUAL"));
    assert!(stored.object_classes().contains(&"kolabinetorgperson".to_string()));
    assert!(user.exists());
    assert!(user.changes().is_empty());

    // AND the new entry resolves to what was created
    assert_eq!(server.determine_type(user.path()).unwrap(), Variant::User);
}

#[test]
fn test_create_internal_user_lands_in_the_internal_container() {
    let mut server = kolab_server();
    let info = CreationInfo {
        kind: Some(UserKind::Internal),
        visible: None,
    };
    let mut user = server
        .create_object(
            Variant::User,
            changes(&[("givenName", "Ina"), ("sn", "Ternal")]),
            &info,
        )
        .unwrap();
    server.save(&mut user).unwrap();

    assert_eq!(user.path(), format!("cn=Ina Ternal,cn=internal,{}", BASE));
    assert!(server.transport().get(&at("cn=Ina Ternal,cn=internal")).is_some());
}

fn person_def() -> Rc<VariantDef> {
    VariantRegistry::standard().get(Variant::Person).unwrap()
}

#[test]
fn test_saving_a_new_object_twice_fails_in_the_store() {
    let mut server = kolab_server();
    let fresh = || {
        DirectoryObject::create(
            person_def(),
            at("cn=Twice Saved"),
            changes(&[("cn", "Twice Saved"), ("sn", "Saved")]),
        )
    };
    let mut first = fresh();
    server.save(&mut first).unwrap();

    let mut second = fresh();
    let err = server.save(&mut second).unwrap_err();
    assert!(matches!(err, DirError::Transport { .. }));
    assert!(!second.exists());
}

#[test]
fn test_modify_replaces_and_deletes() {
    // GIVEN Frank with a uid and no phone number
    let mut server = kolab_server();
    let mut frank = server.fetch(&at("cn=Frank Mustermann")).unwrap();

    // WHEN adding a phone number and clearing the uid
    frank.set("telephonenumber", ["+49 123"]).unwrap();
    frank.clear("uid").unwrap();
    server.save(&mut frank).unwrap();

    // THEN the store and the cached entry agree
    let stored = server.transport().get(frank.path()).unwrap();
    assert_eq!(stored.first("telephonenumber"), Some("+49 123"));
    assert!(!stored.contains("uid"));
    assert!(!frank.entry().contains("uid"));
    assert_eq!(frank.entry().first("telephonenumber"), Some("+49 123"));
}

#[test]
fn test_changing_a_name_part_recomposes_the_full_name() {
    let mut server = kolab_server();
    let mut frank = server.fetch(&at("cn=Frank Mustermann")).unwrap();

    frank.set("givenname", ["Franz"]).unwrap();
    server.save(&mut frank).unwrap();

    let stored = server.transport().get(frank.path()).unwrap();
    assert_eq!(stored.first("cn"), Some("Franz Mustermann"));
    assert_eq!(stored.first("givenname"), Some("Franz"));
}

#[test]
fn test_read_only_write_is_rejected_before_the_store() {
    let mut server = kolab_server();
    let mut frank = server.fetch(&at("cn=Frank Mustermann")).unwrap();

    frank.set("createtimestamp", ["20200101000000Z"]).unwrap();
    let err = server.save(&mut frank).unwrap_err();

    assert!(matches!(err, DirError::Attribute { ref attribute, .. } if attribute == "createtimestamp"));
    let stored = server.transport().get(frank.path()).unwrap();
    assert_eq!(stored.first("createtimestamp"), Some("20090301123000Z"));
}

#[test]
fn test_non_integer_quota_is_rejected() {
    let mut server = kolab_server();
    let mut frank = server.fetch(&at("cn=Frank Mustermann")).unwrap();

    frank.set("cyrus-userquota", ["plenty"]).unwrap();
    let err = server.save(&mut frank).unwrap_err();
    assert!(matches!(err, DirError::Attribute { .. }));
}

#[test]
fn test_unsupported_leftover_is_rejected() {
    let mut server = kolab_server();
    let mut obj = server
        .create_object(
            Variant::Person,
            changes(&[("cn", "Odd One"), ("sn", "One"), ("favouriteColour", "blue")]),
            &CreationInfo::default(),
        )
        .unwrap();

    let err = server.save(&mut obj).unwrap_err();
    assert!(matches!(err, DirError::Attribute { ref attribute, .. } if attribute == "favouritecolour"));
    assert!(server.transport().get(obj.path()).is_none());
}

#[test]
fn test_missing_required_attribute_is_rejected() {
    let mut server = kolab_server();
    let mut obj = DirectoryObject::create(
        person_def(),
        at("cn=No Surname"),
        changes(&[("cn", "No Surname")]),
    );

    let err = server.save(&mut obj).unwrap_err();
    assert!(matches!(err, DirError::Attribute { ref attribute, .. } if attribute == "sn"));
}

#[test]
fn test_no_identifier_means_no_object() {
    let server = kolab_server();
    let err = server
        .create_object(Variant::Person, changes(&[("sn", "Nobody")]), &CreationInfo::default())
        .unwrap_err();
    assert!(matches!(err, DirError::Attribute { ref attribute, .. } if attribute == "cn"));
}

#[test]
fn test_transport_failure_passes_through() {
    let mut server = kolab_server();
    let mut frank = server.fetch(&at("cn=Frank Mustermann")).unwrap();
    frank.set("telephonenumber", ["1"]).unwrap();

    server
        .transport_mut()
        .set_failure(Some("LDAP_SERVER_DOWN: Can't contact LDAP server"));
    let err = server.save(&mut frank).unwrap_err();

    assert_eq!(
        err,
        DirError::transport("LDAP_SERVER_DOWN: Can't contact LDAP server")
    );
    assert!(!frank.changes().is_empty());
}

#[test]
fn test_saving_nothing_is_a_no_op() {
    let mut server = kolab_server();
    let mut frank = server.fetch(&at("cn=Frank Mustermann")).unwrap();
    server.transport_mut().set_failure(Some("offline"));

    // No changes, so the store is never contacted
    server.save(&mut frank).unwrap();
}

fn raw_changes() -> impl Strategy<Value = RawMap> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        prop::collection::vec(prop_oneof![Just(String::new()), "[a-z]{1,4}"], 0..3),
        0..8,
    )
    .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_modify_split_partitions_the_fields(raw in raw_changes()) {
        let modification = Modification::from_changes(raw.clone());

        prop_assert_eq!(modification.delete.len() + modification.replace.len(), raw.len());
        for name in &modification.delete {
            prop_assert!(!modification.replace.contains_key(name));
            prop_assert!(raw[name].iter().all(String::is_empty));
        }
        for (name, values) in &modification.replace {
            prop_assert!(values.iter().any(|v| !v.is_empty()));
            prop_assert_eq!(values, &raw[name]);
        }
    }
}

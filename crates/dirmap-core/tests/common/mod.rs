use dirmap_core::config::StructureKind;
use dirmap_core::model::RawMap;
use dirmap_core::{MemoryTransport, RawEntry, Server, ServerConfig};

pub const BASE: &str = "dc=example,dc=com";

const KOLAB_PERSON: [&str; 5] = [
    "top",
    "person",
    "organizationalPerson",
    "inetOrgPerson",
    "kolabInetOrgPerson",
];

/// Full path below the test base
#[allow(dead_code)]
pub fn at(relative: &str) -> String {
    format!("{},{}", relative, BASE)
}

/// A Kolab person entry with the given names
#[allow(dead_code)]
pub fn kolab_person(given: &str, surname: &str) -> RawEntry {
    RawEntry::new()
        .with("objectClass", KOLAB_PERSON)
        .with("cn", [format!("{} {}", given, surname)])
        .with("givenName", [given])
        .with("sn", [surname])
        .with(
            "mail",
            [format!("{}@example.com", given.to_lowercase())],
        )
}

fn group(members: &[String]) -> RawEntry {
    RawEntry::new()
        .with("objectClass", ["top", "kolabGroupOfNames"])
        .with("member", members.iter().cloned())
}

/// A small Kolab tree:
/// - users Frank Mustermann, Gunnar Wrobel
/// - administrator Ada Admin, maintainer Max Maintainer, domain maintainer Dora Domain
/// - external address Jane Doe
/// - distribution list `staff`, plain group `team`
/// - Kolab server, shared folder, POP3 account, organizational person
#[allow(dead_code)]
pub fn kolab_tree() -> MemoryTransport {
    let mut t = MemoryTransport::new();
    t.insert(BASE, RawEntry::new().with("objectClass", ["top", "domain"]));
    for container in ["cn=internal", "cn=external", "cn=groups", "cn=resources"] {
        t.insert(
            &at(container),
            RawEntry::new().with("objectClass", ["top", "kolabNamedObject"]),
        );
    }

    t.insert(
        &at("cn=Frank Mustermann"),
        kolab_person("Frank", "Mustermann")
            .with("uid", ["frank"])
            .with("cyrus-userquota", ["100"])
            .with("createTimestamp", ["20090301123000Z"]),
    );
    t.insert(&at("cn=Gunnar Wrobel"), kolab_person("Gunnar", "Wrobel"));
    t.insert(&at("cn=Ada Admin"), kolab_person("Ada", "Admin"));
    t.insert(&at("cn=Max Maintainer"), kolab_person("Max", "Maintainer"));
    t.insert(&at("cn=Dora Domain"), kolab_person("Dora", "Domain"));
    t.insert(&at("cn=Jane Doe,cn=external"), kolab_person("Jane", "Doe"));

    t.insert(&at("cn=admin,cn=internal"), group(&[at("cn=Ada Admin")]));
    t.insert(
        &at("cn=maintainer,cn=internal"),
        group(&[at("cn=Max Maintainer")]),
    );
    t.insert(
        &at("cn=domain-maintainer,cn=internal"),
        group(&[at("cn=Dora Domain")]),
    );
    t.insert(
        &at("cn=staff"),
        group(&[at("cn=Frank Mustermann"), at("cn=Gunnar Wrobel")])
            .with("cn", ["staff"])
            .with("mail", ["staff@example.com"]),
    );
    t.insert(
        &at("cn=team"),
        group(&[at("cn=Frank Mustermann")]).with("cn", ["team"]),
    );

    t.insert(
        &at("k=kolab"),
        RawEntry::new()
            .with("objectClass", ["top", "kolab"])
            .with("k", ["kolab"]),
    );
    t.insert(
        &at("cn=shared"),
        RawEntry::new()
            .with("objectClass", ["top", "kolabSharedFolder"])
            .with("cn", ["shared"]),
    );
    t.insert(
        &at("mail=pop@example.org"),
        RawEntry::new()
            .with("objectClass", ["top", "kolabExternalPop3Account"])
            .with("mail", ["pop@example.org"]),
    );
    t.insert(
        &at("cn=Olga Org"),
        RawEntry::new()
            .with("objectClass", ["top", "person", "organizationalPerson"])
            .with("cn", ["Olga Org"])
            .with("sn", ["Org"]),
    );
    t.insert(
        &at("cn=stray"),
        RawEntry::new().with("objectClass", ["dcObject"]),
    );
    t
}

#[allow(dead_code)]
pub fn kolab_server() -> Server<MemoryTransport> {
    Server::new(ServerConfig::new(BASE), kolab_tree()).unwrap()
}

#[allow(dead_code)]
pub fn ldap_server() -> Server<MemoryTransport> {
    let config = ServerConfig::new(BASE).with_structure(StructureKind::Ldap);
    Server::new(config, kolab_tree()).unwrap()
}

/// Change map from name/value pairs
#[allow(dead_code)]
pub fn changes(pairs: &[(&str, &str)]) -> RawMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
        .collect()
}

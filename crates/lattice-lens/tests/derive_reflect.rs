//! Integration tests for the #[derive(Reflect)] macro.

use lattice_lens::Reflect;
use lattice_lens::reflect::{
    count_visible_fields, field_at, field_name_at, record_field, FieldTag, Record, Shape,
    ValueRef,
};

#[derive(Reflect)]
struct Timestamps {
    created: i64,
    updated: i64,
}

#[derive(Reflect)]
struct Owner {
    login: String,
}

// Exercises every attribute form
#[derive(Reflect)]
struct Repository {
    #[lens(rename = "Name")]
    name: String,

    #[lens(skip)]
    #[allow(dead_code)]
    token: std::time::Duration,

    #[lens(flatten)]
    times: Timestamps,

    #[lens(flatten)]
    owner: Option<Box<Owner>>,

    #[lens(tag = "stars,omitempty")]
    star_count: u32,

    // Embedded but renamed: stays a single nested field
    #[lens(flatten, rename = "Meta")]
    meta: Owner,
}

fn repository(owner: Option<&str>) -> Repository {
    Repository {
        name: "lens".into(),
        token: std::time::Duration::from_secs(60),
        times: Timestamps {
            created: 1,
            updated: 2,
        },
        owner: owner.map(|login| Box::new(Owner { login: login.into() })),
        star_count: 7,
        meta: Owner {
            login: "meta".into(),
        },
    }
}

fn record_info() -> &'static lattice_lens::reflect::RecordInfo {
    match <Repository as lattice_lens::reflect::Reflect>::shape() {
        Shape::Record(info) => info,
        other => panic!("expected a record shape, got {other:?}"),
    }
}

#[test]
fn test_record_info() {
    let info = record_info();
    assert_eq!(info.type_name, "Repository");
    assert_eq!(info.fields.len(), 6);

    let token = &info.fields[1];
    assert_eq!(token.name, "token");
    assert!(FieldTag::parse(token.tag).is_excluded());

    let times = &info.fields[2];
    assert!(times.embedded);
    assert!(FieldTag::parse(times.tag).is_empty());

    let stars = FieldTag::parse(info.fields[4].tag);
    assert_eq!(stars.rename(), Some("stars"));
    assert_eq!(stars.options().collect::<Vec<_>>(), vec!["omitempty"]);
}

#[test]
fn test_visible_fields() {
    let info = record_info();
    assert_eq!(count_visible_fields(info), 6);

    let names: Vec<_> = (0..7).map(|i| field_name_at(info, i)).collect();
    assert_eq!(
        names,
        vec![
            Some("Name"),
            Some("created"),
            Some("updated"),
            Some("login"),
            Some("stars"),
            Some("Meta"),
            None,
        ]
    );
}

#[test]
fn test_values_through_flattening() {
    let repo = repository(Some("octocat"));
    let ValueRef::Record(record) = lattice_lens::reflect::Reflect::reflect(&repo) else {
        panic!("expected a record value");
    };

    let updated = record_field(record, 2).expect("updated");
    assert_eq!(updated.name, "updated");
    assert!(matches!(updated.value, ValueRef::Int(2)));

    let login = record_field(record, 3).expect("login");
    assert!(matches!(login.value, ValueRef::Str("octocat")));

    let stars = record_field(record, 4).expect("stars");
    assert!(matches!(stars.value, ValueRef::Uint(7)));

    let meta = record_field(record, 5).expect("meta");
    assert!(matches!(meta.value, ValueRef::Record(_)));
}

#[test]
fn test_absent_embedded_record_keeps_ordinals() {
    let repo = repository(None);
    let ValueRef::Record(record) = lattice_lens::reflect::Reflect::reflect(&repo) else {
        panic!("expected a record value");
    };

    // The missing owner still occupies its column.
    assert!(field_at(record.record_info(), Some(record), 3).found().is_none());
    let stars = record_field(record, 4).expect("stars");
    assert_eq!(stars.name, "stars");
}

#[test]
fn test_field_access_by_declaration_index() {
    let repo = repository(None);
    assert!(Record::field(&repo, 0).is_some());
    // Skipped fields have no accessor.
    assert!(Record::field(&repo, 1).is_none());
    assert!(Record::field(&repo, 6).is_none());
}

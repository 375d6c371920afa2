#![allow(non_snake_case)]

use super::*;
use crate::fixtures::{Inner, Node, Profile, User};
use serde_json::json;

#[test]
fn TypeDescriptor___record___carries_declaration() {
    let descriptor = <User as Schema>::descriptor();

    assert_eq!(descriptor.type_id, TypeId::of::<User>());
    assert_eq!(descriptor.type_name, "User");
    assert!(!descriptor.is_message());
    match descriptor.kind {
        TypeKind::Record(decl) => {
            let idents: Vec<_> = decl.fields.iter().map(|f| f.ident).collect();
            assert_eq!(idents, vec!["id", "name", "profile"]);
        }
        TypeKind::Message => panic!("expected a record"),
    }
}

#[test]
fn TypeDescriptor___message___is_message() {
    let descriptor = <Profile as Schema>::descriptor();

    assert!(descriptor.is_message());
    assert_eq!(descriptor.type_id, TypeId::of::<Profile>());
}

#[test]
fn FieldDecl___builders___set_attributes() {
    let decl = FieldDecl::value("id")
        .renamed("ID")
        .tagged("ident,omitempty")
        .optional();

    assert_eq!(decl.ident, "id");
    assert_eq!(decl.rename, Some("ID"));
    assert_eq!(decl.tag, Some("ident,omitempty"));
    assert!(decl.optional);
    assert!(matches!(decl.shape, FieldShape::Value));
}

#[test]
fn FieldDecl___nested_through_option_box___describes_inner_record() {
    let decl = FieldDecl::nested::<Option<Box<Node>>>("next");

    let FieldShape::Record(describe) = decl.shape else {
        panic!("expected a record shape");
    };
    assert_eq!(describe().type_id, TypeId::of::<Node>());
}

#[test]
fn ValueField___set_json_value___replaces_contents() {
    let mut tags: Vec<String> = vec!["old".into()];

    tags.set_json_value(json!(["a", "b"])).unwrap();

    assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(tags.to_json_value().unwrap(), json!(["a", "b"]));
}

#[test]
fn ValueField___set_json_value_wrong_type___fails_without_write() {
    let mut count: u32 = 7;

    let result = count.set_json_value(json!("seven"));

    assert!(result.is_err());
    assert_eq!(count, 7);
}

#[test]
fn RecordField___unset_option___reports_none() {
    let slot: Option<Inner> = None;

    assert!(slot.record().is_none());
}

#[test]
fn RecordField___record_mut_on_unset_option___allocates_default() {
    let mut slot: Option<Inner> = None;

    let record = slot.record_mut();
    assert!(record.field("opaque").is_some());

    assert_eq!(slot, Some(Inner::default()));
}

#[test]
fn Record___unknown_field___returns_none() {
    let user = User::default();

    assert!(user.field("missing").is_none());
}

#[test]
fn is_default___set_option_holding_zero___is_not_default() {
    assert!(is_default(&None::<i32>));
    assert!(!is_default(&Some(0)));
    assert!(!is_default(&Some(String::new())));
    assert!(!is_default(&Some(Profile::default())));
    assert!(is_default(&Profile::default()));
}

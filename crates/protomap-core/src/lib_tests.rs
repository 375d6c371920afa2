#![allow(non_snake_case)]

use crate::fixtures::{Profile, User};
use crate::prelude::*;

#[test]
fn prelude___exports___cover_mapper_round_trip() {
    let mapper: Mapper = Mapper::new(MapperConfig::default());
    let user = User {
        id: 1,
        name: "n".into(),
        profile: Profile::with_bio("b"),
    };

    let result: MapperResult<Vec<u8>> = mapper.encode(&user);
    let decoded: User = mapper.decode_new(&result.unwrap()).unwrap();

    assert_eq!(decoded, user);
}

#[test]
fn prelude___error_kind___matches_through_wrappers() {
    let err: MapperError = MapperError::NilInput("body");

    assert_eq!(err.kind(), ErrorKind::NilInput);
}

#[test]
fn private___serde_json___is_reexported() {
    let value = crate::__private::serde_json::json!({"a": 1});

    assert_eq!(value["a"], 1);
}

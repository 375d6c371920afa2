//! Hand-written schema implementations shared by unit tests.
//!
//! These mirror what `#[derive(Record)]` and `#[derive(ProtoMessage)]` emit so
//! the core crate can be tested without the macro crate.

use crate::message::{MessageDescriptor, MessageField, ProtoField, ProtoMessage};
use crate::schema::{
    FieldDecl, FieldMut, FieldRef, Record, RecordDecl, RecordField, Schema, Target, TargetMut,
    TypeDescriptor, is_default,
};
use serde_json::Value;

macro_rules! message_accessors {
    ($ty:ty { $($field:ident),* }) => {
        fn field_value(&self, name: &str) -> Result<Option<Value>, serde_json::Error> {
            match name {
                $(stringify!($field) => serde_json::to_value(&self.$field).map(Some),)*
                _ => Ok(None),
            }
        }

        fn set_field_value(&mut self, name: &str, value: Value) -> Result<bool, serde_json::Error> {
            match name {
                $(stringify!($field) => {
                    self.$field = serde_json::from_value(value)?;
                    Ok(true)
                })*
                _ => Ok(false),
            }
        }

        fn clear(&mut self) {
            *self = <$ty>::default();
        }
    };
}

macro_rules! message_schema {
    ($ty:ident) => {
        impl MessageField for $ty {
            fn message(&self) -> Option<&dyn ProtoMessage> {
                Some(self)
            }

            fn message_mut(&mut self) -> &mut dyn ProtoMessage {
                self
            }
        }

        impl Schema for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::message::<Self>(stringify!($ty))
            }

            fn as_target(&self) -> Target<'_> {
                Target::Message(self)
            }

            fn as_target_mut(&mut self) -> TargetMut<'_> {
                TargetMut::Message(self)
            }
        }
    };
}

macro_rules! record_schema {
    ($ty:ident, $decl:expr) => {
        impl Schema for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::record::<Self>(stringify!($ty), $decl)
            }

            fn as_target(&self) -> Target<'_> {
                Target::Record(self)
            }

            fn as_target_mut(&mut self) -> TargetMut<'_> {
                TargetMut::Record(self)
            }
        }

        impl RecordField for $ty {
            fn record(&self) -> Option<&dyn Record> {
                Some(self)
            }

            fn record_mut(&mut self) -> &mut dyn Record {
                self
            }

            fn record_descriptor() -> TypeDescriptor {
                <Self as Schema>::descriptor()
            }
        }
    };
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub bio: String,
    pub display_name: String,
}

static PROFILE_DESCRIPTOR: MessageDescriptor = MessageDescriptor {
    full_name: "acme.user.v1.Profile",
    fields: &[
        ProtoField {
            name: "bio",
            json_name: "bio",
            required: false,
        },
        ProtoField {
            name: "display_name",
            json_name: "displayName",
            required: false,
        },
    ],
};

impl ProtoMessage for Profile {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &PROFILE_DESCRIPTOR
    }

    message_accessors!(Profile { bio, display_name });
}

message_schema!(Profile);

impl Profile {
    pub fn with_bio(bio: &str) -> Self {
        Self {
            bio: bio.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub handle: String,
    pub credits: i64,
}

static ACCOUNT_DESCRIPTOR: MessageDescriptor = MessageDescriptor {
    full_name: "acme.billing.v1.Account",
    fields: &[
        ProtoField {
            name: "handle",
            json_name: "handle",
            required: true,
        },
        ProtoField {
            name: "credits",
            json_name: "credits",
            required: false,
        },
    ],
};

impl ProtoMessage for Account {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &ACCOUNT_DESCRIPTOR
    }

    message_accessors!(Account { handle, credits });
}

message_schema!(Account);

// ============================================================================
// Records
// ============================================================================

/// Regular fields alongside one opaque message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub profile: Profile,
}

record_schema!(
    User,
    RecordDecl::new(vec![
        FieldDecl::value("id"),
        FieldDecl::value("name").optional(),
        FieldDecl::message("profile"),
    ])
);

impl Record for User {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "id" => Some(FieldRef::Value(&self.id)),
            "name" => Some(FieldRef::Value(&self.name)),
            "profile" => Some(FieldRef::Message(self.profile.message())),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "id" => Some(FieldMut::Value(&mut self.id)),
            "name" => Some(FieldMut::Value(&mut self.name)),
            "profile" => Some(FieldMut::Message(&mut self.profile)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inner {
    pub opaque: Profile,
}

record_schema!(
    Inner,
    RecordDecl::new(vec![FieldDecl::message("opaque")])
);

impl Record for Inner {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "opaque" => Some(FieldRef::Message(self.opaque.message())),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "opaque" => Some(FieldMut::Message(&mut self.opaque)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outer {
    pub inner: Inner,
}

record_schema!(
    Outer,
    RecordDecl::new(vec![FieldDecl::nested::<Inner>("inner")])
);

impl Record for Outer {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "inner" => Some(FieldRef::Record(self.inner.record())),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "inner" => Some(FieldMut::Record(&mut self.inner)),
            _ => None,
        }
    }
}

/// Two levels of record nesting above an opaque field, plus an optional
/// record slot and a renamed regular field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub request_id: String,
    pub outer: Outer,
    pub extra: Option<Inner>,
}

record_schema!(
    Envelope,
    RecordDecl::new(vec![
        FieldDecl::value("request_id"),
        FieldDecl::nested::<Outer>("outer"),
        FieldDecl::nested::<Option<Inner>>("extra").tagged("extra,omitempty"),
    ])
    .rename_all("camelCase")
);

impl Record for Envelope {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "request_id" => Some(FieldRef::Value(&self.request_id)),
            "outer" => Some(FieldRef::Record(self.outer.record())),
            "extra" => Some(FieldRef::Record(self.extra.record())),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "request_id" => Some(FieldMut::Value(&mut self.request_id)),
            "outer" => Some(FieldMut::Record(&mut self.outer)),
            "extra" => Some(FieldMut::Record(&mut self.extra)),
            _ => None,
        }
    }

    fn field_is_zero(&self, name: &str) -> Option<bool> {
        match name {
            "extra" => Some(is_default(&self.extra)),
            _ => None,
        }
    }
}

/// Optional message slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wallet {
    pub owner: String,
    pub account: Option<Account>,
}

record_schema!(
    Wallet,
    RecordDecl::new(vec![
        FieldDecl::value("owner"),
        FieldDecl::message("account"),
    ])
);

impl Record for Wallet {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "owner" => Some(FieldRef::Value(&self.owner)),
            "account" => Some(FieldRef::Message(self.account.message())),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "owner" => Some(FieldMut::Value(&mut self.owner)),
            "account" => Some(FieldMut::Message(&mut self.account)),
            _ => None,
        }
    }
}

/// Self-referencing record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub label: String,
    pub next: Option<Box<Node>>,
}

record_schema!(
    Node,
    RecordDecl::new(vec![
        FieldDecl::value("label"),
        FieldDecl::nested::<Option<Box<Node>>>("next"),
    ])
);

impl Record for Node {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "label" => Some(FieldRef::Value(&self.label)),
            "next" => Some(FieldRef::Record(self.next.record())),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "label" => Some(FieldMut::Value(&mut self.label)),
            "next" => Some(FieldMut::Record(&mut self.next)),
            _ => None,
        }
    }
}

/// Declares an opaque field whose accessor hands back plain data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mislabeled {
    pub id: i64,
    pub profile: i64,
}

record_schema!(
    Mislabeled,
    RecordDecl::new(vec![
        FieldDecl::value("id"),
        FieldDecl::message("profile"),
    ])
);

impl Record for Mislabeled {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "id" => Some(FieldRef::Value(&self.id)),
            "profile" => Some(FieldRef::Value(&self.profile)),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "id" => Some(FieldMut::Value(&mut self.id)),
            "profile" => Some(FieldMut::Value(&mut self.profile)),
            _ => None,
        }
    }
}

/// Declares a field that has no accessor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phantom {
    pub id: i64,
}

record_schema!(
    Phantom,
    RecordDecl::new(vec![FieldDecl::value("id"), FieldDecl::value("ghost")])
);

impl Record for Phantom {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "id" => Some(FieldRef::Value(&self.id)),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "id" => Some(FieldMut::Value(&mut self.id)),
            _ => None,
        }
    }
}

/// Record whose declaration is supplied per test
pub fn declared(type_name: &'static str, decl: RecordDecl) -> TypeDescriptor {
    TypeDescriptor::record::<Phantom>(type_name, decl)
}

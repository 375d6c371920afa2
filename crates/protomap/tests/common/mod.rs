//! Shared types and setup for the facade integration tests

#![allow(dead_code)]

use protomap::prelude::*;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Honors `RUST_LOG`; falls back to `protomap_core=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("protomap_core=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, ProtoMessage)]
#[proto(name = "acme.user.v1.Profile")]
pub struct Profile {
    pub bio: String,
    pub display_name: String,
}

impl Profile {
    pub fn with_bio(bio: &str) -> Self {
        Self {
            bio: bio.to_string(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct User {
    pub id: i64,
    #[record(optional)]
    pub name: String,
    #[record(message)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Inner {
    #[record(message)]
    pub opaque: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Outer {
    #[record(nested)]
    pub inner: Inner,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Root {
    #[record(nested)]
    pub outer: Outer,
}

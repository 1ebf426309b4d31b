#![forbid(unsafe_code)]

pub mod store;
pub mod postgres;

pub use crate::store::{FingerprintStore, MemoryFingerprintStore, StoreError};
pub use crate::postgres::PostgresFingerprintStore;
pub use crate::postgres::run_migrations;

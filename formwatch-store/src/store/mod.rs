mod memory;
mod trait_store;

pub use memory::MemoryFingerprintStore;
pub use trait_store::{FingerprintStore, StoreError};

//! State management for the SWAPI provider.
//!
//! Tracks which planets the manifest manages, their last known attributes,
//! and a bounded history of lifecycle operations.

mod local;
mod lock;
mod store;
mod types;

pub use local::{LocalStateStore, STATE_DIR};
pub use lock::{generate_holder_id, LockInfo, LOCK_EXPIRY_SECS};
pub use store::StateStore;
pub use types::{
    data_address, label_from_address, resource_address, HistoryEntry, Operation, ProviderState,
    ResourceState, STATE_VERSION,
};

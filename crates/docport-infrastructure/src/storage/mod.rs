//! Storage layer for atomic file operations.

mod atomic_toml;
mod token_storage;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use token_storage::FileTokenStore;

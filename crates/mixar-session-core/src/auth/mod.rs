//! Session state, persistence and navigation intents.
//!
//! This module provides:
//! - `Session`: credentials and cached user profile mirrored to a store
//! - `KeyValueStore`: the storage seam, with in-memory, file and OS keychain backends
//! - `Navigation`: redirect intents returned by guards and session operations

pub mod credentials;
pub mod navigation;
pub mod session;
pub mod store;

pub use credentials::KeyringStore;
pub use navigation::Navigation;
pub use session::Session;
pub use store::{FileStore, KeyValueStore, MemoryStore};

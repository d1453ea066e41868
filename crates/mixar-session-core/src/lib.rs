//! Mixar session client.
//!
//! Client-side session state for the Mixar dashboard: token persistence,
//! bearer-token injection, transparent refresh-and-retry on expired
//! credentials, and page guards expressed as navigation intents.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiResponse, RequestOptions, SessionClient, SessionError};
pub use auth::{FileStore, KeyValueStore, KeyringStore, MemoryStore, Navigation, Session};
pub use config::{Config, Routes, StorageKeys};
pub use models::{TokenPair, UserProfile};

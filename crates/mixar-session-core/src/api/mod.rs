//! Authenticated HTTP access to the Mixar backend.
//!
//! `SessionClient` attaches the session's bearer token to every request,
//! refreshes an expired access token once on a 401 and retries, and runs the
//! login, signup and Google OAuth exchanges that populate the session.

pub mod client;
pub mod error;
pub mod request;

pub use client::SessionClient;
pub use error::SessionError;
pub use request::{ApiResponse, RequestOptions};

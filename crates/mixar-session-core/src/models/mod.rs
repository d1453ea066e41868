//! Data models exchanged with the Mixar backend.
//!
//! - `TokenPair`: access/refresh credentials returned by the auth endpoints
//! - `UserProfile`: the opaque user record returned by `/auth/me`

pub mod token;
pub mod user;

pub use token::TokenPair;
pub use user::UserProfile;

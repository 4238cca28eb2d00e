//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `Session`, `SessionHandle`: token, profile and login flag shared with
//!   the gateway
//! - `AuthStore`: login, registration, token validation, profile updates
//! - `TokenStore`: persistence of the token between runs (keychain, file
//!   or memory)

pub mod session;
pub mod store;
pub mod token_store;

pub use session::{Session, SessionHandle};
pub use store::AuthStore;
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

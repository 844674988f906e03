//! Authentication layer
//!
//! The credential session store holds OAuth-derived identities; the gate
//! middleware enforces that every protocol request carries a live session.
//! Credential sessions and transport sessions live in separate id spaces:
//! authentication proves "who", the transport registry governs "which channel".

mod middleware;
mod store;

pub use middleware::{require_session, AuthContext, SESSION_HEADER};
pub use store::{CredentialSession, CredentialStore, UserIdentity};

//! Shared application state
//!
//! Owned, injectable state objects with explicit lifecycles; handlers and
//! middleware receive them as dependencies so tests can substitute fakes.

use std::sync::Arc;

use docsmith_core::DocumentGenerator;

use crate::auth::CredentialStore;
use crate::mcp::SessionRegistry;
use crate::oauth::OAuthFlow;

#[derive(Clone)]
pub struct AppState {
    /// Authenticated-user sessions ("who")
    pub store: Arc<CredentialStore>,
    /// Live transport sessions ("which channel")
    pub registry: Arc<SessionRegistry>,
    pub oauth: Arc<OAuthFlow>,
    pub generator: Arc<dyn DocumentGenerator>,
    /// Post-login redirect target
    pub frontend_url: String,
}

//! OAuth authorization-code flow against an external provider
//!
//! Drives login-redirect, callback code exchange, user-info resolution, and
//! best-effort token revocation. Successful exchanges populate the credential
//! session store; exchange failures never create a partial session.

mod config;
mod flow;
mod token;

pub use config::OAuthConfig;
pub use flow::{OAuthExchangeError, OAuthFlow, UserInfo};
pub use token::TokenResponse;

//! OAuth provider configuration
//!
//! All values come from the environment with literal defaults suitable for
//! local development only (GitHub endpoints, demo client credentials).

use std::env;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    pub revocation_url: Option<String>,
    pub userinfo_url: Option<String>,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: env::var("OAUTH_CLIENT_ID").unwrap_or_else(|_| "demo-client-id".into()),
            client_secret: env::var("OAUTH_CLIENT_SECRET")
                .unwrap_or_else(|_| "demo-client-secret".into()),
            authorization_url: env::var("OAUTH_AUTH_URL")
                .unwrap_or_else(|_| "https://github.com/login/oauth/authorize".into()),
            token_url: env::var("OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| "https://github.com/login/oauth/access_token".into()),
            revocation_url: env::var("OAUTH_REVOKE_URL").ok(),
            userinfo_url: env::var("OAUTH_USERINFO_URL")
                .ok()
                .or_else(|| Some("https://api.github.com/user".into())),
            redirect_uri: env::var("OAUTH_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3001/auth/callback".into()),
            scopes: env::var("OAUTH_SCOPES")
                .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["read:user".into(), "user:email".into()]),
        }
    }

    /// Space-joined scope string for the authorization URL.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

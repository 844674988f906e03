//! OAuth flow handler
//!
//! Authorization code flow: build the login redirect with an anti-forgery
//! state value, verify and consume that state on callback, exchange the code
//! for tokens, optionally resolve the user's identity, and revoke on logout.
//!
//! State values are held in a pending set with a bounded validity window and
//! are one-time use: an unknown, expired, or replayed state fails the
//! callback instead of silently passing through.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::config::OAuthConfig;
use super::token::TokenResponse;
use crate::auth::UserIdentity;

/// How long an issued state value stays redeemable
const STATE_TTL_MINUTES: i64 = 10;

/// Errors from the code exchange; none of these leave a partial session behind
#[derive(Debug, Error)]
pub enum OAuthExchangeError {
    #[error("authorization URL is invalid: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Exchange { status: u16, body: String },

    #[error("token endpoint returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("state parameter is missing, expired, or already used")]
    InvalidState,
}

/// Identity claims from the provider's user-info endpoint (GitHub shape)
#[derive(Debug, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// OAuth flow against one configured provider
pub struct OAuthFlow {
    config: OAuthConfig,
    http: reqwest::Client,
    /// Issued-but-unredeemed state values
    pending_states: DashMap<String, DateTime<Utc>>,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            pending_states: DashMap::new(),
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization redirect target and record its state value.
    pub fn begin_login(&self) -> Result<String, OAuthExchangeError> {
        let state = generate_state();
        let mut url = Url::parse(&self.config.authorization_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", &self.config.redirect_uri);
            query.append_pair("response_type", "code");
            query.append_pair("scope", &self.config.scope_param());
            query.append_pair("state", &state);
        }

        self.sweep_stale_states();
        self.pending_states.insert(state, Utc::now());
        debug!("created authorization URL");
        Ok(url.to_string())
    }

    /// Verify and consume a state value. One-time use.
    pub fn take_state(&self, state: &str) -> bool {
        let Some((_, issued_at)) = self.pending_states.remove(state) else {
            return false;
        };
        Utc::now() - issued_at < Duration::minutes(STATE_TTL_MINUTES)
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthExchangeError> {
        info!("exchanging authorization code for tokens");

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_uri),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .header("accept", "application/json")
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthExchangeError::Exchange { status, body });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthExchangeError::MalformedResponse(e.to_string()))?;

        info!("token exchange successful");
        Ok(token)
    }

    /// Resolve the authenticated identity from the user-info endpoint.
    ///
    /// Identity resolution is not allowed to fail a login that already has
    /// tokens; any failure falls back to a placeholder identity.
    pub async fn resolve_identity(&self, access_token: &str) -> UserIdentity {
        let fallback = || UserIdentity {
            user_id: format!("user_{}", Utc::now().timestamp_millis()),
            email: "unknown@localhost".to_string(),
        };

        let Some(userinfo_url) = &self.config.userinfo_url else {
            return fallback();
        };

        let result = self
            .http
            .get(userinfo_url)
            .header("authorization", format!("Bearer {}", access_token))
            .header("user-agent", docsmith_core::branding::SERVER_NAME)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<UserInfo>().await {
                    Ok(info) => UserIdentity {
                        user_id: info
                            .id
                            .map(|id| id.to_string())
                            .or(info.login.clone())
                            .unwrap_or_else(|| format!("user_{}", Utc::now().timestamp_millis())),
                        email: info
                            .email
                            .or(info.login.map(|l| format!("{}@users.noreply.github.com", l)))
                            .unwrap_or_else(|| "unknown@localhost".to_string()),
                    },
                    Err(e) => {
                        warn!(error = %e, "user-info response malformed, using placeholder identity");
                        fallback()
                    }
                }
            }
            Ok(response) => {
                warn!(status = %response.status(), "user-info fetch rejected, using placeholder identity");
                fallback()
            }
            Err(e) => {
                warn!(error = %e, "user-info fetch failed, using placeholder identity");
                fallback()
            }
        }
    }

    /// Revoke an access token at the provider.
    ///
    /// Best-effort by contract: the caller logs and discards the error; local
    /// logout must never block on this. Some providers treat the hint as a
    /// no-op for opaque tokens, which is fine.
    pub async fn revoke_token(&self, access_token: &str) -> Result<(), OAuthExchangeError> {
        let Some(revocation_url) = &self.config.revocation_url else {
            debug!("no revocation endpoint configured, skipping revoke");
            return Ok(());
        };

        let params = [
            ("token", access_token),
            ("token_type_hint", "access_token"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];

        let response = self.http.post(revocation_url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthExchangeError::Exchange { status, body });
        }

        info!("access token revoked");
        Ok(())
    }

    /// Drop state values past their validity window.
    fn sweep_stale_states(&self) {
        let cutoff = Utc::now() - Duration::minutes(STATE_TTL_MINUTES);
        self.pending_states.retain(|_, issued_at| *issued_at >= cutoff);
    }
}

/// Random anti-forgery state value (16 bytes, base64url).
fn generate_state() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

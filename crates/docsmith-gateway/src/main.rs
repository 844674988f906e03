//! Docsmith gateway binary

use std::sync::Arc;

use docsmith_core::service::{AnthropicConfig, AnthropicGenerator};
use docsmith_gateway::{GatewayConfig, GatewayServer, OAuthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development reads .env; missing file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsmith_gateway=info,docsmith_core=info,tower_http=warn".into()),
        )
        .init();

    let config = GatewayConfig::from_env();
    let oauth_config = OAuthConfig::from_env();
    let generator = Arc::new(AnthropicGenerator::new(AnthropicConfig::from_env()));

    GatewayServer::new(config, oauth_config, generator).run().await
}

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slack_relay::config::Config;
use slack_relay::relay::Relay;
use slack_relay::server::{AppState, build_router};
use slack_relay::slack::SlackClient;
use slack_relay::store::{MemoryStore, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slack_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let slack = SlackClient::new(&config.api_base, &config.bot_token, config.http_timeout)
        .context("building Slack client")?;

    let bot_user_id = match config.bot_user_id.clone() {
        Some(id) => id,
        None => {
            let id = slack
                .bot_user_id()
                .await
                .context("resolving bot user id via auth.test")?;
            tracing::info!(bot_user_id = %id, "Resolved bot user id");
            id
        }
    };

    let store = MemoryStore::new(config.cache_ttl);
    let relay = Relay::new(config.relay_settings(bot_user_id), store, Arc::new(slack));
    let state = AppState::new(
        relay,
        config.signing_secret.as_bytes(),
        config.verification_token.as_str(),
        Arc::new(SystemClock),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(
        addr = %config.bind_addr,
        destination = %config.destination_channel,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

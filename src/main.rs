use login_bridge::{router, AppState, BridgeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BridgeConfig::from_env()?;
    let port = config.port();
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(
        port,
        identity_url = %config.identity_url(),
        authz_url = %config.authz_url(),
        "starting login/consent bridge"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

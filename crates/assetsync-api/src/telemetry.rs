//! Tracing setup

use assetsync_core::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: `RUST_LOG` when set, plain text or JSON lines
/// depending on `LOG_FORMAT`.
pub fn init_telemetry(server: &ServerConfig) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "assetsync=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = if server.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(
        environment = %server.environment,
        log_format = %server.log_format,
        "Tracing initialized"
    );
    Ok(())
}

//! Tiered cache server
//!
//! Wires the in-process tier, the optional Redis tier and the cache service
//! together, then exposes the monitoring endpoints over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::api::{create_router, AppState};
use tiered_cache::cache::{MemoryCache, MultiLevelCache, RedisBackend, RemoteBackend, RemoteCache};
use tiered_cache::{CacheService, Config};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to Redis, falling back to memory-only when unreachable
/// 4. Build the cache service with the default patterns
/// 5. Serve the monitoring endpoints until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiered cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: memory_max_size={}, memory_ttl={}s, redis={}, port={}",
        config.memory_max_size,
        config.memory_ttl,
        config.redis_url.as_deref().unwrap_or("<none>"),
        config.server_port
    );

    let remote = RemoteCache::new(connect_remote(&config).await, config.response_timeout());
    let memory = MemoryCache::new(config.memory_max_size, config.memory_ttl());
    let service = CacheService::new(MultiLevelCache::new(memory, remote))
        .context("failed to configure cache patterns")?;
    info!(
        "Cache service initialized with {} patterns",
        service.patterns().len()
    );

    let app = create_router(AppState::new(service));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connects the remote tier. An unreachable Redis is not fatal: the process
/// keeps serving from memory alone.
async fn connect_remote(config: &Config) -> Option<Arc<dyn RemoteBackend>> {
    let url = match config.redis_url.as_deref() {
        Some(url) => url,
        None => {
            warn!("REDIS_URL not set, running with the memory tier only");
            return None;
        }
    };

    match RedisBackend::connect(url, config.connect_timeout()).await {
        Ok(backend) => {
            info!("Connected to Redis at {}", url);
            Some(Arc::new(backend))
        }
        Err(e) => {
            warn!("Redis unavailable at {} ({}), running with the memory tier only", url, e);
            None
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

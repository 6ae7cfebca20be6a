//! Bind and serve: a single instance, or several isolated workers under a supervisor.

use crate::config::ServerConfig;
use crate::error::{ConfigError, ServeError};
use crate::routes::user_routes;
use crate::state::{AppState, RequestLimits};
use crate::store::UserStore;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

/// Consecutive failed runs after which a worker is given up.
const MAX_RESTARTS: u32 = 5;
const RESTART_DELAY: Duration = Duration::from_millis(500);

/// Run until Ctrl-C. In multi mode, worker `i` (1-based) binds `port + i` and owns its own store.
pub async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    if !config.is_multi() {
        let addr = SocketAddr::new(config.host, config.port);
        let state = AppState::new(UserStore::new(), config.limits());
        return serve_one(addr, state).await;
    }

    let mut workers = JoinSet::new();
    for i in 1..=config.workers {
        let port = u16::try_from(i)
            .ok()
            .and_then(|i| config.port.checked_add(i))
            .ok_or_else(|| ConfigError::Invalid {
                key: "WORKERS",
                value: config.workers.to_string(),
            })?;
        let addr = SocketAddr::new(config.host, port);
        workers.spawn(supervise(i, addr, config.limits()));
    }
    tracing::info!(workers = config.workers, "started in multi-worker mode");

    let mut first_err = None;
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined? {
            tracing::error!(error = %e, "worker gave up");
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Serve one instance on an already-chosen address until shutdown.
pub async fn serve_one(addr: SocketAddr, state: AppState) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Server is running on {}", local);
    axum::serve(listener, user_routes(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped on {}", local);
    Ok(())
}

/// Keep one worker alive. A restarted worker starts from an empty store.
async fn supervise(
    index: usize,
    addr: SocketAddr,
    limits: RequestLimits,
) -> Result<(), ServeError> {
    let mut failures = 0;
    loop {
        let state = AppState::new(UserStore::new(), limits);
        let err = match tokio::spawn(serve_one(addr, state)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e,
            Err(e) => ServeError::Join(e),
        };
        failures += 1;
        if failures > MAX_RESTARTS {
            return Err(err);
        }
        tracing::warn!(worker = index, error = %err, attempt = failures, "worker died, restarting");
        tokio::time::sleep(RESTART_DELAY).await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

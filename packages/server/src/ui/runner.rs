//! Server bootstrap.

use std::{future::Future, sync::Arc};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    cli::Cli,
    domain::MessageRepository,
    infrastructure::repository::InMemoryMessageRepository,
    ui::{
        realtime::{Hub, RealtimeConfig},
        router::create_router,
        signal::shutdown_signal,
        state::AppState,
    },
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind the configured address and serve until ctrl-c / SIGTERM.
pub async fn run(cli: Cli) -> Result<(), ServerError> {
    let addr = cli.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    serve(listener, cli.realtime_config(), shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// Starts the hub's idle sweeper alongside the HTTP server and stops it on
/// the way out.
pub async fn serve<F>(
    listener: TcpListener,
    config: RealtimeConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let repository: Arc<dyn MessageRepository> = Arc::new(InMemoryMessageRepository::new());
    let hub = Arc::new(Hub::new(config));
    let state = Arc::new(AppState::new(hub.clone(), repository));
    let sweeper = tokio::spawn(hub.run());

    if let Ok(local) = listener.local_addr() {
        tracing::info!(
            outbound_capacity = config.outbound_capacity,
            room_idle_secs = config.room_idle_threshold.as_secs(),
            "Listening on {}",
            local
        );
    }

    let result = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve);

    sweeper.abort();
    tracing::info!("Server stopped");
    result
}

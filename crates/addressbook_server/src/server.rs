//! Process lifecycle: bind, serve, shut down on signals, close the store.

use crate::api::{build_app, API_PREFIX};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::state::AppState;
use addressbook_core::db::open_db;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::signal;

/// Runs the service until SIGINT or SIGTERM, then closes the store.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let conn = open_db(&config.db)?;
    let state = AppState::new(conn);
    let app = build_app(state.clone());

    let listener = TcpListener::bind(config.bind_target()).await?;
    info!(
        "event=server_start module=server status=ok addr={} prefix={} db={}",
        listener.local_addr()?,
        API_PREFIX,
        config.db.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    state.close()?;
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=SIGINT error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(
                    "event=signal_install module=server status=error signal=SIGTERM error={err}"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!("event=shutdown_signal module=server status=ok signal={received}");
}

//! Share Timer - attach to a shared countdown as owner or observer
//! 
//! This is the main entry point for the share-timer daemon.

use std::time::Duration;

use tokio::{net::TcpListener, sync::oneshot};
use tracing::info;

use share_timer::{
    config::Config,
    connection::spawn_websocket,
    api::create_router,
    session::Role,
    state::{AppState, TimerSession},
    tasks::SessionDriver,
    utils::{now_millis, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("share_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting share-timer v{}", env!("CARGO_PKG_VERSION"));

    let snapshot = config.snapshot()?;
    let client_id = config.client_id()?;
    let role = Role::from_owner_flag(snapshot.is_owner);
    info!("Configuration: server={}, timer={}, role={:?}, api={}",
          config.server, snapshot.timer_id, role, config.address());

    // Reconcile the snapshot and attach to the server
    let session = TimerSession::new(client_id.clone(), &snapshot, now_millis());
    let (connection, transport) = spawn_websocket(config.server.clone());
    let (driver, handle) = SessionDriver::new(session, connection);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let driver_task = tokio::spawn(driver.run(async move {
        let _ = stop_rx.await;
    }));

    // Create HTTP router for local control
    let state = AppState::new(handle, client_id, role, config.port, config.host.clone());
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /create    - Register the timer (owner)");
    info!("  POST /start     - Start the countdown (owner)");
    info!("  POST /pause     - Pause the countdown (owner)");
    info!("  POST /resume    - Resume the countdown (owner)");
    info!("  POST /leave     - Leave the timer (client)");
    info!("  PUT  /snapshot  - Re-initialize from a fresh snapshot");
    info!("  GET  /status    - Current countdown status");
    info!("  GET  /health    - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Stop the session first so a client's leave is flushed before the socket closes
    let _ = stop_tx.send(());
    match driver_task.await {
        Ok(session) => info!("Session ended in phase {:?} with {}ms left",
                             session.phase(), session.time_left()),
        Err(e) => tracing::error!("Session driver failed: {}", e),
    }
    if tokio::time::timeout(Duration::from_secs(2), transport).await.is_err() {
        tracing::warn!("Transport did not close in time");
    }

    info!("Shutdown complete");
    Ok(())
}

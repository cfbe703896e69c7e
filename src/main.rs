//! Pizza Coach - cooking timer daemon with rotation alerts
//!
//! This is the main entry point for the timer-side daemon.

use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{info, warn};

use pizza_coach::{
    api::{create_router, ApiContext},
    clock::SystemClock,
    config::Config,
    haptics::{AlertDispatcher, Haptics, LogHaptics},
    state::{AppState, TimerState},
    storage::{keys, JsonFileStore, KvStore},
    sync::SettingsReceiver,
    tasks::{intent_signal_task, timer_tick_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pizza_coach={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting pizza-coach daemon v1.0.0");
    info!(
        "Configuration: host={}, port={}, settings_file={}",
        config.host,
        config.port,
        config.settings_file.display()
    );

    let store: Arc<dyn KvStore> = Arc::new(
        JsonFileStore::open(&config.settings_file)
            .with_context(|| format!("opening settings store {}", config.settings_file.display()))?,
    );
    let (first_rotation, repeat_interval) = stored_settings(store.as_ref());
    info!(
        "Timer thresholds: first={}s, repeat={}s",
        first_rotation, repeat_interval
    );

    // Create application state and explicit collaborators (no globals)
    let haptics: Arc<dyn Haptics> = Arc::new(LogHaptics);
    let (command_tx, command_rx) = mpsc::channel(16);
    let state = Arc::new(AppState::new(
        TimerState::with_settings(first_rotation, repeat_interval),
        Arc::new(SystemClock),
        Arc::clone(&haptics),
        command_tx.clone(),
        config.port,
        config.host.clone(),
    ));
    let dispatcher = AlertDispatcher::new(haptics);
    let receiver = SettingsReceiver::new(Arc::clone(&state), Arc::clone(&store));

    // CLI overrides go through the same validation funnel as the channel
    if config.first_rotation.is_some() || config.repeat_interval.is_some() {
        let payload = serde_json::json!({
            "firstRotation": config.first_rotation.unwrap_or(first_rotation),
            "repeatInterval": config.repeat_interval.unwrap_or(repeat_interval),
        });
        if receiver.handle_payload(&payload).is_err() {
            anyhow::bail!("Invalid threshold override on the command line");
        }
    }

    // Start the timer tick task and the signal intent listener
    tokio::spawn(timer_tick_task(
        Arc::clone(&state),
        dispatcher,
        command_rx,
    ));
    tokio::spawn(intent_signal_task(command_tx));

    // Create HTTP router with all endpoints
    let ctx = Arc::new(ApiContext { state, receiver });
    let app = create_router(ctx);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start - Start a new timer");
    info!("  POST /timer/stop  - Stop and clear the timer");
    info!("  POST /settings    - Apply settings from the editing side");
    info!("  GET  /status      - Current timer state");
    info!("  GET  /health      - Health check");

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

    info!("Daemon shutdown complete");
    Ok(())
}

/// Read the persisted thresholds, falling back to the defaults (30s / 15s)
/// when a key is absent or unusable
fn stored_settings(store: &dyn KvStore) -> (u32, u32) {
    let read = |key: &str| match store.get(key) {
        Ok(value) => value.and_then(|v| u32::try_from(v).ok()).filter(|v| *v > 0),
        Err(e) => {
            warn!("Failed to read '{}' from store: {}", key, e);
            None
        }
    };

    (
        read(keys::FIRST_ROTATION)
            .unwrap_or(pizza_coach::state::DEFAULT_FIRST_ROTATION_SECS),
        read(keys::REPEAT_INTERVAL)
            .unwrap_or(pizza_coach::state::DEFAULT_REPEAT_INTERVAL_SECS),
    )
}

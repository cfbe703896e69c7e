//! Unix-signal intent boundary
//!
//! Stands in for the platform's voice/gesture intent delivery: SIGUSR1 asks
//! for a new timer, SIGUSR2 stops it. Both map onto the same closed command
//! set the HTTP surface uses.

use futures::stream::StreamExt;
use signal_hook::consts::{SIGUSR1, SIGUSR2};
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::commands::TimerCommand;

/// Background task translating intent signals into timer commands
pub async fn intent_signal_task(commands: mpsc::Sender<TimerCommand>) {
    let mut signals = match Signals::new([SIGUSR1, SIGUSR2]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install intent signal handler: {}", e);
            return;
        }
    };

    info!("Listening for intent signals (SIGUSR1=start, SIGUSR2=stop)");

    while let Some(signal) = signals.next().await {
        let command = match signal {
            SIGUSR1 => TimerCommand::StartNewTimer,
            SIGUSR2 => TimerCommand::StopTimer,
            _ => continue,
        };

        info!("Intent signal {} mapped to {:?}", signal, command);
        if commands.send(command).await.is_err() {
            warn!("Timer task is gone, stopping intent listener");
            break;
        }
    }
}

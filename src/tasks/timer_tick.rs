//! Timer tick background task

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{commands::TimerCommand, haptics::AlertDispatcher, state::AppState};

/// Polling cadence while the timer runs
///
/// A granularity bound, not a correctness requirement: alerts come from
/// level-crossing against wall-clock elapsed time, so a late tick only
/// delays an alert by at most one cadence.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Background task that owns the timer's polling loop
///
/// Waits for control commands; while the timer runs, an inner loop polls at
/// [`TICK_INTERVAL`] and relays threshold crossings to the dispatcher.
/// Polling stops outright when the timer stops. Ticks and command handling
/// are serialized on this task, so a tick always completes (including alert
/// dispatch) before the next tick or command is applied.
pub async fn timer_tick_task(
    state: Arc<AppState>,
    dispatcher: AlertDispatcher,
    mut commands: mpsc::Receiver<TimerCommand>,
) {
    info!("Starting timer tick task");

    while let Some(command) = commands.recv().await {
        match command {
            TimerCommand::StartNewTimer => {
                info!("Starting new timer");
                if let Err(e) = state.start_new_timer() {
                    error!("Failed to start timer: {}", e);
                    continue;
                }
                run_while_started(&state, &dispatcher, &mut commands).await;
            }
            TimerCommand::StopTimer => {
                // Already stopped; stop-and-clear is idempotent.
                if let Err(e) = state.stop_timer() {
                    error!("Failed to stop timer: {}", e);
                }
            }
        }
    }

    debug!("Command channel closed, timer tick task exiting");
}

/// Inner polling loop; returns when the timer is stopped
async fn run_while_started(
    state: &Arc<AppState>,
    dispatcher: &AlertDispatcher,
    commands: &mut mpsc::Receiver<TimerCommand>,
) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match state.tick() {
                    Ok(Some(event)) => dispatcher.dispatch(event),
                    Ok(None) => {}
                    Err(e) => error!("Failed to run tick evaluation: {}", e),
                }
            }

            command = commands.recv() => {
                match command {
                    Some(TimerCommand::StartNewTimer) => {
                        // Restart in place with fresh state.
                        info!("Restarting timer");
                        if let Err(e) = state.start_new_timer() {
                            error!("Failed to restart timer: {}", e);
                        }
                    }
                    Some(TimerCommand::StopTimer) => {
                        info!("Stopping timer");
                        if let Err(e) = state.stop_timer() {
                            error!("Failed to stop timer: {}", e);
                        }
                        break;
                    }
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::haptics::{Haptics, LogHaptics};
    use crate::state::TimerState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHaptics {
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl Haptics for CountingHaptics {
        fn play_rotation(&self) {}
        fn play_start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn play_stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn commands_drive_running_state_and_control_haptics() {
        let haptics = Arc::new(CountingHaptics::default());
        let (command_tx, command_rx) = mpsc::channel(8);
        let state = Arc::new(AppState::new(
            TimerState::new(),
            Arc::new(SystemClock),
            haptics.clone(),
            command_tx.clone(),
            0,
            "localhost".to_string(),
        ));
        let dispatcher = AlertDispatcher::new(Arc::new(LogHaptics));
        let task = tokio::spawn(timer_tick_task(state.clone(), dispatcher, command_rx));

        let mut snapshots = state.subscribe_snapshots();

        state.send_command(TimerCommand::StartNewTimer).await.unwrap();
        snapshots.wait_for(|snapshot| snapshot.running).await.unwrap();
        assert_eq!(haptics.starts.load(Ordering::SeqCst), 1);

        // A second start restarts in place and stays running.
        state.send_command(TimerCommand::StartNewTimer).await.unwrap();

        state.send_command(TimerCommand::StopTimer).await.unwrap();
        snapshots.wait_for(|snapshot| !snapshot.running).await.unwrap();
        assert_eq!(state.timer_snapshot().unwrap().elapsed_formatted, "0:00");
        assert_eq!(haptics.starts.load(Ordering::SeqCst), 2);
        assert_eq!(haptics.stops.load(Ordering::SeqCst), 1);

        // The shared state keeps a command sender alive, so end the task
        // directly rather than waiting for channel closure.
        task.abort();
    }
}

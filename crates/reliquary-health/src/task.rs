//! Cancellable periodic task: tokio interval + stop signal, joined on cancel
//! so no background work outlives shutdown.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A recurring background task owned by the component that started it.
pub struct PeriodicTask {
    name: &'static str,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn a task that runs `f` every `period`. The first run happens one
    /// full period after spawning.
    pub fn spawn<F>(name: &'static str, period: Duration, f: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);
        let period = period.max(Duration::from_millis(10));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick fires immediately; consume it so the
            // task waits a full period before its first run.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => f(),
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("periodic task {name} stopped");
        });
        Self { name, stop, handle }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn cancel(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                tracing::warn!("periodic task {} join failed: {e}", self.name);
            }
        }
    }
}

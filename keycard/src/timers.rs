use crate::app::Action;
use keycard_core::flow::TimerId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle, time};

/// Timers the app has asked for. Each one is a task that sleeps and then
/// sends `Action::TimerFired`. Cancelling (or dropping the whole set) aborts
/// the task so nothing fires into a screen that's gone.
#[derive(Debug, Default)]
pub struct Timers {
    pending: HashMap<TimerId, JoinHandle<()>>,
}

impl Timers {
    /// Start a timer. Scheduling an ID that's already pending replaces it.
    pub fn schedule(&mut self, id: TimerId, delay: Duration, tx: UnboundedSender<Action>) {
        tracing::debug!(?id, ?delay, "scheduling timer");

        let handle = tokio::spawn(async move {
            time::sleep(delay).await;

            // If the channel is closed we're shutting down and nobody cares.
            let _ = tx.send(Action::TimerFired(id));
        });

        if let Some(old) = self.pending.insert(id, handle) {
            old.abort();
        }
    }

    /// Stop a timer. Unknown (or already fired) IDs are fine.
    pub fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.pending.remove(&id) {
            tracing::debug!(?id, "cancelling timer");
            handle.abort();
        }
    }

    /// Forget about a timer that has fired.
    pub fn fired(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }

    /// How many timers are still waiting
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Is anything still waiting?
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

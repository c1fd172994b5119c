// ── Trailing-edge debouncer ──
//
// Values pushed in quick succession collapse into one: the callback runs
// with the last value once no new value arrived for the quiet period.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Owner handle of a debounce task. Dropping it cancels the task and
/// discards any pending value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task on the current runtime.
    ///
    /// `apply` is never called after `cancel` fires.
    pub fn spawn<F>(quiet: Duration, cancel: CancellationToken, apply: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(debounce_task(rx, quiet, cancel.clone(), apply));
        Self { tx, cancel }
    }

    /// Submit a value, superseding any value still waiting.
    pub fn push(&self, value: T) {
        if self.tx.send(value).is_err() {
            trace!("debouncer already stopped, value dropped");
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn debounce_task<T, F>(
    mut rx: mpsc::UnboundedReceiver<T>,
    quiet: Duration,
    cancel: CancellationToken,
    apply: F,
) where
    F: Fn(T),
{
    loop {
        // Idle: wait for the first value of a burst.
        let mut pending = tokio::select! {
            () = cancel.cancelled() => return,
            value = rx.recv() => match value {
                Some(value) => value,
                None => return,
            },
        };

        // Burst: every new value restarts the quiet period.
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                value = rx.recv() => match value {
                    Some(value) => pending = value,
                    None => return,
                },
                () = tokio::time::sleep(quiet) => {
                    apply(pending);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v| sink.lock().unwrap().push(v))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_applies_last_value_once() {
        let (seen, apply) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(300), CancellationToken::new(), apply);

        for term in ["r", "ru", "rus", "rust"] {
            debouncer.push(term.to_owned());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*seen.lock().unwrap(), ["rust"]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_apply_separately() {
        let (seen, apply) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(300), CancellationToken::new(), apply);

        debouncer.push("a".to_owned());
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push("b".to_owned());
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_discards_pending_value() {
        let (seen, apply) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(300), CancellationToken::new(), apply);

        debouncer.push("late".to_owned());
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(seen.lock().unwrap().is_empty());
    }
}

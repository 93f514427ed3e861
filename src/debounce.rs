use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

// Runs only the last of a burst of scheduled actions, once `delay` has passed
// without a newer one. Scheduling cancels whatever is still pending.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Coalesces bursts of calls into one, fired after `quiet` has passed
/// without a new call. The last call in a burst wins.
#[derive(Clone)]
pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
    action: Arc<dyn Fn() + Send + Sync>,
}

impl Debouncer {
    pub fn new(quiet: Duration, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
            action: Arc::new(action),
        }
    }

    /// Restart the quiet window. Must be called from within a Tokio runtime.
    pub fn call(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let action = Arc::clone(&self.action);
        let quiet = self.quiet;

        tokio::spawn(async move {
            sleep(quiet).await;
            if latest.load(Ordering::SeqCst) == generation {
                action();
            }
        });
    }
}

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

pub type Reset = Box<dyn FnOnce() + Send + 'static>;

/// Runs a reset callback after a delay.
pub trait ResetScheduler: Send + Sync + 'static {
    fn schedule(&self, delay: Duration, reset: Reset);
}

impl<T: ResetScheduler> ResetScheduler for std::sync::Arc<T> {
    fn schedule(&self, delay: Duration, reset: Reset) {
        (**self).schedule(delay, reset);
    }
}

/// Schedules resets on the current tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioResetScheduler;

impl ResetScheduler for TokioResetScheduler {
    fn schedule(&self, delay: Duration, reset: Reset) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reset();
        });
    }
}

/// Collects resets until [`ManualResetScheduler::run_all`] is called.
#[derive(Default)]
pub struct ManualResetScheduler {
    pending: Mutex<Vec<(Duration, Reset)>>,
}

impl ManualResetScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays of the resets that have not run yet, in scheduling order.
    pub fn pending(&self) -> Vec<Duration> {
        self.lock().iter().map(|(delay, _)| *delay).collect()
    }

    /// Runs and removes the oldest pending reset.
    pub fn run_next(&self) -> bool {
        let mut pending = self.lock();
        if pending.is_empty() {
            return false;
        }
        let (_, reset) = pending.remove(0);
        drop(pending);
        reset();
        true
    }

    /// Runs and removes all pending resets.
    pub fn run_all(&self) {
        let pending = std::mem::take(&mut *self.lock());
        for (_, reset) in pending {
            reset();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Duration, Reset)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ManualResetScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualResetScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ResetScheduler for ManualResetScheduler {
    fn schedule(&self, delay: Duration, reset: Reset) {
        self.lock().push((delay, reset));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn manual() {
        let counter = Arc::new(AtomicUsize::new(0));
        let sut = ManualResetScheduler::new();

        for secs in [6, 5] {
            let counter = Arc::clone(&counter);
            sut.schedule(
                Duration::from_secs(secs),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        assert_eq!(
            sut.pending(),
            [Duration::from_secs(6), Duration::from_secs(5)]
        );
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        sut.run_all();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(sut.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio() {
        let (tx, rx) = tokio::sync::oneshot::channel();

        TokioResetScheduler.schedule(
            Duration::from_secs(5),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        tokio::time::timeout(Duration::from_secs(6), rx)
            .await
            .unwrap()
            .unwrap();
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag owned by one screen activation.
///
/// Asynchronous continuations hold a clone and must check it before touching
/// screen state; once cancelled, their results are stale.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let continuation = token.clone();
        assert!(!continuation.is_cancelled());

        token.cancel();
        assert!(continuation.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}

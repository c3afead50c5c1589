//! Cooperative cancellation for long-running grounding, validation and search.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shared flag that engines poll between units of work (one binding, one plan step, one
/// expansion). Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancellationToken::new();
        let seen_by_engine = token.clone();
        assert!(!seen_by_engine.is_cancelled());
        token.cancel();
        assert!(seen_by_engine.is_cancelled());
    }
}

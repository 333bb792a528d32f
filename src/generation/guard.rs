use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Per-user "generation in progress" flag. At most one plan generation runs
/// for a user at a time; the flag clears when the permit drops, whether the
/// generation succeeded, failed or timed out.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    running: Arc<Mutex<HashSet<String>>>,
}

#[derive(Debug)]
pub struct GenerationPermit {
    user_id: String,
    running: Arc<Mutex<HashSet<String>>>,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another generation for `user_id` holds a permit.
    pub fn try_acquire(&self, user_id: &str) -> Option<GenerationPermit> {
        let mut running = self.running.lock().unwrap_or_else(|p| p.into_inner());
        if !running.insert(user_id.to_string()) {
            return None;
        }
        debug!(user_id = %user_id, "generation permit acquired");
        Some(GenerationPermit {
            user_id: user_id.to_string(),
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self, user_id: &str) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(user_id)
    }
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        let mut running = self.running.lock().unwrap_or_else(|p| p.into_inner());
        running.remove(&self.user_id);
        debug!(user_id = %self.user_id, "generation permit released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let guard = GenerationGuard::new();
        let permit = guard.try_acquire("u").expect("first acquire");
        assert!(guard.try_acquire("u").is_none());
        assert!(guard.is_running("u"));

        drop(permit);
        assert!(!guard.is_running("u"));
        assert!(guard.try_acquire("u").is_some());
    }

    #[test]
    fn users_do_not_block_each_other() {
        let guard = GenerationGuard::new();
        let _a = guard.try_acquire("a").expect("a");
        assert!(guard.try_acquire("b").is_some());
    }
}

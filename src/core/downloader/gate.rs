use std::sync::Arc;

use tokio::sync::watch;

/// Shared open/closed gate checked by transfers at every chunk boundary.
///
/// Clones share one state; toggling works from any thread or task.
#[derive(Debug, Clone)]
pub struct PauseGate {
    open: Arc<watch::Sender<bool>>,
}

impl PauseGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { open: Arc::new(tx) }
    }

    pub fn pause(&self) {
        self.open.send_replace(false);
    }

    pub fn resume(&self) {
        self.open.send_replace(true);
    }

    pub fn is_paused(&self) -> bool {
        !*self.open.borrow()
    }

    /// Resolves immediately while open, otherwise suspends until `resume`.
    pub async fn wait_open(&self) {
        let mut rx = self.open.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn open_gate_does_not_block() {
        let gate = PauseGate::new();
        assert!(!gate.is_paused());
        tokio::time::timeout(Duration::from_millis(100), gate.wait_open())
            .await
            .expect("open gate should not block");
    }

    #[tokio::test]
    async fn paused_gate_blocks_until_resumed_from_another_thread() {
        let gate = PauseGate::new();
        gate.pause();
        assert!(gate.is_paused());

        let blocked = tokio::time::timeout(Duration::from_millis(100), gate.wait_open()).await;
        assert!(blocked.is_err());

        let remote = gate.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            remote.resume();
        });

        tokio::time::timeout(Duration::from_secs(2), gate.wait_open())
            .await
            .expect("resume should release waiters");
        assert!(!gate.is_paused());
    }
}

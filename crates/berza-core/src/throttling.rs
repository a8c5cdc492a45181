//! Shared connection gate for the target host.
//!
//! The exchange site tolerates a limited number of simultaneous connections,
//! so every request in the fleet — regardless of which symbol issues it —
//! passes through one semaphore. This is the only cross-task shared mutable
//! resource in the fetch path.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Global cap on simultaneous in-flight connections to the target host.
pub const MAX_HOST_CONNECTIONS: usize = 10;

/// Semaphore-backed connection budget shared across the whole fleet.
#[derive(Debug, Clone)]
pub struct ConnectionGate {
    permits: Arc<Semaphore>,
}

impl ConnectionGate {
    pub fn new(max_connections: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    /// Wait for connection budget; the returned permit must be held for the
    /// duration of exactly one request.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("connection gate semaphore is never closed")
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for ConnectionGate {
    fn default() -> Self {
        Self::new(MAX_HOST_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permits_are_returned_on_drop() {
        let gate = ConnectionGate::new(2);
        let first = gate.acquire().await;
        let second = gate.acquire().await;
        assert_eq!(gate.available(), 0);

        drop(first);
        assert_eq!(gate.available(), 1);
        drop(second);
        assert_eq!(gate.available(), 2);
    }

    #[test]
    fn zero_budget_is_clamped_to_one() {
        let gate = ConnectionGate::new(0);
        assert_eq!(gate.available(), 1);
    }
}

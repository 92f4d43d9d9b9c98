use log::info;
use tokio::sync::watch;

/// Toggles the node between serving and a simulated freeze.
///
/// A crashed node keeps its storage and ring pointers; it only stops
/// answering. Requests that arrive meanwhile can park on [`Self::wait_recovered`].
#[derive(Debug)]
pub struct FaultSimulator {
    crashed: watch::Sender<bool>,
}

impl Default for FaultSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultSimulator {
    pub fn new() -> Self {
        let (crashed, _) = watch::channel(false);
        Self { crashed }
    }

    pub fn crash(&self) {
        if !self.crashed.send_replace(true) {
            info!("simulating crash");
        }
    }

    pub fn recover(&self) {
        if self.crashed.send_replace(false) {
            info!("recovered from simulated crash");
        }
    }

    pub fn is_crashed(&self) -> bool {
        *self.crashed.borrow()
    }

    pub async fn wait_recovered(&self) {
        let mut rx = self.crashed.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|crashed| !crashed).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};
    use tokio::time::timeout;

    #[test]
    fn test_toggle() {
        let fault = FaultSimulator::new();
        assert!(!fault.is_crashed());

        fault.crash();
        fault.crash();
        assert!(fault.is_crashed());

        fault.recover();
        assert!(!fault.is_crashed());

        // recovering a healthy node is a no-op
        fault.recover();
        assert!(!fault.is_crashed());
    }

    #[tokio::test]
    async fn test_wait_recovered_parks_until_recover() {
        let fault = Arc::new(FaultSimulator::new());
        fault.crash();

        let waiter = {
            let fault = fault.clone();
            tokio::spawn(async move { fault.wait_recovered().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        fault.recover();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_recovered_returns_immediately_when_healthy() {
        let fault = FaultSimulator::new();
        timeout(Duration::from_millis(100), fault.wait_recovered())
            .await
            .expect("healthy node should not park");
    }
}

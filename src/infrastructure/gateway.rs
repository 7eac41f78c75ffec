use crate::domain::ports::PaymentGateway;
use crate::domain::receipt::PaymentRequest;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Stand-in for an external payment backend.
///
/// Sleeps for a configurable latency and succeeds. Real gateway integration
/// is out of scope; tests script transient failures through their own
/// `PaymentGateway` implementations.
#[derive(Clone)]
pub struct SimulatedGateway {
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(20))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn process(&self, request: &PaymentRequest) -> Result<()> {
        tokio::time::sleep(self.latency).await;
        debug!(receipt_id = %request.id, "simulated gateway accepted request");
        Ok(())
    }
}

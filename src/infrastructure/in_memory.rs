use crate::domain::ports::ReceiptStore;
use crate::domain::receipt::{PaymentReceipt, ReceiptId, ReceiptStatus};
use crate::error::{KeyraError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment receipts.
///
/// Uses `Arc<RwLock<HashMap<ReceiptId, PaymentReceipt>>>` for shared
/// concurrent access. Suitable for tests and single-process deployments;
/// contents are lost on restart.
#[derive(Default, Clone)]
pub struct InMemoryReceiptStore {
    receipts: Arc<RwLock<HashMap<ReceiptId, PaymentReceipt>>>,
}

impl InMemoryReceiptStore {
    /// Creates a new, empty in-memory receipt store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
    async fn save(&self, receipt: PaymentReceipt) -> Result<()> {
        let mut receipts = self.receipts.write().await;
        receipts.insert(receipt.id.clone(), receipt);
        Ok(())
    }

    async fn update_status(
        &self,
        id: &ReceiptId,
        status: ReceiptStatus,
        admin_notes: Option<String>,
    ) -> Result<PaymentReceipt> {
        let mut receipts = self.receipts.write().await;
        let receipt = receipts
            .get_mut(id)
            .ok_or_else(|| KeyraError::ReceiptNotFound(id.to_string()))?;
        receipt.transition(status, admin_notes)?;
        Ok(receipt.clone())
    }

    async fn find_by_id(&self, id: &ReceiptId) -> Result<Option<PaymentReceipt>> {
        let receipts = self.receipts.read().await;
        Ok(receipts.get(id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<PaymentReceipt>> {
        let receipts = self.receipts.read().await;
        Ok(receipts
            .values()
            .filter(|r| !r.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<PaymentReceipt>> {
        let receipts = self.receipts.read().await;
        Ok(receipts.values().cloned().collect())
    }
}

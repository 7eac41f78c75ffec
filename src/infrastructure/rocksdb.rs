use crate::domain::ports::ReceiptStore;
use crate::domain::receipt::{PaymentReceipt, ReceiptId, ReceiptStatus};
use crate::error::{KeyraError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment receipts.
pub const CF_RECEIPTS: &str = "receipts";

/// A persistent receipt store backed by RocksDB.
///
/// Receipts are keyed by their id and stored as JSON. This is the durability
/// boundary of the pipeline: receipts survive restarts even though the
/// processing queue does not.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbReceiptStore {
    db: Arc<DB>,
}

impl RocksDbReceiptStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_receipts = ColumnFamilyDescriptor::new(CF_RECEIPTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_receipts])
            .map_err(|e| KeyraError::Storage(Box::new(e)))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_RECEIPTS).ok_or_else(|| {
            KeyraError::Storage(Box::new(std::io::Error::other(
                "receipts column family not found",
            )))
        })
    }

    fn put(&self, receipt: &PaymentReceipt) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(receipt).map_err(|e| KeyraError::Storage(Box::new(e)))?;
        self.db
            .put_cf(cf, receipt.id.as_str().as_bytes(), value)
            .map_err(|e| KeyraError::Storage(Box::new(e)))?;
        Ok(())
    }

    fn fetch(&self, id: &ReceiptId) -> Result<Option<PaymentReceipt>> {
        let cf = self.cf()?;
        let result = self
            .db
            .get_cf(cf, id.as_str().as_bytes())
            .map_err(|e| KeyraError::Storage(Box::new(e)))?;
        match result {
            Some(bytes) => {
                let receipt = serde_json::from_slice(&bytes)
                    .map_err(|e| KeyraError::Storage(Box::new(e)))?;
                Ok(Some(receipt))
            }
            None => Ok(None),
        }
    }

    fn scan(&self) -> Result<Vec<PaymentReceipt>> {
        let cf = self.cf()?;
        let mut receipts = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| KeyraError::Storage(Box::new(e)))?;
            let receipt: PaymentReceipt =
                serde_json::from_slice(&value).map_err(|e| KeyraError::Storage(Box::new(e)))?;
            receipts.push(receipt);
        }
        Ok(receipts)
    }
}

#[async_trait]
impl ReceiptStore for RocksDbReceiptStore {
    async fn save(&self, receipt: PaymentReceipt) -> Result<()> {
        self.put(&receipt)
    }

    async fn update_status(
        &self,
        id: &ReceiptId,
        status: ReceiptStatus,
        admin_notes: Option<String>,
    ) -> Result<PaymentReceipt> {
        let mut receipt = self
            .fetch(id)?
            .ok_or_else(|| KeyraError::ReceiptNotFound(id.to_string()))?;
        receipt.transition(status, admin_notes)?;
        self.put(&receipt)?;
        Ok(receipt)
    }

    async fn find_by_id(&self, id: &ReceiptId) -> Result<Option<PaymentReceipt>> {
        self.fetch(id)
    }

    async fn list_pending(&self) -> Result<Vec<PaymentReceipt>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|r| !r.status.is_terminal())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<PaymentReceipt>> {
        self.scan()
    }
}

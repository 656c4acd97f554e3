use std::collections::HashMap;

use async_trait::async_trait;
use faucet_claim_types::{ClaimRecord, Identity, RecordError};
use tokio::sync::RwLock;
use tracing::debug;

use super::ClaimRecordStore;

/// Process-local records. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    records: RwLock<HashMap<String, ClaimRecord>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ClaimRecordStore for InMemoryClaimStore {
    async fn get(&self, identity: &Identity) -> Result<Option<ClaimRecord>, RecordError> {
        Ok(self.records.read().await.get(&identity.key()).copied())
    }

    async fn record(&self, identity: &Identity, at: u64) -> Result<(), RecordError> {
        let key = identity.key();
        debug!(identity = %key, at, "recording claim");
        self.records
            .write()
            .await
            .insert(key, ClaimRecord::claimed_at(at));
        Ok(())
    }
}

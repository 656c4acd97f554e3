//! Systems of record for prior claims.

mod chain;
mod memory;

pub use chain::ChainClaimRecords;
pub use memory::InMemoryClaimStore;

use async_trait::async_trait;
use faucet_claim_types::{ClaimRecord, Identity, RecordError};

#[async_trait]
pub trait ClaimRecordStore: Send + Sync {
    /// `Ok(None)` means the identity has never claimed.
    async fn get(&self, identity: &Identity) -> Result<Option<ClaimRecord>, RecordError>;

    /// Mark a completed claim at unix time `at`.
    async fn record(&self, identity: &Identity, at: u64) -> Result<(), RecordError>;
}

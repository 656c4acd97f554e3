//! Faucet claim attestor.
//!
//! Decides whether an identity may claim, prices the claim in the payout asset against a USD
//! target and signs the EIP-191 attestation the faucet contract verifies before paying out.

pub mod attestation;
pub mod chain;
pub mod claim;
pub mod constants;
pub mod eligibility;
pub mod errors;
pub mod oracle;
pub mod payout;
pub mod store;
pub mod utils;

pub use attestation::{Attestation, AttestationSigner};
pub use claim::{
    AmountReview, ClaimGrant, ClaimPolicy, ClaimRequest, ClaimService, ClaimSettings,
    EligibilityReport,
};
pub use errors::{AttestationError, ChainError, ClaimError, OracleError, PayoutError, TransportError};
pub use payout::Recommendation;

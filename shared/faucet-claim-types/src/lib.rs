//! Shared types for claim identities, policies, records, prices and fixed-point values.

pub mod decimal;
pub mod identity;
pub mod policy;
pub mod price;
pub mod records;

pub use decimal::{Wad, WadError};
pub use identity::{parse_wallet, Fid, Identity, IdentityError, IdentityHashScheme};
pub use policy::{ClaimRecord, ClaimStrategy, ClaimWindow, Eligibility, COOLDOWN_SECS};
pub use price::{PriceAsset, PriceQuote, PriceSource};
pub use records::RecordError;

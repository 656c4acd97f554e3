pub mod bytes;
pub mod crypto;
pub mod http;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock unix seconds; a clock before 1970 reads as zero.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Errors during payout conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayoutError {
    #[error("price must be positive")]
    InvalidPrice,
    #[error("target fiat value must be positive")]
    InvalidTarget,
    #[error("arithmetic overflow converting payout")]
    Overflow,
}

/// Errors during attestation construction, signing or recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttestationError {
    #[error("{field} must be exactly {expected} bytes, got {actual}")]
    InvalidInputLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid hex in {0}")]
    InvalidHex(&'static str),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("signing failed")]
    SigningFailed,
    #[error("signature does not recover to a public key")]
    RecoveryFailed,
}

/// HTTP-level failures shared by the price feed and the JSON-RPC client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("config error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status} body={body}")]
    HttpStatus { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors from the price feed. Never surfaced to clients; the oracle falls back instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("price feed has no usd quote for {0}")]
    MissingQuote(&'static str),
    #[error("price feed returned an unusable price: {0}")]
    InvalidPrice(String),
    #[error("fallback price must be a positive decimal, got {0:?}")]
    InvalidFallback(String),
}

/// Errors talking to the chain node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("abi decode error: {0}")]
    Decode(String),
    #[error("transaction submission failed: {0}")]
    Submit(String),
}

/// Everything a claim request can fail with, grouped by how the caller should react.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    /// Malformed address, id or amount; user-correctable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Price feed or chain node failure that could not be recovered locally.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Policy says no (yet).
    #[error("not eligible to claim yet")]
    NotEligible { seconds_until_claim: u64 },
    /// Missing key, contract address or similar; needs an operator.
    #[error("server misconfiguration: {0}")]
    ServerMisconfiguration(String),
}

impl From<PayoutError> for ClaimError {
    fn from(err: PayoutError) -> Self {
        ClaimError::InvalidInput(err.to_string())
    }
}

impl From<AttestationError> for ClaimError {
    fn from(err: AttestationError) -> Self {
        match err {
            AttestationError::InvalidInputLength { .. } | AttestationError::InvalidHex(_) => {
                ClaimError::InvalidInput(err.to_string())
            }
            AttestationError::InvalidKey
            | AttestationError::SigningFailed
            | AttestationError::RecoveryFailed => {
                ClaimError::ServerMisconfiguration(err.to_string())
            }
        }
    }
}

impl From<ChainError> for ClaimError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Config(msg) | ChainError::Transport(TransportError::Config(msg)) => {
                ClaimError::ServerMisconfiguration(msg)
            }
            other => ClaimError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<OracleError> for ClaimError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::InvalidFallback(_) => ClaimError::ServerMisconfiguration(err.to_string()),
            other => ClaimError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<faucet_claim_types::RecordError> for ClaimError {
    fn from(err: faucet_claim_types::RecordError) -> Self {
        use faucet_claim_types::RecordError;
        match err {
            RecordError::ReadOnly => ClaimError::ServerMisconfiguration(err.to_string()),
            RecordError::Unsupported(_) => ClaimError::InvalidInput(err.to_string()),
            RecordError::Unavailable(_) => ClaimError::UpstreamUnavailable(err.to_string()),
        }
    }
}

/// Fixed protocol cooldown between claims (48h).
pub const COOLDOWN_SECS: u64 = 172_800;

/// Claim gating policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimWindow {
    /// At most one claim, ever.
    OneTime,
    /// One claim per `interval_secs`.
    Cooldown { interval_secs: u64 },
}

impl ClaimWindow {
    pub const fn protocol_cooldown() -> Self {
        ClaimWindow::Cooldown {
            interval_secs: COOLDOWN_SECS,
        }
    }
}

impl TryFrom<&str> for ClaimWindow {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "one-time" => Ok(ClaimWindow::OneTime),
            "cooldown" => Ok(ClaimWindow::protocol_cooldown()),
            other => Err(format!("unknown claim window: {other}")),
        }
    }
}

/// Prior-claim state for one identity, as reported by the system of record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimRecord {
    pub has_claimed: bool,
    /// Unix seconds of the most recent claim.
    pub last_claim_time: Option<u64>,
}

impl ClaimRecord {
    pub fn claimed_at(at: u64) -> Self {
        Self {
            has_claimed: true,
            last_claim_time: Some(at),
        }
    }
}

/// Outcome of evaluating a policy against a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eligibility {
    pub eligible: bool,
    pub seconds_remaining: u64,
}

impl Eligibility {
    pub const ELIGIBLE: Eligibility = Eligibility {
        eligible: true,
        seconds_remaining: 0,
    };
}

/// Deployment variant for how an attested claim reaches the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClaimStrategy {
    /// Client submits the attestation itself.
    #[default]
    Direct,
    /// Server submits the attested claim with its relayer key.
    RelayerSigned,
    /// Client submits through a sponsored smart account.
    SmartAccountSponsored,
}

impl ClaimStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStrategy::Direct => "direct",
            ClaimStrategy::RelayerSigned => "relayer-signed",
            ClaimStrategy::SmartAccountSponsored => "smart-account-sponsored",
        }
    }
}

impl TryFrom<&str> for ClaimStrategy {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "direct" => Ok(ClaimStrategy::Direct),
            "relayer-signed" => Ok(ClaimStrategy::RelayerSigned),
            "smart-account-sponsored" => Ok(ClaimStrategy::SmartAccountSponsored),
            other => Err(format!("unknown claim strategy: {other}")),
        }
    }
}

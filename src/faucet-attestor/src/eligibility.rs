use faucet_claim_types::{ClaimRecord, ClaimWindow, Eligibility};

/// Evaluate one policy against a prior-claim record.
///
/// A missing record means the identity never claimed.
pub fn evaluate(policy: ClaimWindow, record: Option<&ClaimRecord>, now: u64) -> Eligibility {
    let record = record.copied().unwrap_or_default();
    match policy {
        ClaimWindow::OneTime => Eligibility {
            eligible: !record.has_claimed,
            seconds_remaining: 0,
        },
        ClaimWindow::Cooldown { interval_secs } => {
            let seconds_remaining = match record.last_claim_time {
                Some(last) => last.saturating_add(interval_secs).saturating_sub(now),
                None => 0,
            };
            Eligibility {
                eligible: seconds_remaining == 0,
                seconds_remaining,
            }
        }
    }
}

/// A policy paired with the record it applies to.
#[derive(Clone, Copy, Debug)]
pub struct Gate<'a> {
    pub policy: ClaimWindow,
    pub record: Option<&'a ClaimRecord>,
}

/// Combine independent gates: every gate must pass, and the caller waits for the latest one.
pub fn evaluate_all(gates: &[Gate<'_>], now: u64) -> Eligibility {
    gates
        .iter()
        .map(|gate| evaluate(gate.policy, gate.record, now))
        .fold(Eligibility::ELIGIBLE, |acc, e| Eligibility {
            eligible: acc.eligible && e.eligible,
            seconds_remaining: acc.seconds_remaining.max(e.seconds_remaining),
        })
}

/// Identity-level and wallet-level gates combined.
pub fn evaluate_dual(identity: Gate<'_>, wallet: Gate<'_>, now: u64) -> Eligibility {
    evaluate_all(&[identity, wallet], now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faucet_claim_types::COOLDOWN_SECS;

    const T: u64 = 1_700_000_000;

    #[test]
    fn one_time_is_terminal() {
        let claimed = ClaimRecord::claimed_at(T);
        for now in [T, T + 1, T + COOLDOWN_SECS, T + 10 * COOLDOWN_SECS, u64::MAX] {
            let e = evaluate(ClaimWindow::OneTime, Some(&claimed), now);
            assert!(!e.eligible);
            assert_eq!(e.seconds_remaining, 0);
        }
        assert_eq!(evaluate(ClaimWindow::OneTime, None, T), Eligibility::ELIGIBLE);
    }

    #[test]
    fn cooldown_boundary() {
        let record = ClaimRecord::claimed_at(T);
        let policy = ClaimWindow::Cooldown {
            interval_secs: 172_800,
        };

        let at_boundary = evaluate(policy, Some(&record), T + 172_800);
        assert!(at_boundary.eligible);
        assert_eq!(at_boundary.seconds_remaining, 0);

        let one_before = evaluate(policy, Some(&record), T + 172_799);
        assert!(!one_before.eligible);
        assert_eq!(one_before.seconds_remaining, 1);
    }

    #[test]
    fn cooldown_countdown_is_strictly_decreasing_until_zero() {
        let record = ClaimRecord::claimed_at(T);
        let policy = ClaimWindow::protocol_cooldown();
        let mut previous = u64::MAX;
        for now in (T..=T + COOLDOWN_SECS).step_by(3_601) {
            let remaining = evaluate(policy, Some(&record), now).seconds_remaining;
            assert!(remaining < previous);
            previous = remaining;
        }
        assert_eq!(
            evaluate(policy, Some(&record), T + COOLDOWN_SECS + 5).seconds_remaining,
            0
        );
    }

    #[test]
    fn clock_behind_last_claim_does_not_underflow() {
        let record = ClaimRecord::claimed_at(T);
        let e = evaluate(ClaimWindow::protocol_cooldown(), Some(&record), T - 10);
        assert_eq!(e.seconds_remaining, COOLDOWN_SECS + 10);
    }

    #[test]
    fn missing_record_is_never_claimed() {
        assert_eq!(
            evaluate(ClaimWindow::protocol_cooldown(), None, T),
            Eligibility::ELIGIBLE
        );
        let flagged_without_time = ClaimRecord {
            has_claimed: true,
            last_claim_time: None,
        };
        assert!(evaluate(ClaimWindow::protocol_cooldown(), Some(&flagged_without_time), T).eligible);
    }

    #[test]
    fn dual_gate_waits_for_the_later_window() {
        let interval = 1_000;
        let policy = ClaimWindow::Cooldown {
            interval_secs: interval,
        };
        let now = T;
        // identity: 100s left, wallet: 50s left
        let identity_record = ClaimRecord::claimed_at(now - interval + 100);
        let wallet_record = ClaimRecord::claimed_at(now - interval + 50);

        let e = evaluate_dual(
            Gate {
                policy,
                record: Some(&identity_record),
            },
            Gate {
                policy,
                record: Some(&wallet_record),
            },
            now,
        );
        assert!(!e.eligible);
        assert_eq!(e.seconds_remaining, 100);
    }

    #[test]
    fn dual_gate_requires_both() {
        let claimed = ClaimRecord::claimed_at(T);
        let e = evaluate_dual(
            Gate {
                policy: ClaimWindow::OneTime,
                record: None,
            },
            Gate {
                policy: ClaimWindow::OneTime,
                record: Some(&claimed),
            },
            T,
        );
        assert!(!e.eligible);
        assert_eq!(e.seconds_remaining, 0);
        assert_eq!(evaluate_all(&[], T), Eligibility::ELIGIBLE);
    }
}

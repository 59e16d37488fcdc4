use alloy::primitives::TxHash;
use std::fmt;

/// Terminal state of one submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Included with a success status
    Confirmed { hash: TxHash },
    /// Included but reverted
    Reverted { hash: TxHash },
    /// Broadcast, no receipt before the deadline. May still land later.
    TimedOut { hash: TxHash },
    /// Signing or broadcast failed
    SubmissionFailed { hash: Option<TxHash>, reason: String },
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed { .. })
    }

    pub fn hash(&self) -> Option<TxHash> {
        match self {
            TransactionOutcome::Confirmed { hash }
            | TransactionOutcome::Reverted { hash }
            | TransactionOutcome::TimedOut { hash } => Some(*hash),
            TransactionOutcome::SubmissionFailed { hash, .. } => *hash,
        }
    }
}

/// Why a contract call could not be sized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertKind {
    /// The airdrop already recorded this account as claimed
    AlreadyClaimed,
    /// Not enough native balance for value plus gas
    InsufficientFunds,
    /// Anything else, with the raw error
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimFailure {
    NotEligible,
    Eligibility(String),
    InsufficientFunds,
    Other(String),
    Transaction(TransactionOutcome),
}

impl fmt::Display for ClaimFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimFailure::NotEligible => write!(f, "not eligible"),
            ClaimFailure::Eligibility(e) => write!(f, "{e}"),
            ClaimFailure::InsufficientFunds => write!(f, "insufficient funds for claim"),
            ClaimFailure::Other(e) => write!(f, "{e}"),
            ClaimFailure::Transaction(outcome) => write!(f, "claim transaction {outcome:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success { hash: TxHash },
    AlreadyClaimed,
    Failure(ClaimFailure),
}

impl ClaimOutcome {
    /// Whether the sweeps should run
    pub fn allows_sweep(&self) -> bool {
        matches!(self, ClaimOutcome::Success { .. } | ClaimOutcome::AlreadyClaimed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepFailure {
    ZeroBalance,
    InsufficientAfterGas,
    Rpc(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Submitted(TransactionOutcome),
    Failure(SweepFailure),
}

impl SweepOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SweepOutcome::Submitted(outcome) if outcome.is_confirmed())
    }
}

/// What happened to one account, for the end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PipelineResult {
    ClaimedAndSwept,
    ClaimedSweepPartial,
    AlreadyClaimed,
    NotEligible,
    ClaimFailed,
    SkippedInvalidInput,
    Errored,
}

impl PipelineResult {
    pub const ALL: [PipelineResult; 7] = [
        PipelineResult::ClaimedAndSwept,
        PipelineResult::ClaimedSweepPartial,
        PipelineResult::AlreadyClaimed,
        PipelineResult::NotEligible,
        PipelineResult::ClaimFailed,
        PipelineResult::SkippedInvalidInput,
        PipelineResult::Errored,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineResult::ClaimedAndSwept => "claimed_and_swept",
            PipelineResult::ClaimedSweepPartial => "claimed_sweep_partial",
            PipelineResult::AlreadyClaimed => "already_claimed",
            PipelineResult::NotEligible => "not_eligible",
            PipelineResult::ClaimFailed => "claim_failed",
            PipelineResult::SkippedInvalidInput => "skipped_invalid_input",
            PipelineResult::Errored => "errored",
        }
    }

    /// Map a finished account. `sweeps` is empty when the claim did not allow them.
    pub fn from_outcomes(claim: &ClaimOutcome, sweeps: &[SweepOutcome]) -> Self {
        match claim {
            ClaimOutcome::AlreadyClaimed => PipelineResult::AlreadyClaimed,
            ClaimOutcome::Success { .. }
                if !sweeps.is_empty() && sweeps.iter().all(SweepOutcome::is_confirmed) =>
            {
                PipelineResult::ClaimedAndSwept
            }
            ClaimOutcome::Success { .. } => PipelineResult::ClaimedSweepPartial,
            ClaimOutcome::Failure(ClaimFailure::NotEligible) => PipelineResult::NotEligible,
            ClaimOutcome::Failure(_) => PipelineResult::ClaimFailed,
        }
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed() -> SweepOutcome {
        SweepOutcome::Submitted(TransactionOutcome::Confirmed {
            hash: TxHash::repeat_byte(1),
        })
    }

    #[test]
    fn success_with_both_sweeps_is_fully_swept() {
        let claim = ClaimOutcome::Success {
            hash: TxHash::repeat_byte(9),
        };
        assert_eq!(
            PipelineResult::from_outcomes(&claim, &[confirmed(), confirmed()]),
            PipelineResult::ClaimedAndSwept
        );
    }

    #[test]
    fn success_with_a_failed_sweep_is_partial() {
        let claim = ClaimOutcome::Success {
            hash: TxHash::repeat_byte(9),
        };
        let zero = SweepOutcome::Failure(SweepFailure::ZeroBalance);
        assert_eq!(
            PipelineResult::from_outcomes(&claim, &[zero, confirmed()]),
            PipelineResult::ClaimedSweepPartial
        );
    }

    #[test]
    fn not_eligible_maps_to_its_own_result() {
        let claim = ClaimOutcome::Failure(ClaimFailure::NotEligible);
        assert_eq!(
            PipelineResult::from_outcomes(&claim, &[]),
            PipelineResult::NotEligible
        );
        assert!(!claim.allows_sweep());
        assert!(ClaimOutcome::AlreadyClaimed.allows_sweep());
    }

    #[test]
    fn success_without_sweeps_is_partial() {
        let claim = ClaimOutcome::Success {
            hash: TxHash::repeat_byte(9),
        };
        assert_eq!(
            PipelineResult::from_outcomes(&claim, &[]),
            PipelineResult::ClaimedSweepPartial
        );
    }

    #[test]
    fn outcome_hash_is_exposed() {
        let hash = TxHash::repeat_byte(3);
        assert_eq!(TransactionOutcome::TimedOut { hash }.hash(), Some(hash));
        assert_eq!(
            TransactionOutcome::SubmissionFailed {
                hash: None,
                reason: "nonce too low".into()
            }
            .hash(),
            None
        );
    }
}

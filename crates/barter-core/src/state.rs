use std::str::FromStr;

use barter_types::models::{ProposalAction, ProposalStatus};

use crate::error::{ExchangeError, ExchangeResult};

/// Which (status, action) pairs are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// `accept`/`reject` only from `waiting`, `recreate` from `waiting` or
    /// `rejected`. `accepted` is final.
    #[default]
    Strict,
    /// Any action from any status.
    Permissive,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            other => Err(format!("unknown transition policy: {other}")),
        }
    }
}

/// Outcome of applying an action to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: ProposalStatus,
    /// Sender and receiver trade places.
    pub swap: bool,
}

pub fn transition(
    from: ProposalStatus,
    action: ProposalAction,
    policy: TransitionPolicy,
) -> ExchangeResult<Transition> {
    use barter_types::models::ProposalAction::*;
    use barter_types::models::ProposalStatus::*;

    let allowed = match policy {
        TransitionPolicy::Permissive => true,
        TransitionPolicy::Strict => matches!(
            (from, action),
            (Waiting, Accept) | (Waiting, Reject) | (Waiting, Recreate) | (Rejected, Recreate)
        ),
    };
    if !allowed {
        return Err(ExchangeError::InvalidTransition { from, action });
    }

    Ok(match action {
        Accept => Transition { status: Accepted, swap: false },
        Reject => Transition { status: Rejected, swap: false },
        Recreate => Transition { status: Waiting, swap: true },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use barter_types::models::ProposalAction::*;
    use barter_types::models::ProposalStatus::*;

    #[test]
    fn strict_allows_resolution_from_waiting_only() {
        let p = TransitionPolicy::Strict;
        assert_eq!(transition(Waiting, Accept, p).unwrap().status, Accepted);
        assert_eq!(transition(Waiting, Reject, p).unwrap().status, Rejected);

        for from in [Accepted, Rejected] {
            for action in [Accept, Reject] {
                assert!(matches!(
                    transition(from, action, p),
                    Err(ExchangeError::InvalidTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn strict_recreate_reopens_and_swaps() {
        let p = TransitionPolicy::Strict;
        for from in [Waiting, Rejected] {
            let t = transition(from, Recreate, p).unwrap();
            assert_eq!(t, Transition { status: Waiting, swap: true });
        }
        assert!(transition(Accepted, Recreate, p).is_err());
    }

    #[test]
    fn permissive_accepts_everything() {
        let p = TransitionPolicy::Permissive;
        for from in [Waiting, Accepted, Rejected] {
            assert_eq!(transition(from, Accept, p).unwrap().status, Accepted);
            assert_eq!(transition(from, Reject, p).unwrap().status, Rejected);
            assert!(transition(from, Recreate, p).unwrap().swap);
        }
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Strict".parse::<TransitionPolicy>(), Ok(TransitionPolicy::Strict));
        assert_eq!(" permissive ".parse::<TransitionPolicy>(), Ok(TransitionPolicy::Permissive));
        assert!("loose".parse::<TransitionPolicy>().is_err());
    }
}

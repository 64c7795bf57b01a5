//! Optimistic toggle engine, shared by the like and follow buttons.
//!
//! Per control the lifecycle is Idle -> Pending -> {Reconciled,
//! RolledBack} -> Idle. A second trigger while Pending is dropped, not
//! queued. Every settlement re-enables the triggering control; `begin`
//! disables it.

use super::toast::Toast;
use super::{MutationOutcome, GENERIC_FAILURE, LOGIN_REQUIRED};
use std::collections::HashMap;

/// The flag + count pair a toggle control renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    pub active: bool,
    pub count: u64,
}

impl ToggleState {
    pub fn new(active: bool, count: u64) -> Self {
        ToggleState { active, count }
    }

    /// Flip the flag; count moves with it, clamped at zero.
    fn flipped(self) -> Self {
        if self.active {
            ToggleState::new(false, self.count.saturating_sub(1))
        } else {
            ToggleState::new(true, self.count + 1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Server truth adopted; may differ from the optimistic guess.
    Reconciled(ToggleState),
    /// Pre-optimistic snapshot restored.
    RolledBack(ToggleState),
    /// Cancellation: the current (optimistic) state stands untouched.
    Kept,
}

/// What the caller applies when a pending mutation resolves. The control
/// is re-enabled on every settlement, whatever the disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub disposition: Disposition,
    pub toast: Option<Toast>,
}

#[derive(Debug, Default)]
pub struct ToggleEngine {
    /// Pre-optimistic snapshot per in-flight identifier.
    pending: HashMap<String, ToggleState>,
}

impl ToggleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Starts a toggle. Returns the optimistic state to render (the caller
    /// also disables the control), or `None` when a mutation for this
    /// identifier is already outstanding.
    pub fn begin(&mut self, id: &str, current: ToggleState) -> Option<ToggleState> {
        if self.pending.contains_key(id) {
            return None;
        }
        self.pending.insert(id.to_string(), current);
        Some(current.flipped())
    }

    /// Resolves a pending toggle. Returns `None` when nothing is pending
    /// for this identifier.
    pub fn settle(
        &mut self,
        id: &str,
        outcome: MutationOutcome<ToggleState>,
    ) -> Option<Settlement> {
        let snapshot = self.pending.remove(id)?;

        let settlement = match outcome {
            MutationOutcome::Success(server) => Settlement {
                disposition: Disposition::Reconciled(server),
                toast: None,
            },
            MutationOutcome::AuthRequired => Settlement {
                disposition: Disposition::RolledBack(snapshot),
                toast: Some(Toast::info(LOGIN_REQUIRED)),
            },
            MutationOutcome::Invalid(message) | MutationOutcome::ServerFault(message) => {
                Settlement {
                    disposition: Disposition::RolledBack(snapshot),
                    toast: Some(Toast::error(message.unwrap_or_else(|| {
                        GENERIC_FAILURE.to_string()
                    }))),
                }
            }
            MutationOutcome::NotFound => Settlement {
                disposition: Disposition::RolledBack(snapshot),
                toast: Some(Toast::error("That item no longer exists.")),
            },
            MutationOutcome::Malformed | MutationOutcome::NetworkFailure => Settlement {
                disposition: Disposition::RolledBack(snapshot),
                toast: Some(Toast::error(GENERIC_FAILURE)),
            },
            MutationOutcome::Aborted => Settlement {
                disposition: Disposition::Kept,
                toast: None,
            },
        };
        Some(settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ToastLevel;

    #[test]
    fn optimistic_on_then_off_returns_to_origin() {
        let mut engine = ToggleEngine::new();
        let origin = ToggleState::new(false, 3);

        let on = engine.begin("pin-1", origin).unwrap();
        assert_eq!(on, ToggleState::new(true, 4));
        engine.settle("pin-1", MutationOutcome::Success(on)).unwrap();

        let off = engine.begin("pin-1", on).unwrap();
        assert_eq!(off, origin);
        engine.settle("pin-1", MutationOutcome::Success(off)).unwrap();
    }

    #[test]
    fn second_trigger_while_pending_is_dropped() {
        let mut engine = ToggleEngine::new();
        let state = ToggleState::new(false, 0);

        assert!(engine.begin("pin-1", state).is_some());
        assert!(engine.begin("pin-1", ToggleState::new(true, 1)).is_none());
        // A different identifier is unaffected.
        assert!(engine.begin("pin-2", state).is_some());
    }

    #[test]
    fn auth_required_rolls_back_with_login_toast() {
        let mut engine = ToggleEngine::new();
        let origin = ToggleState::new(false, 7);
        engine.begin("pin-1", origin).unwrap();

        let settlement = engine
            .settle("pin-1", MutationOutcome::AuthRequired)
            .unwrap();
        assert_eq!(settlement.disposition, Disposition::RolledBack(origin));
        let toast = settlement.toast.unwrap();
        assert_eq!(toast.level, ToastLevel::Info);
        assert!(toast.message.to_lowercase().contains("log in"));
        assert!(!engine.is_pending("pin-1"));
    }

    #[test]
    fn malformed_response_rolls_back_with_generic_toast() {
        let mut engine = ToggleEngine::new();
        let origin = ToggleState::new(true, 2);
        engine.begin("pin-1", origin).unwrap();

        let settlement = engine.settle("pin-1", MutationOutcome::Malformed).unwrap();
        assert_eq!(settlement.disposition, Disposition::RolledBack(origin));
        assert_eq!(settlement.toast.unwrap().level, ToastLevel::Error);
    }

    #[test]
    fn server_error_message_is_surfaced_verbatim() {
        let mut engine = ToggleEngine::new();
        engine.begin("pin-1", ToggleState::new(false, 0)).unwrap();

        let settlement = engine
            .settle(
                "pin-1",
                MutationOutcome::Invalid(Some("You cannot follow yourself".to_string())),
            )
            .unwrap();
        assert_eq!(
            settlement.toast.unwrap().message,
            "You cannot follow yourself"
        );
    }

    #[test]
    fn server_truth_wins_over_optimistic_guess() {
        let mut engine = ToggleEngine::new();
        engine.begin("pin-1", ToggleState::new(false, 3)).unwrap();

        // Another session liked it meanwhile; the server count disagrees
        // with the optimistic +1.
        let server = ToggleState::new(true, 5);
        let settlement = engine
            .settle("pin-1", MutationOutcome::Success(server))
            .unwrap();
        assert_eq!(settlement.disposition, Disposition::Reconciled(server));
    }

    #[test]
    fn abort_keeps_optimistic_state_silently() {
        let mut engine = ToggleEngine::new();
        engine.begin("pin-1", ToggleState::new(false, 1)).unwrap();

        let settlement = engine.settle("pin-1", MutationOutcome::Aborted).unwrap();
        assert_eq!(settlement.disposition, Disposition::Kept);
        assert!(settlement.toast.is_none());
        // The slot is free again.
        assert!(engine.begin("pin-1", ToggleState::new(true, 2)).is_some());
    }

    #[test]
    fn turning_off_at_zero_count_clamps() {
        let mut engine = ToggleEngine::new();
        // A stale UI can show active with count zero.
        let next = engine.begin("pin-1", ToggleState::new(true, 0)).unwrap();
        assert_eq!(next, ToggleState::new(false, 0));
    }

    #[test]
    fn settling_an_unknown_identifier_is_a_no_op() {
        let mut engine = ToggleEngine::new();
        assert!(engine
            .settle("ghost", MutationOutcome::<ToggleState>::NetworkFailure)
            .is_none());
    }
}

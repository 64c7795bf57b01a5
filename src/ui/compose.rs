//! Speculative comment submission. Same shape as the toggle engine, but
//! instead of flipping a flag it appends a placeholder entry under a
//! temporary local id; settlement either swaps the placeholder for the
//! server-confirmed comment or removes it and gives the counter back.

use super::toast::Toast;
use super::{MutationOutcome, GENERIC_FAILURE, LOGIN_REQUIRED};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeculativeComment {
    /// Temporary id the placeholder DOM node is keyed by.
    pub local_id: String,
    pub pin_id: String,
    pub text: String,
}

/// Server confirmation for an accepted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAck {
    pub comment_id: String,
    pub comment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Empty after trimming: no request, no list mutation, no counter bump.
    EmptyText,
    /// A comment for this pin is already in flight.
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeResolution {
    /// Replace the placeholder with the confirmed entry and adopt the
    /// server's count.
    Confirmed(CommentAck),
    /// Remove the placeholder and decrement the dependent counter.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeSettlement {
    pub local_id: String,
    pub resolution: ComposeResolution,
    pub toast: Option<Toast>,
}

#[derive(Debug, Default)]
pub struct CommentComposer {
    pending: HashMap<String, SpeculativeComment>,
    next_local: u64,
}

impl CommentComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, pin_id: &str) -> bool {
        self.pending.contains_key(pin_id)
    }

    /// Validates and registers a speculative comment. The caller appends
    /// the returned entry to the rendered list and bumps the counter.
    pub fn begin(&mut self, pin_id: &str, raw_text: &str) -> Result<SpeculativeComment, ComposeError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ComposeError::EmptyText);
        }
        if self.pending.contains_key(pin_id) {
            return Err(ComposeError::AlreadyPending);
        }

        self.next_local += 1;
        let speculative = SpeculativeComment {
            local_id: format!("local-{}", self.next_local),
            pin_id: pin_id.to_string(),
            text: text.to_string(),
        };
        self.pending.insert(pin_id.to_string(), speculative.clone());
        Ok(speculative)
    }

    pub fn settle(
        &mut self,
        pin_id: &str,
        outcome: MutationOutcome<CommentAck>,
    ) -> Option<ComposeSettlement> {
        let speculative = self.pending.remove(pin_id)?;

        let (resolution, toast) = match outcome {
            MutationOutcome::Success(ack) => (ComposeResolution::Confirmed(ack), None),
            MutationOutcome::AuthRequired => (
                ComposeResolution::Discarded,
                Some(Toast::info(LOGIN_REQUIRED)),
            ),
            MutationOutcome::Invalid(message) | MutationOutcome::ServerFault(message) => (
                ComposeResolution::Discarded,
                Some(Toast::error(
                    message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                )),
            ),
            MutationOutcome::NotFound => (
                ComposeResolution::Discarded,
                Some(Toast::error("That pin no longer exists.")),
            ),
            MutationOutcome::Malformed | MutationOutcome::NetworkFailure => (
                ComposeResolution::Discarded,
                Some(Toast::error(GENERIC_FAILURE)),
            ),
            // No explicit cancellation path for comments; a swallowed
            // request still clears the placeholder.
            MutationOutcome::Aborted => (ComposeResolution::Discarded, None),
        };

        Some(ComposeSettlement {
            local_id: speculative.local_id,
            resolution,
            toast,
        })
    }
}

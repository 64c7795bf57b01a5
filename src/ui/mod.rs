//! Client-side interaction engines.
//!
//! The browser glue (DOM reads, `fetch`, event listeners) stays thin: it
//! reads the current widget state, drives one of these engines, and
//! applies whatever transition the engine hands back. Everything that can
//! go wrong — duplicate clicks, 401s, malformed bodies, dropped
//! connections — is decided here, so the whole surface is unit-testable
//! without a network.

pub mod compose;
pub mod gallery;
pub mod masonry;
pub mod toast;
pub mod toggle;

pub use compose::{
    CommentAck, CommentComposer, ComposeError, ComposeResolution, ComposeSettlement,
    SpeculativeComment,
};
pub use gallery::{Gallery, GalleryItem};
pub use masonry::{MasonryConfig, MasonryGrid};
pub use toast::{Toast, ToastHost, ToastLevel};
pub use toggle::{Disposition, Settlement, ToggleEngine, ToggleState};

/// How a mutation request resolved, as seen by the engine that issued it.
/// `T` is the server-confirmed payload on the success path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// 2xx with a well-formed envelope; the payload is server truth and
    /// wins over the optimistic guess.
    Success(T),
    /// HTTP 401. Recoverable by logging in.
    AuthRequired,
    /// HTTP 400, with the server's message when the envelope carried one.
    Invalid(Option<String>),
    /// HTTP 404. The target vanished; terminal for this action.
    NotFound,
    /// HTTP 5xx, or a JSON body without a success indicator.
    ServerFault(Option<String>),
    /// The response body was not parseable JSON.
    Malformed,
    /// Transport-level failure before any response arrived.
    NetworkFailure,
    /// Intentional cancellation or duplicate suppression; never surfaced
    /// to the user.
    Aborted,
}

pub(crate) const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub(crate) const LOGIN_REQUIRED: &str = "Please log in to do that.";

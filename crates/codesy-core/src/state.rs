//! Submission state machine.
//!
//! ```text
//! Idle -> Tokenizing -> TokenizeFailed -> Reloading
//!                    -> Tokenized -> Updating -> Reloading
//! ```
//!
//! `Reloading` is terminal: every path ends there.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one checkout submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitState {
    /// Nothing submitted yet.
    Idle,
    /// Waiting for the tokenization service.
    Tokenizing,
    /// The tokenization service rejected the card.
    TokenizeFailed,
    /// A token was issued.
    Tokenized,
    /// Waiting for the user-record update.
    Updating,
    /// The page is being reloaded.
    Reloading,
}

impl SubmitState {
    /// Whether `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Tokenizing)
                | (Self::Tokenizing, Self::TokenizeFailed | Self::Tokenized)
                | (Self::TokenizeFailed | Self::Updating, Self::Reloading)
                | (Self::Tokenized, Self::Updating | Self::Reloading)
        )
    }

    /// Whether this state ends the submission.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Reloading)
    }

    /// Get the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Tokenizing => "tokenizing",
            Self::TokenizeFailed => "tokenize_failed",
            Self::Tokenized => "tokenized",
            Self::Updating => "updating",
            Self::Reloading => "reloading",
        }
    }
}

impl fmt::Display for SubmitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States visited by one submission, starting at `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPath(Vec<SubmitState>);

impl SubmissionPath {
    /// Start a new path at `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self(vec![SubmitState::Idle])
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> SubmitState {
        self.0.last().copied().unwrap_or(SubmitState::Idle)
    }

    /// Move to `next`.
    ///
    /// Illegal transitions are a programming error and trip a debug assertion.
    pub fn advance(&mut self, next: SubmitState) {
        debug_assert!(
            self.current().can_advance_to(next),
            "illegal submit transition {} -> {next}",
            self.current()
        );
        self.0.push(next);
    }

    /// Whether the path reached `Reloading`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current().is_terminal()
    }

    /// All visited states in order.
    #[must_use]
    pub fn states(&self) -> &[SubmitState] {
        &self.0
    }
}

impl Default for SubmissionPath {
    fn default() -> Self {
        Self::new()
    }
}

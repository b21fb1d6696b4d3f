use humor_core::caption::CaptionItem;
use humor_core::session::Session;
use humor_core::vote::VoteTally;
use serde::Serialize;

/// Observable state of a voting session.
///
/// Snapshots are derived from the controller's internal state after every
/// transition; holding one never keeps the controller's working set alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VotingState {
    /// No session; the landing view with a sign-in action.
    Unauthenticated,
    /// Session established, captions being fetched and sampled.
    Loading { user: Session },
    /// Session check or caption load failed. `retry` starts over.
    Error { message: String },
    /// Presenting `current`, the item at `position` (0-based) of `total`.
    Voting {
        user: Session,
        current: CaptionItem,
        position: usize,
        total: usize,
        tally: VoteTally,
        /// A vote write for `position` is in flight; further votes are ignored.
        vote_pending: bool,
    },
    /// Every item in the working set has been voted on.
    Complete {
        user: Session,
        total: usize,
        tally: VoteTally,
    },
}

impl VotingState {
    pub fn name(&self) -> &'static str {
        match self {
            VotingState::Unauthenticated => "unauthenticated",
            VotingState::Loading { .. } => "loading",
            VotingState::Error { .. } => "error",
            VotingState::Voting { .. } => "voting",
            VotingState::Complete { .. } => "complete",
        }
    }

    pub fn user(&self) -> Option<&Session> {
        match self {
            VotingState::Loading { user }
            | VotingState::Voting { user, .. }
            | VotingState::Complete { user, .. } => Some(user),
            VotingState::Unauthenticated | VotingState::Error { .. } => None,
        }
    }

    /// Index of the next unvoted item, when a working set exists.
    pub fn cursor(&self) -> Option<usize> {
        match self {
            VotingState::Voting { position, .. } => Some(*position),
            VotingState::Complete { total, .. } => Some(*total),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, VotingState::Unauthenticated)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, VotingState::Loading { .. })
    }

    pub fn is_voting(&self) -> bool {
        matches!(self, VotingState::Voting { .. })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, VotingState::Complete { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, VotingState::Error { .. })
    }
}

/// Result of a vote action that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoteOutcome {
    /// One vote record was inserted and the cursor advanced.
    Recorded {
        caption_id: String,
        position: usize,
        completed: bool,
    },
    /// The action was a no-op; nothing was written.
    Ignored { reason: IgnoredReason },
    /// The write finished after the session changed; its result was not applied.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    NoSession,
    NotVoting,
    Complete,
    VoteInFlight,
}

impl std::fmt::Display for IgnoredReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoredReason::NoSession => write!(f, "not signed in"),
            IgnoredReason::NotVoting => write!(f, "no caption is being shown"),
            IgnoredReason::Complete => write!(f, "all captions have been voted on"),
            IgnoredReason::VoteInFlight => write!(f, "previous vote still being saved"),
        }
    }
}

//! Application layer for Humor Study.
//!
//! This crate drives the voting session: it coordinates the identity
//! provider and the record store behind the `VotingController` state machine.

pub mod voting;

pub use voting::{IgnoredReason, SessionListener, VoteOutcome, VotingController, VotingState};

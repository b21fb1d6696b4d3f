//! Voting session services.
//!
//! - `controller`: The session-gated state machine (`VotingController`)
//! - `listener`: Scoped subscription to session changes (`SessionListener`)
//! - `sampler`: Uniform sampling without replacement
//! - `state`: Observable state and vote outcomes

mod controller;
mod listener;
pub mod sampler;
mod state;

pub use controller::VotingController;
pub use listener::SessionListener;
pub use state::{IgnoredReason, VoteOutcome, VotingState};

//! Vote domain module.
//!
//! - `model`: Vote values, write-once vote records and per-session tallies
//! - `repository`: Insert-only access to the vote table (`VoteRepository`)

mod model;
mod repository;

pub use model::{VoteRecord, VoteTally, VoteValue};
pub use repository::VoteRepository;

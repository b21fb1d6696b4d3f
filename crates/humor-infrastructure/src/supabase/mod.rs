//! Adapters for the hosted backend (Supabase auth + PostgREST).
//!
//! - `client`: Shared HTTP client, token slot and error mapping
//! - `auth`: `SessionProvider` over the auth service
//! - `captions`: `CaptionRepository` over the `captions` table
//! - `votes`: `VoteRepository` over the `caption_votes` table

mod auth;
mod captions;
mod client;
mod votes;

pub use auth::SupabaseSessionProvider;
pub use captions::SupabaseCaptionRepository;
pub use client::SupabaseClient;
pub use votes::SupabaseVoteRepository;

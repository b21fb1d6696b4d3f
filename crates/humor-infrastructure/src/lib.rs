pub mod backend;
pub mod config_service;
pub mod memory;
pub mod paths;
pub mod storage;
pub mod supabase;

pub use crate::backend::Backend;
pub use crate::config_service::ConfigService;
pub use crate::memory::{InMemoryRecordStore, InMemorySessionProvider};
pub use crate::supabase::{
    SupabaseCaptionRepository, SupabaseClient, SupabaseSessionProvider, SupabaseVoteRepository,
};

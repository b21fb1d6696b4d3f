//! In-process backend used by `--demo` and by integration tests.
//!
//! - `records`: Caption and vote tables held in memory
//! - `session`: A session provider that signs in a fixed demo user

mod records;
mod session;

pub use records::InMemoryRecordStore;
pub use session::InMemorySessionProvider;

//! File-backed storage primitives.

mod atomic_file;
mod token_storage;

pub use atomic_file::{AtomicFile, FileFormat};
pub use token_storage::{StoredSession, TokenStorage};

pub mod caption;
pub mod config;
pub mod error;
pub mod session;
pub mod vote;

// Re-export common error type
pub use error::HumorError;

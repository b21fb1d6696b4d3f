//! Session domain module.
//!
//! This module contains the authenticated session model, the change
//! notifications published by the identity provider, and the provider
//! contract the voting controller consumes.
//!
//! # Module Structure
//!
//! - `model`: Authenticated identity (`Session`)
//! - `event`: Change notifications (`AuthChangeEvent`, `SessionChange`)
//! - `subscription`: Broadcast plumbing (`SessionBroadcaster`, `SessionSubscription`)
//! - `provider`: Provider trait (`SessionProvider`) and sign-in types
//!
//! # Usage
//!
//! ```ignore
//! use humor_core::session::{Session, SessionProvider, SessionChange};
//! ```

mod event;
mod model;
mod provider;
mod subscription;

// Re-export public API
pub use event::{AuthChangeEvent, SessionChange};
pub use model::Session;
pub use provider::{AuthCallback, SessionProvider, SignInFlow};
pub use subscription::{SessionBroadcaster, SessionSubscription};

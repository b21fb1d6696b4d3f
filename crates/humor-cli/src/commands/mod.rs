pub mod auth;
pub mod config;
pub mod context;
pub mod vote;

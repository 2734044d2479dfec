//! Coding Coach API Library Crate
//!
//! The HTTP surface of the coach: configuration, the file-backed session
//! store, the learner session, handlers and routing. The `api` binary is a
//! thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod session;
pub mod state;
pub mod store;

//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the store, the
//! model-backed tutor, and the single learner session.

use crate::{session::Learner, store::SessionStore};
use coach_core::tutor::Tutor;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub store: SessionStore,
    pub tutor: Tutor,
    /// Never held across a model call.
    pub learner: Mutex<Learner>,
    /// Cancelled on shutdown; long generations observe it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: SessionStore, tutor: Tutor, learner: Learner) -> Self {
        Self {
            store,
            tutor,
            learner: Mutex::new(learner),
            shutdown: CancellationToken::new(),
        }
    }
}

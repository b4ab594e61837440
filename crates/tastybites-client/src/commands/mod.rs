//! Screen-level operations.
//!
//! Each sub-module drives one group of screens: it reads the session token,
//! calls the API, updates local state and reports failures on the
//! [`EventBus`] as alerts. Errors are still returned so callers can react.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::Result;
use crate::events::EventBus;
use crate::session::SessionStore;

pub mod account;
pub mod auth;
pub mod browse;
pub mod purchase;

/// Handles every screen needs.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<ApiClient>,
    pub sessions: Arc<SessionStore>,
    pub events: EventBus,
}

impl Services {
    pub fn new(api: Arc<ApiClient>, sessions: Arc<SessionStore>, events: EventBus) -> Self {
        Self {
            api,
            sessions,
            events,
        }
    }

    /// Token for the next request; a missing session is reported as an
    /// alert.
    pub(crate) fn token(&self) -> Result<String> {
        self.sessions.token().map_err(|e| {
            self.events.report(&e, "No token found");
            e
        })
    }
}

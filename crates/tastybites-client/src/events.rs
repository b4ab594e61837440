use tokio::sync::broadcast;

use tastybites_shared::{RecipeId, Role};

use crate::error::ClientError;
use crate::overlay::ReactionState;

/// A user-visible alert, the headless counterpart of a modal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Success", message)
    }

    /// Map an error to what the user is shown. `fallback` is the
    /// screen-specific text used for transport and server failures.
    pub fn from_error(err: &ClientError, fallback: &str) -> Self {
        match err {
            ClientError::Unauthorized => Self::new("Unauthorized", "Please log in again."),
            ClientError::Validation { message, .. } => Self::new("Error", message.clone()),
            ClientError::Auth { message, .. } => Self::new("Error", message.clone()),
            ClientError::NoSession => Self::new("Error", "No token found"),
            ClientError::InvalidInput(message) => Self::new("Error", message.clone()),
            _ => Self::new("Error", fallback),
        }
    }
}

/// Events published to whatever shell drives the client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Alert(Alert),
    SessionStarted { role: Role },
    SessionEnded,
    CollectionUpdated {
        resource: &'static str,
        len: usize,
        has_more: bool,
    },
    ReactionReconciled {
        recipe_id: RecipeId,
        state: ReactionState,
    },
}

/// Fan-out channel for [`ClientEvent`]s. Emitting with no subscribers is
/// not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ClientEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }

    pub fn alert(&self, alert: Alert) {
        self.emit(ClientEvent::Alert(alert));
    }

    /// Log `err` and surface it as an alert.
    pub fn report(&self, err: &ClientError, fallback: &str) {
        tracing::warn!(error = %err, "{fallback}");
        self.alert(Alert::from_error(err, fallback));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_asks_to_log_in_again() {
        let alert = Alert::from_error(&ClientError::Unauthorized, "Failed to fetch recipes");
        assert_eq!(alert, Alert::new("Unauthorized", "Please log in again."));
    }

    #[test]
    fn transport_errors_use_the_fallback() {
        let err = ClientError::Http {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(
            Alert::from_error(&err, "Failed to fetch chefs").message,
            "Failed to fetch chefs"
        );
    }

    #[tokio::test]
    async fn subscribers_receive_reports() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.report(&ClientError::validation("Passwords do not match."), "unused");

        match rx.recv().await.unwrap() {
            ClientEvent::Alert(alert) => assert_eq!(alert.message, "Passwords do not match."),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        EventBus::default().emit(ClientEvent::SessionEnded);
    }
}

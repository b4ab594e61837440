use std::collections::HashMap;

use thiserror::Error;

use tastybites_shared::RecipeId;
use tastybites_store::StoreError;

use crate::events::Alert;

/// Login form field an auth error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthField {
    Email,
    Password,
}

impl AuthField {
    /// Key used for this field in validation error maps.
    pub fn key(&self) -> &'static str {
        match self {
            AuthField::Email => "email",
            AuthField::Password => "password",
        }
    }
}

/// Errors surfaced by client operations. None of them are fatal: screens
/// catch them, show an [`Alert`](crate::events::Alert) or field message, and
/// carry on.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected credentials (401/404 on login).
    #[error("{message}")]
    Auth { field: AuthField, message: String },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Server-side (422) or local form validation failure.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: HashMap<String, Vec<String>>,
    },

    /// 401 on a token-bearing request.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server responded {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Not logged in")]
    NoSession,

    #[error("A page fetch is already in flight")]
    FetchInFlight,

    #[error("A reaction on recipe {0} is already in flight")]
    ReactionInFlight(RecipeId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            ClientError::Network(e)
        }
    }
}

impl ClientError {
    /// A validation error carrying a single message and no field map.
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    /// A validation error for named form fields.
    pub fn invalid_fields(
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (&'static str, String)>,
    ) -> Self {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (field, msg) in fields {
            map.entry(field.to_string()).or_default().push(msg);
        }
        ClientError::Validation {
            message: message.into(),
            fields: map,
        }
    }

    /// First message recorded for `field`, if any.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            ClientError::Validation { fields, .. } => {
                fields.get(field).and_then(|m| m.first()).map(String::as_str)
            }
            ClientError::Auth { field: f, message } if f.key() == field => Some(message.as_str()),
            _ => None,
        }
    }

    /// What the user is shown for this error; see [`Alert::from_error`].
    pub fn alert(&self, fallback: &str) -> Alert {
        Alert::from_error(self, fallback)
    }

    /// Errors that mean "the request never got an answer".
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_messages_from_validation_and_auth() {
        let err = ClientError::invalid_fields(
            "Incomplete",
            [
                ("email", "Please enter your email.".to_string()),
                ("password", "Please enter your password.".to_string()),
            ],
        );
        assert_eq!(err.field_message("email"), Some("Please enter your email."));
        assert_eq!(err.field_message("password"), Some("Please enter your password."));
        assert_eq!(err.field_message("phone"), None);

        let auth = ClientError::Auth {
            field: AuthField::Password,
            message: "Incorrect email or password.".into(),
        };
        assert_eq!(auth.field_message("password"), Some("Incorrect email or password."));
        assert_eq!(auth.field_message("email"), None);
    }
}

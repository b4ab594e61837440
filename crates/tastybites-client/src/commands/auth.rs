//! Login, registration and logout.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::multipart::Form;
use tracing::info;

use tastybites_shared::constants::FIELD_ERROR_TTL_SECS;
use tastybites_shared::{Role, Session};

use crate::commands::Services;
use crate::error::{AuthField, ClientError, Result};
use crate::events::{Alert, ClientEvent};
use crate::upload::Attachment;

/// How long a field message stays under its input.
pub const FIELD_ERROR_TTL: Duration = Duration::from_secs(FIELD_ERROR_TTL_SECS);

/// Messages shown under form inputs. Each expires [`FIELD_ERROR_TTL`] after
/// it was set; setting a field again restarts its timer.
#[derive(Debug, Clone)]
pub struct FieldErrors {
    ttl: Duration,
    entries: HashMap<String, (String, Instant)>,
}

impl Default for FieldErrors {
    fn default() -> Self {
        Self::new(FIELD_ERROR_TTL)
    }
}

impl FieldErrors {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, message: impl Into<String>, now: Instant) {
        self.entries.insert(field.into(), (message.into(), now));
    }

    /// The message for `field` if it has not expired by `now`.
    pub fn get(&self, field: &str, now: Instant) -> Option<&str> {
        self.entries
            .get(field)
            .filter(|(_, at)| now.saturating_duration_since(*at) < self.ttl)
            .map(|(message, _)| message.as_str())
    }

    /// Record the field-level parts of `err`. Returns `false` when the error
    /// has none, so the caller can fall back to an alert.
    pub fn record(&mut self, err: &ClientError, now: Instant) -> bool {
        match err {
            ClientError::Auth { field, message } => {
                self.set(field.key(), message.clone(), now);
                true
            }
            ClientError::Validation { fields, .. } if !fields.is_empty() => {
                for (field, messages) in fields {
                    if let Some(first) = messages.first() {
                        self.set(field.clone(), first.clone(), now);
                    }
                }
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Input of the register screen.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub role: Option<Role>,
    pub email: String,
    pub user_name: String,
    pub full_name: String,
    pub password: String,
    pub password_confirmation: String,
    /// Years of experience; chefs only.
    pub experience: String,
    /// Certificate document; chefs only.
    pub certificate: Option<Attachment>,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Role> {
        let role = self
            .role
            .ok_or_else(|| ClientError::validation("Please choose USER or CHEF."))?;

        let mut missing = Vec::new();
        for (field, value) in [
            ("email", &self.email),
            ("userName", &self.user_name),
            ("fullName", &self.full_name),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                missing.push((field, "This field is required.".to_string()));
            }
        }
        if role == Role::Chef {
            if self.experience.trim().is_empty() {
                missing.push(("experience", "This field is required.".to_string()));
            }
            if self.certificate.is_none() {
                missing.push(("certificate", "Please upload your certificate.".to_string()));
            }
        }
        if !missing.is_empty() {
            return Err(ClientError::invalid_fields("Please fill in all fields.", missing));
        }

        if self.password != self.password_confirmation {
            return Err(ClientError::invalid_fields(
                "Passwords do not match.",
                [("password_confirmation", "Passwords do not match.".to_string())],
            ));
        }

        Ok(role)
    }

    async fn into_form(self, role: Role) -> Result<Form> {
        let mut form = Form::new()
            .text("userType", role.registration_code().to_string())
            .text("email", self.email.trim().to_string())
            .text("userName", self.user_name.trim().to_string())
            .text("fullName", self.full_name.trim().to_string())
            .text("password", self.password)
            .text("password_confirmation", self.password_confirmation);

        if role == Role::Chef {
            form = form.text("experience", self.experience.trim().to_string());
            if let Some(certificate) = self.certificate {
                form = form.part("certificate", certificate.into_part().await?);
            }
        }
        Ok(form)
    }
}

/// The logged-out flow, plus logout.
#[derive(Clone)]
pub struct AuthFlow {
    svc: Services,
}

impl AuthFlow {
    pub fn new(svc: Services) -> Self {
        Self { svc }
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// Field problems come back as [`ClientError::Auth`] or
    /// [`ClientError::Validation`] for [`FieldErrors::record`]; anything else
    /// is also published as an alert.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let mut missing = Vec::new();
        if email.trim().is_empty() {
            missing.push((AuthField::Email.key(), "Please enter your email.".to_string()));
        }
        if password.is_empty() {
            missing.push((AuthField::Password.key(), "Please enter your password.".to_string()));
        }
        if !missing.is_empty() {
            return Err(ClientError::invalid_fields("Please fill in all fields.", missing));
        }

        let resp = match self.svc.api.login(email.trim(), password).await {
            Ok(resp) => resp,
            Err(e @ ClientError::Auth { .. }) => return Err(e),
            Err(e) => {
                self.svc.events.report(&e, "Login failed. Please try again.");
                return Err(e);
            }
        };

        let user_id = resp.id.ok_or_else(|| ClientError::Auth {
            field: AuthField::Email,
            message: "Login failed: User ID missing.".into(),
        })?;

        let session = Session {
            token: resp.access_token,
            role: resp.role,
            user_id,
        };
        self.svc.sessions.save(session.clone())?;

        info!(role = %session.role, user_id = %session.user_id, "logged in");
        self.svc.events.emit(ClientEvent::SessionStarted { role: session.role });
        Ok(session)
    }

    /// Submit a registration. Does not log in.
    pub async fn register(&self, form: RegistrationForm) -> Result<String> {
        let role = form.validate()?;
        let email = form.email.trim().to_string();
        let multipart = form.into_form(role).await?;

        let resp = self.svc.api.register(multipart).await.map_err(|e| {
            if !matches!(e, ClientError::Validation { .. }) {
                self.svc.events.report(&e, "Registration failed. Please try again.");
            }
            e
        })?;

        let message = resp
            .message
            .unwrap_or_else(|| "Registration successful.".to_string());
        info!(%role, %email, "registered");
        self.svc.events.alert(Alert::success(message.clone()));
        Ok(message)
    }

    /// End the session on the server, then forget it locally. If the server
    /// call fails the local session is kept.
    pub async fn logout(&self) -> Result<()> {
        let token = self.svc.token()?;
        if let Err(e) = self.svc.api.logout(&token).await {
            self.svc.events.report(&e, "Logout failed. Please try again.");
            return Err(e);
        }

        self.svc.sessions.clear()?;
        info!("logged out");
        self.svc.events.emit(ClientEvent::SessionEnded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Multipart, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::events::EventBus;
    use crate::session::SessionStore;
    use crate::test_support::{api_for, serve};
    use tastybites_shared::UserId;

    fn flow(base: &str) -> (AuthFlow, Arc<SessionStore>, EventBus) {
        let sessions = Arc::new(SessionStore::in_memory().unwrap());
        let events = EventBus::new(16);
        let flow = AuthFlow::new(Services::new(
            Arc::new(api_for(base)),
            sessions.clone(),
            events.clone(),
        ));
        (flow, sessions, events)
    }

    #[test]
    fn field_errors_expire() {
        let start = Instant::now();
        let mut errors = FieldErrors::default();
        errors.set("email", "Please enter your email.", start);

        assert_eq!(errors.get("email", start + Duration::from_secs(4)), Some("Please enter your email."));
        assert_eq!(errors.get("email", start + FIELD_ERROR_TTL), None);

        errors.set("email", "Email not registered.", start + Duration::from_secs(4));
        assert_eq!(
            errors.get("email", start + Duration::from_secs(6)),
            Some("Email not registered.")
        );
    }

    #[tokio::test]
    async fn empty_fields_never_hit_the_network() {
        // Nothing listens here; a request would fail with a network error.
        let (flow, _, _) = flow("http://127.0.0.1:9/api");
        let err = flow.login("  ", "").await.unwrap_err();

        let now = Instant::now();
        let mut errors = FieldErrors::default();
        assert!(errors.record(&err, now));
        assert_eq!(errors.get("email", now), Some("Please enter your email."));
        assert_eq!(errors.get("password", now), Some("Please enter your password."));
    }

    #[tokio::test]
    async fn login_persists_session_and_authorizes_later_requests() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let router = Router::new()
            .route(
                "/api/login",
                post(|| async { Json(json!({"access_token": "abc", "role": "chef", "id": 7})) }),
            )
            .route(
                "/api/user-profile",
                get(|State(seen): State<Arc<Mutex<Vec<String>>>>, headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    seen.lock().unwrap().push(auth);
                    Json(json!({"user": {"user_info": {"userName": "lola"}}}))
                }),
            )
            .with_state(seen.clone());
        let base = serve(router).await;
        let (flow, sessions, events) = flow(&base);
        let mut rx = events.subscribe();

        let session = flow.login("cook@example.com", "secret").await.unwrap();
        assert_eq!(
            session,
            Session {
                token: "abc".into(),
                role: Role::Chef,
                user_id: UserId(7),
            }
        );
        assert_eq!(sessions.load(), Some(session));
        assert!(matches!(
            rx.recv().await.unwrap(),
            ClientEvent::SessionStarted { role: Role::Chef }
        ));

        let api = api_for(&base);
        api.profile(&sessions.token().unwrap()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["Bearer abc".to_string()]);
    }

    #[tokio::test]
    async fn login_without_id_is_rejected_on_email() {
        let router = Router::new().route(
            "/api/login",
            post(|| async { Json(json!({"access_token": "abc", "role": "user"})) }),
        );
        let (flow, sessions, _) = flow(&serve(router).await);

        let err = flow.login("a@b.c", "pw").await.unwrap_err();
        assert_eq!(err.field_message("email"), Some("Login failed: User ID missing."));
        assert_eq!(sessions.load(), None);
    }

    #[test]
    fn registration_validation() {
        let mut form = RegistrationForm {
            role: Some(Role::Chef),
            email: "chef@example.com".into(),
            user_name: "lola".into(),
            full_name: "Lola Cruz".into(),
            password: "secret1".into(),
            password_confirmation: "secret1".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.field_message("experience").is_some());
        assert!(err.field_message("certificate").is_some());

        form.role = Some(Role::User);
        assert_eq!(form.validate().unwrap(), Role::User);

        form.password_confirmation = "secret2".into();
        assert_eq!(
            form.validate().unwrap_err().field_message("password_confirmation"),
            Some("Passwords do not match.")
        );

        form.role = None;
        assert!(form.validate().is_err());
    }

    #[tokio::test]
    async fn register_sends_multipart_with_user_type() {
        let fields: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
        let router = Router::new()
            .route(
                "/api/register",
                post(
                    |State(fields): State<Arc<Mutex<Vec<(String, String)>>>>,
                     mut multipart: Multipart| async move {
                        while let Some(field) = multipart.next_field().await.unwrap() {
                            let name = field.name().unwrap_or_default().to_string();
                            let file_name = field.file_name().map(str::to_string);
                            let value = match file_name {
                                Some(file) => file,
                                None => field.text().await.unwrap(),
                            };
                            fields.lock().unwrap().push((name, value));
                        }
                        (StatusCode::CREATED, Json(json!({"message": "Registered!"})))
                    },
                ),
            )
            .with_state(fields.clone());
        let (flow, sessions, _) = flow(&serve(router).await);

        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pdf");
        std::fs::write(&cert, b"%PDF-1.4").unwrap();

        let message = flow
            .register(RegistrationForm {
                role: Some(Role::Chef),
                email: "chef@example.com".into(),
                user_name: "lola".into(),
                full_name: "Lola Cruz".into(),
                password: "secret1".into(),
                password_confirmation: "secret1".into(),
                experience: "12".into(),
                certificate: Some(Attachment::from_uri(cert.to_str().unwrap())),
            })
            .await
            .unwrap();
        assert_eq!(message, "Registered!");
        assert!(!sessions.is_logged_in());

        let fields = fields.lock().unwrap();
        let get = |name: &str| {
            fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("userType").as_deref(), Some("1"));
        assert_eq!(get("userName").as_deref(), Some("lola"));
        assert_eq!(get("password_confirmation").as_deref(), Some("secret1"));
        assert_eq!(get("experience").as_deref(), Some("12"));
        assert_eq!(get("certificate").as_deref(), Some("cert.pdf"));
    }

    #[tokio::test]
    async fn logout_clears_only_after_server_accepts() {
        let accept = Arc::new(Mutex::new(false));
        let router = Router::new()
            .route(
                "/api/logout",
                post(|State(accept): State<Arc<Mutex<bool>>>| async move {
                    if *accept.lock().unwrap() {
                        (StatusCode::OK, Json(json!({"message": "Logged out"})))
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::Null))
                    }
                }),
            )
            .with_state(accept.clone());
        let (flow, sessions, _) = flow(&serve(router).await);
        sessions
            .save(Session {
                token: "abc".into(),
                role: Role::User,
                user_id: UserId(1),
            })
            .unwrap();

        assert!(flow.logout().await.is_err());
        assert!(sessions.is_logged_in());

        *accept.lock().unwrap() = true;
        flow.logout().await.unwrap();
        assert!(!sessions.is_logged_in());
        assert_eq!(sessions.load(), None);
    }
}

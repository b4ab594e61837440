//! Thin typed wrapper over the Tastybites REST API.
//!
//! Every method maps to exactly one endpoint. Token-bearing calls send
//! `Authorization: Bearer <token>` and `Accept: application/json`; non-2xx
//! responses are translated into [`ClientError`] variants by
//! [`error_for_status`].

use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use tastybites_shared::{
    ApiMessage, Chef, ChefId, HideToggleResponse, Listing, LoginResponse, Notification, Page,
    ProfileResponse, PurchaseInfo, ReactionCounts, ReactionType, Recipe, RecipeId,
    SaveToggleResponse, ValidationBody,
};

use crate::config::ClientConfig;
use crate::error::{AuthField, ClientError, Result};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ReactRequest {
    reaction_type: ReactionType,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// Response of `POST /buy-recipe`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuyResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub purchase: Option<PurchaseInfo>,
}

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        self.http
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        let resp = check(req.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send_empty(req: RequestBuilder) -> Result<()> {
        check(req.send().await?).await?;
        Ok(())
    }

    // -- Auth ----------------------------------------------------------------

    /// `POST /login`. 401 and 404 become field-level [`ClientError::Auth`].
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        tracing::debug!(path = "/login", "api request");
        let resp = self
            .http
            .post(self.url("/login"))
            .header(ACCEPT, "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Auth {
                field: AuthField::Password,
                message: server_message(&body)
                    .unwrap_or_else(|| "Incorrect email or password.".into()),
            },
            StatusCode::NOT_FOUND => ClientError::Auth {
                field: AuthField::Email,
                message: server_message(&body).unwrap_or_else(|| "Email not registered.".into()),
            },
            other => error_for_status(other, &body),
        })
    }

    /// `POST /register` (multipart).
    pub async fn register(&self, form: Form) -> Result<ApiMessage> {
        tracing::debug!(path = "/register", "api request");
        let req = self
            .http
            .post(self.url("/register"))
            .header(ACCEPT, "application/json")
            .multipart(form);
        Self::send_json(req).await
    }

    /// `POST /logout`.
    pub async fn logout(&self, token: &str) -> Result<()> {
        Self::send_empty(self.authed(Method::POST, "/logout", token)).await
    }

    // -- Listings ------------------------------------------------------------

    /// `GET /recipes` (home feed).
    pub async fn recipes(&self, token: &str, page: u32) -> Result<Page<Recipe>> {
        let req = self
            .authed(Method::GET, "/recipes", token)
            .query(&[("page", page)]);
        Ok(Self::send_json::<Listing<Recipe>>(req).await?.into())
    }

    /// `GET /recipes/saved/purchase?page=N` (saved / hidden / purchased shelves).
    pub async fn recipe_shelf(&self, token: &str, page: u32) -> Result<Page<Recipe>> {
        let req = self
            .authed(Method::GET, "/recipes/saved/purchase", token)
            .query(&[("page", page)]);
        Ok(Self::send_json::<Listing<Recipe>>(req).await?.into())
    }

    /// `GET /recipes/chef/{id}`.
    pub async fn chef_recipes(&self, token: &str, chef: ChefId, page: u32) -> Result<Page<Recipe>> {
        let req = self
            .authed(Method::GET, &format!("/recipes/chef/{chef}"), token)
            .query(&[("page", page)]);
        Ok(Self::send_json::<Listing<Recipe>>(req).await?.into())
    }

    /// `GET /all/chefs-information`.
    pub async fn chefs(&self, token: &str, page: u32) -> Result<Page<Chef>> {
        let req = self
            .authed(Method::GET, "/all/chefs-information", token)
            .query(&[("page", page)]);
        Ok(Self::send_json::<Listing<Chef>>(req).await?.into())
    }

    /// `GET /display-notification`.
    pub async fn notifications(&self, token: &str, page: u32) -> Result<Page<Notification>> {
        let req = self
            .authed(Method::GET, "/display-notification", token)
            .query(&[("page", page)]);
        Ok(Self::send_json::<Listing<Notification>>(req).await?.into())
    }

    // -- Reactions and flags ---------------------------------------------------

    /// `GET /recipes/{id}/reactions`.
    pub async fn reaction_counts(&self, token: &str, id: RecipeId) -> Result<ReactionCounts> {
        Self::send_json(self.authed(Method::GET, &format!("/recipes/{id}/reactions"), token)).await
    }

    /// `POST /recipes/{id}/react`.
    pub async fn react(&self, token: &str, id: RecipeId, reaction: ReactionType) -> Result<()> {
        let req = self
            .authed(Method::POST, &format!("/recipes/{id}/react"), token)
            .json(&ReactRequest {
                reaction_type: reaction,
            });
        Self::send_empty(req).await
    }

    /// `POST /save-unsave-recipe/{id}`; returns the new saved status.
    pub async fn toggle_saved(&self, token: &str, id: RecipeId) -> Result<bool> {
        let resp: SaveToggleResponse =
            Self::send_json(self.authed(Method::POST, &format!("/save-unsave-recipe/{id}"), token))
                .await?;
        Ok(resp.save_status)
    }

    /// `POST /hide-unhide-recipe/{id}`; returns the new hidden status.
    pub async fn toggle_hidden(&self, token: &str, id: RecipeId) -> Result<bool> {
        let resp: HideToggleResponse =
            Self::send_json(self.authed(Method::POST, &format!("/hide-unhide-recipe/{id}"), token))
                .await?;
        Ok(resp.hide.is_hidden)
    }

    // -- Purchases and account -------------------------------------------------

    /// `POST /buy-recipe` (multipart).
    pub async fn buy_recipe(&self, token: &str, form: Form) -> Result<BuyResponse> {
        Self::send_json(self.authed(Method::POST, "/buy-recipe", token).multipart(form)).await
    }

    /// `POST /change-password`.
    pub async fn change_password(
        &self,
        token: &str,
        request: &PasswordChangeRequest,
    ) -> Result<ApiMessage> {
        Self::send_json(self.authed(Method::POST, "/change-password", token).json(request)).await
    }

    /// `GET /user-profile`.
    pub async fn profile(&self, token: &str) -> Result<ProfileResponse> {
        Self::send_json(self.authed(Method::GET, "/user-profile", token)).await
    }

    /// `POST /edit-profile` (multipart).
    pub async fn edit_profile(&self, token: &str, form: Form) -> Result<ApiMessage> {
        Self::send_json(self.authed(Method::POST, "/edit-profile", token).multipart(form)).await
    }
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "api error response");
    Err(error_for_status(status, &body))
}

/// Translate a non-2xx status and its body into a [`ClientError`].
pub fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::UNPROCESSABLE_ENTITY => {
            let parsed: ValidationBody = serde_json::from_str(body).unwrap_or_default();
            ClientError::Validation {
                message: parsed.message.unwrap_or_else(|| "Invalid input.".into()),
                fields: parsed.errors,
            }
        }
        other => ClientError::Http {
            status: other.as_u16(),
            message: server_message(body)
                .unwrap_or_else(|| other.canonical_reason().unwrap_or("error").to_string()),
        },
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty())
}

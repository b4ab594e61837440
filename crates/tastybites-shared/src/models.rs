//! Wire models exchanged with the Tastybites REST backend.
//!
//! The backend is loose about scalar types (flags arrive as `true`, `1` or
//! `"1"`, prices as numbers or strings), so the lenient field readers in
//! [`de`] normalise them on the way in.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ChefId, NotificationId, Pricing, PurchaseStatus, RecipeId, Role, UserId, UserReaction,
};

/// Anything held in a fetched collection: it has a stable id and a name the
/// search box matches against.
pub trait Entity {
    type Id: Copy + Eq + Hash + fmt::Display;

    fn id(&self) -> Self::Id;

    fn display_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated session. Only complete sessions exist; a stored session
/// missing any field is treated as logged out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: Role,
    #[serde(default)]
    pub id: Option<UserId>,
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// One fetched batch of a paginated collection (Laravel paginator shape).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    #[serde(rename = "data", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

impl<T> Page<T> {
    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_url: None,
            current_page: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_page_url.is_some()
    }
}

/// Some endpoints return a bare array, others a paginator object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paged(Page<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Plain(items) => Page::last(items),
            Listing::Paged(page) => page,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseInfo {
    pub status: PurchaseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    #[serde(rename = "ingredientName", default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    #[serde(default)]
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(rename = "recipeName", default)]
    pub recipe_name: String,
    #[serde(rename = "cuisineType", alias = "cuisine_type", default)]
    pub cuisine_type: Option<String>,
    #[serde(default, deserialize_with = "de::price")]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_free: Pricing,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "ingredient", default, deserialize_with = "de::list")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "de::list")]
    pub procedure: Vec<Step>,
    /// Free-form availability label set by the chef.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "user_id", alias = "chef_id", default)]
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default, deserialize_with = "de::count")]
    pub total_likes: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_dislikes: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_saved: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_hidden: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_purchased: bool,
    #[serde(default)]
    pub purchase: Option<PurchaseInfo>,
    /// Absent from most listings; the counts endpoint is authoritative.
    #[serde(default)]
    pub user_reaction: Option<UserReaction>,
}

/// How much of a recipe the viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeAccess {
    /// Free, or bought and approved.
    Full,
    /// Bought, waiting for the chef to confirm the payment.
    PendingApproval,
    Locked,
}

impl Recipe {
    /// A pending purchase holds the content back even when the recipe is
    /// already flagged as purchased.
    pub fn access(&self) -> RecipeAccess {
        if matches!(
            self.purchase,
            Some(PurchaseInfo {
                status: PurchaseStatus::Pending
            })
        ) {
            RecipeAccess::PendingApproval
        } else if self.is_free == Pricing::Free || self.is_purchased {
            RecipeAccess::Full
        } else {
            RecipeAccess::Locked
        }
    }

    pub fn is_premium(&self) -> bool {
        self.is_free == Pricing::Premium
    }

    pub fn author_name(&self) -> Option<&str> {
        self.user.as_ref()?.user_name()
    }

    pub fn status_label(&self) -> &str {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Available")
    }
}

impl Entity for Recipe {
    type Id = RecipeId;

    fn id(&self) -> RecipeId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.recipe_name
    }
}

/// Response of `GET /recipes/{id}/reactions`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReactionCounts {
    #[serde(default, deserialize_with = "de::count")]
    pub total_likes: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_dislikes: u64,
    #[serde(default, deserialize_with = "de::reaction")]
    pub user_reaction: UserReaction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveToggleResponse {
    #[serde(deserialize_with = "de::flag")]
    pub save_status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HideState {
    #[serde(deserialize_with = "de::flag")]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HideToggleResponse {
    pub hide: HideState,
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserInfo {
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(rename = "profilePath", default)]
    pub profile_path: Option<String>,
}

/// A nested `{ user_info }` object: recipe authors, notification senders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserRef {
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

impl UserRef {
    pub fn user_name(&self) -> Option<&str> {
        self.user_info
            .as_ref()?
            .user_name
            .as_deref()
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chef {
    pub id: ChefId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

impl Chef {
    pub fn full_name(&self) -> Option<&str> {
        self.user_info.as_ref()?.full_name.as_deref()
    }

    pub fn profile_path(&self) -> Option<&str> {
        self.user_info
            .as_ref()?
            .profile_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    pub fn gender(&self) -> Option<&str> {
        self.user_info.as_ref()?.gender.as_deref()
    }
}

impl Entity for Chef {
    type Id = ChefId;

    fn id(&self) -> ChefId {
        self.id
    }

    fn display_name(&self) -> &str {
        self.user_info
            .as_ref()
            .and_then(|info| info.user_name.as_deref())
            .filter(|n| !n.is_empty())
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUser {
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

/// Response of `GET /user-profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub message: Option<String>,
    /// Raw server timestamp; see [`Notification::created_at`].
    #[serde(rename = "created_at", default)]
    pub created_at_raw: Option<String>,
    #[serde(default)]
    pub sender: Option<UserRef>,
}

impl Notification {
    pub fn sender_name(&self) -> &str {
        self.sender
            .as_ref()
            .and_then(UserRef::user_name)
            .unwrap_or("Unknown Sender")
    }

    /// RFC 3339 or Laravel's `Y-m-d H:i:s` (taken as UTC). Anything else is
    /// `None`; the raw string stays available.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at_raw.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|t| t.and_utc())
            })
            .ok()
    }

    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("No message")
    }
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> NotificationId {
        self.id
    }

    fn display_name(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Generic responses
// ---------------------------------------------------------------------------

/// `{ success, message }` envelope used by most mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Laravel validation failure body (HTTP 422).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ValidationBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: HashMap<String, Vec<String>>,
}

pub(crate) mod de {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    use crate::types::UserReaction;

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
            Value::String(s) => match s.trim() {
                "1" | "true" => Ok(true),
                "0" | "false" | "" => Ok(false),
                other => Err(D::Error::custom(format!("invalid flag: {other}"))),
            },
            other => Err(D::Error::custom(format!("invalid flag: {other}"))),
        }
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(0),
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| D::Error::custom(format!("invalid count: {n}"))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid count: {s}"))),
            other => Err(D::Error::custom(format!("invalid count: {other}"))),
        }
    }

    pub fn price<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid price: {s}"))),
            other => Err(D::Error::custom(format!("invalid price: {other}"))),
        }
    }

    pub fn reaction<'de, D: Deserializer<'de>>(d: D) -> Result<UserReaction, D::Error> {
        Option::<UserReaction>::deserialize(d).map(Option::unwrap_or_default)
    }

    /// `null` reads as an empty list.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<Vec<T>>::deserialize(d).map(Option::unwrap_or_default)
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!("invalid text: {other}"))),
        }
    }
}

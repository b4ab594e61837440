use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// Backend identifiers are auto-increment integers.
macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }
    };
}

numeric_id!(UserId);
numeric_id!(RecipeId);
numeric_id!(ChefId);
numeric_id!(NotificationId);

impl FromStr for UserId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

/// Account kind as reported by the backend on login.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Chef,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Chef => "chef",
        }
    }

    /// Numeric `userType` sent with a registration form.
    pub fn registration_code(&self) -> u8 {
        match self {
            Role::Chef => 1,
            Role::User => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "chef" => Ok(Role::Chef),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}

/// Whether a recipe is free to view or must be bought. Only an explicit
/// `"free"` makes a recipe free.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pricing {
    Free,
    #[default]
    Premium,
}

/// The viewer's current reaction on a recipe (`user_reaction` on the wire).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum UserReaction {
    #[default]
    None,
    Like,
    Dislike,
}

impl TryFrom<u8> for UserReaction {
    type Error = ModelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Like),
            2 => Ok(Self::Dislike),
            other => Err(ModelError::UnknownReaction(other)),
        }
    }
}

impl From<UserReaction> for u8 {
    fn from(r: UserReaction) -> u8 {
        match r {
            UserReaction::None => 0,
            UserReaction::Like => 1,
            UserReaction::Dislike => 2,
        }
    }
}

/// `reaction_type` code posted to `/recipes/{id}/react`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8")]
pub enum ReactionType {
    Like,
    Dislike,
    Clear,
}

impl From<ReactionType> for u8 {
    fn from(r: ReactionType) -> u8 {
        match r {
            ReactionType::Like => 1,
            ReactionType::Dislike => 2,
            ReactionType::Clear => 3,
        }
    }
}

/// Review state of a purchase submitted through the buy form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Approved,
    Rejected,
}

/// Genders accepted by `/edit-profile`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Case-sensitive parse, matching what the backend validates.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_reaction_codes() {
        let r: UserReaction = serde_json::from_str("2").unwrap();
        assert_eq!(r, UserReaction::Dislike);
        assert!(serde_json::from_str::<UserReaction>("7").is_err());
        assert_eq!(serde_json::to_string(&UserReaction::Like).unwrap(), "1");
    }

    #[test]
    fn reaction_type_serializes_as_code() {
        assert_eq!(serde_json::to_string(&ReactionType::Clear).unwrap(), "3");
        assert_eq!(serde_json::to_string(&ReactionType::Like).unwrap(), "1");
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("chef".parse::<Role>().unwrap(), Role::Chef);
        assert_eq!(Role::User.to_string(), "user");
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Chef.registration_code(), 1);
    }

    #[test]
    fn user_id_parses_trimmed_digits() {
        assert_eq!(" 7 ".parse::<UserId>().unwrap(), UserId(7));
        assert!("seven".parse::<UserId>().is_err());
    }
}

//! # tastybites-shared
//!
//! Types shared by the storage and client crates: backend wire models,
//! identifier newtypes, the numeric codes the backend uses for reactions and
//! roles, and small presentation helpers.

pub mod constants;
pub mod error;
pub mod media;
pub mod models;
pub mod types;

pub use error::ModelError;
pub use models::*;
pub use types::*;

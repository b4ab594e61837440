//! # tastybites-store
//!
//! Durable local storage for the Tastybites client, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection`, runs schema migrations on open, and provides a
//! small key/value table plus typed helpers for persisting the login session.

pub mod database;
pub mod kv;
pub mod migrations;
pub mod session;

mod error;

pub use database::Database;
pub use error::StoreError;

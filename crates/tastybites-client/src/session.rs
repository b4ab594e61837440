//! The single source of truth for "who is logged in".
//!
//! A [`SessionStore`] is created once at startup and handed to every
//! component that issues requests (`Arc<SessionStore>`). It keeps the last
//! loaded or saved session in memory so request builders never touch disk.

use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};

use tastybites_shared::Session;
use tastybites_store::Database;

use crate::error::{ClientError, Result};

pub struct SessionStore {
    db: Mutex<Database>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            current: RwLock::new(None),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Read the persisted session. Storage errors are logged and treated as
    /// "no session".
    pub fn load(&self) -> Option<Session> {
        let loaded = {
            let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
            db.load_session()
        };

        let session = match loaded {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored session");
                None
            }
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        session
    }

    /// Persist `session`. The in-memory copy only changes once all fields
    /// are committed.
    pub fn save(&self, session: Session) -> Result<()> {
        {
            let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
            db.save_session(&session)?;
        }

        tracing::info!(role = %session.role, user_id = %session.user_id, "session saved");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        {
            let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
            db.clear_session()?;
        }

        tracing::info!("session cleared");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bearer token for the next request.
    pub fn token(&self) -> Result<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ClientError::NoSession)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tastybites_shared::{Role, UserId};

    fn session() -> Session {
        Session {
            token: "abc".into(),
            role: Role::Chef,
            user_id: UserId(7),
        }
    }

    #[test]
    fn empty_store_has_no_session() {
        let store = SessionStore::in_memory().unwrap();
        assert_eq!(store.load(), None);
        assert!(matches!(store.token(), Err(ClientError::NoSession)));
    }

    #[test]
    fn save_load_clear_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let store = SessionStore::open(&path).unwrap();
        store.save(session()).unwrap();
        assert_eq!(store.token().unwrap(), "abc");
        drop(store);

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.current(), None);
        assert_eq!(reopened.load(), Some(session()));
        assert!(reopened.is_logged_in());

        reopened.clear().unwrap();
        assert!(!reopened.is_logged_in());
        assert_eq!(reopened.load(), None);
    }

    #[test]
    fn corrupt_storage_reads_as_logged_out() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("access_token", "abc").unwrap();
        db.set_value("user_role", "admin").unwrap();
        db.set_value("user_id", "7").unwrap();

        let store = SessionStore::new(db);
        assert_eq!(store.load(), None);
    }
}

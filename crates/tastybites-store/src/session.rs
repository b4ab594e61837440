//! Persistence of the login session under the `access_token`, `user_role`
//! and `user_id` keys.
//!
//! The three keys are written and cleared inside a single transaction, so a
//! reader never observes a half-written session.

use tastybites_shared::constants::{KEY_ACCESS_TOKEN, KEY_USER_ID, KEY_USER_ROLE};
use tastybites_shared::{Role, Session, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::kv;

const SESSION_KEYS: [&str; 3] = [KEY_ACCESS_TOKEN, KEY_USER_ROLE, KEY_USER_ID];

impl Database {
    /// Persist all three session fields or none of them.
    pub fn save_session(&mut self, session: &Session) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        kv::put(&tx, KEY_ACCESS_TOKEN, &session.token)?;
        kv::put(&tx, KEY_USER_ROLE, session.role.as_str())?;
        kv::put(&tx, KEY_USER_ID, &session.user_id.to_string())?;
        tx.commit()?;

        tracing::debug!(role = %session.role, user_id = %session.user_id, "session persisted");
        Ok(())
    }

    /// Read the stored session.
    ///
    /// Returns `Ok(None)` when no session is stored or when only some of the
    /// fields are present (a partial session is never valid).
    pub fn load_session(&self) -> Result<Option<Session>> {
        let token = kv::get(self.conn(), KEY_ACCESS_TOKEN)?;
        let role = kv::get(self.conn(), KEY_USER_ROLE)?;
        let user_id = kv::get(self.conn(), KEY_USER_ID)?;

        let (token, role, user_id) = match (token, role, user_id) {
            (Some(t), Some(r), Some(u)) if !t.is_empty() => (t, r, u),
            (None, None, None) => return Ok(None),
            _ => {
                tracing::warn!("ignoring incomplete stored session");
                return Ok(None);
            }
        };

        let role: Role = role.parse().map_err(|e: tastybites_shared::ModelError| {
            StoreError::Corrupt {
                key: KEY_USER_ROLE.to_string(),
                reason: e.to_string(),
            }
        })?;
        let user_id: UserId = user_id.parse().map_err(|e: tastybites_shared::ModelError| {
            StoreError::Corrupt {
                key: KEY_USER_ID.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Some(Session {
            token,
            role,
            user_id,
        }))
    }

    /// Remove every session key.
    pub fn clear_session(&mut self) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        for key in SESSION_KEYS {
            kv::remove(&tx, key)?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chef_session() -> Session {
        Session {
            token: "abc".into(),
            role: Role::Chef,
            user_id: UserId(7),
        }
    }

    #[test]
    fn save_then_load() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_session().unwrap(), None);

        db.save_session(&chef_session()).unwrap();
        assert_eq!(db.load_session().unwrap(), Some(chef_session()));
        assert_eq!(db.get_value("access_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(db.get_value("user_role").unwrap().as_deref(), Some("chef"));
        assert_eq!(db.get_value("user_id").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        {
            let mut db = Database::open_at(&path).unwrap();
            db.save_session(&chef_session()).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load_session().unwrap(), Some(chef_session()));
    }

    #[test]
    fn partial_session_is_ignored() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_ACCESS_TOKEN, "abc").unwrap();
        db.set_value(KEY_USER_ROLE, "user").unwrap();

        assert_eq!(db.load_session().unwrap(), None);
    }

    #[test]
    fn corrupt_role_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_ACCESS_TOKEN, "abc").unwrap();
        db.set_value(KEY_USER_ROLE, "admin").unwrap();
        db.set_value(KEY_USER_ID, "1").unwrap();

        assert!(matches!(
            db.load_session(),
            Err(StoreError::Corrupt { ref key, .. }) if key == KEY_USER_ROLE
        ));
    }

    #[test]
    fn clear_removes_every_key() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_session(&chef_session()).unwrap();
        db.set_value("theme", "dark").unwrap();

        db.clear_session().unwrap();

        assert_eq!(db.load_session().unwrap(), None);
        for key in SESSION_KEYS {
            assert_eq!(db.get_value(key).unwrap(), None);
        }
        assert_eq!(db.get_value("theme").unwrap().as_deref(), Some("dark"));
    }
}

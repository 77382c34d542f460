//! Session and identity.
//!
//! A [`Session`] holds the signed-in user, if any. It is an ordinary value owned by the
//! caller and passed to whatever needs to know who is asking; there is no global
//! session. The signed-in user is mirrored to a persisted slot so a restart can pick
//! the session back up.
//!
//! State machine: no session → `login` → active(user) → `logout` → no session. Logging
//! in again while active replaces the user.

use crate::{
    config::AuthSettings,
    core::{
        session_state::{get_slot_value, remove_slot, set_slot_value},
        store::RecordStore,
        visibility::Visibility,
    },
    entities::{Role, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{info, instrument, warn};

/// One role or a set of roles to test membership against.
pub trait RoleSet {
    /// Whether `role` is in the set.
    fn contains_role(&self, role: Role) -> bool;
}

impl RoleSet for Role {
    fn contains_role(&self, role: Role) -> bool {
        *self == role
    }
}

impl RoleSet for [Role] {
    fn contains_role(&self, role: Role) -> bool {
        self.contains(&role)
    }
}

impl<const N: usize> RoleSet for [Role; N] {
    fn contains_role(&self, role: Role) -> bool {
        self.contains(&role)
    }
}

impl<T> RoleSet for &T
where
    T: RoleSet + ?Sized,
{
    fn contains_role(&self, role: Role) -> bool {
        (**self).contains_role(role)
    }
}

/// The signed-in user plus the settings that govern login.
#[derive(Debug, Clone)]
pub struct Session {
    settings: AuthSettings,
    current: Option<user::Model>,
}

impl Session {
    /// Creates an empty session without touching the persisted slot.
    #[must_use]
    pub const fn new(settings: AuthSettings) -> Self {
        Self {
            settings,
            current: None,
        }
    }

    /// Restores the session from the persisted slot.
    ///
    /// A slot that cannot be decoded is removed and the session starts empty.
    #[instrument(skip(db, settings))]
    pub async fn restore(db: &DatabaseConnection, settings: AuthSettings) -> Result<Self> {
        let current = match get_slot_value(db, &settings.session_key).await? {
            None => None,
            Some(raw) => match serde_json::from_str::<user::Model>(&raw) {
                Ok(user) => {
                    info!("Restored session for {} ({})", user.email, user.role);
                    Some(user)
                }
                Err(e) => {
                    warn!("Discarding unreadable persisted session: {}", e);
                    remove_slot(db, &settings.session_key).await?;
                    None
                }
            },
        };

        Ok(Self { settings, current })
    }

    /// Signs in as `role`.
    ///
    /// Waits for the configured login delay, then looks up a user with this email and
    /// role and checks the shared password. Every failure is the same
    /// [`Error::InvalidCredentials`] and leaves the session as it was.
    #[instrument(skip(self, db, password))]
    pub async fn login(
        &mut self,
        db: &DatabaseConnection,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<&user::Model> {
        tokio::time::sleep(self.settings.login_delay()).await;

        let Some(found) = db.user_by_email_and_role(email, role).await? else {
            warn!("Login rejected for {}", email);
            return Err(Error::InvalidCredentials);
        };

        if password != self.settings.shared_secret {
            warn!("Login rejected for {}", email);
            return Err(Error::InvalidCredentials);
        }

        let mut active_model: user::ActiveModel = found.into();
        active_model.last_login_at = Set(Some(Utc::now()));
        let signed_in = active_model.update(db).await?;

        let payload = serde_json::to_string(&signed_in)?;
        set_slot_value(db, &self.settings.session_key, &payload).await?;

        info!(
            "Logged in as {} ({})",
            signed_in.full_name(),
            signed_in.role
        );
        Ok(&*self.current.insert(signed_in))
    }

    /// Signs out and removes the persisted slot.
    #[instrument(skip(self, db))]
    pub async fn logout(&mut self, db: &DatabaseConnection) -> Result<()> {
        remove_slot(db, &self.settings.session_key).await?;
        if let Some(user) = self.current.take() {
            info!("Logged out {}", user.email);
        }
        Ok(())
    }

    /// The signed-in user.
    #[must_use]
    pub const fn current_user(&self) -> Option<&user::Model> {
        self.current.as_ref()
    }

    /// The signed-in user, or [`Error::NotAuthenticated`].
    pub fn require_user(&self) -> Result<&user::Model> {
        self.current.as_ref().ok_or(Error::NotAuthenticated)
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the signed-in user's role is in `roles`. False with no session.
    #[must_use]
    pub fn has_role(&self, roles: impl RoleSet) -> bool {
        self.current
            .as_ref()
            .is_some_and(|user| roles.contains_role(user.role))
    }

    /// What the signed-in user may see.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        Visibility::for_user(self.current.as_ref())
    }

    /// Settings this session was created with.
    #[must_use]
    pub const fn settings(&self) -> &AuthSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{fast_auth_settings, init_test_tracing, seeded_test_db};

    #[tokio::test]
    async fn test_login_success_persists_session() -> Result<()> {
        init_test_tracing();
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());

        let user = session
            .login(&db, "hunter@demo.com", "demo123", Role::Hunter)
            .await?;
        assert_eq!(user.first_name, "John");
        assert!(user.last_login_at.is_some());
        assert!(session.is_authenticated());

        let raw = get_slot_value(&db, "taxidermy_user").await?.unwrap();
        let persisted: user::Model = serde_json::from_str(&raw)?;
        assert_eq!(Some(&persisted), session.current_user());

        // last_login_at is written back to the users table
        let stored = db.user_by_id("1").await?.unwrap();
        assert_eq!(stored.last_login_at, persisted.last_login_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_and_wrong_role_fail_identically() -> Result<()> {
        init_test_tracing();
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());

        let wrong_password = session
            .login(&db, "hunter@demo.com", "nope", Role::Hunter)
            .await
            .unwrap_err();
        let wrong_role = session
            .login(&db, "hunter@demo.com", "demo123", Role::Taxidermist)
            .await
            .unwrap_err();
        let unknown_email = session
            .login(&db, "nobody@demo.com", "demo123", Role::Hunter)
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(wrong_role, Error::InvalidCredentials));
        assert!(matches!(unknown_email, Error::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), wrong_role.to_string());

        assert!(!session.is_authenticated());
        assert!(get_slot_value(&db, "taxidermy_user").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() -> Result<()> {
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());

        session
            .login(&db, "admin@demo.com", "demo123", Role::Admin)
            .await?;
        let result = session
            .login(&db, "hunter@demo.com", "bad", Role::Hunter)
            .await;

        assert!(result.is_err());
        assert!(session.has_role(Role::Admin));
        Ok(())
    }

    #[tokio::test]
    async fn test_relogin_replaces_user() -> Result<()> {
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());

        session
            .login(&db, "hunter@demo.com", "demo123", Role::Hunter)
            .await?;
        session
            .login(&db, "taxidermist@demo.com", "demo123", Role::Taxidermist)
            .await?;

        assert!(session.has_role(Role::Taxidermist));
        assert!(!session.has_role(Role::Hunter));

        let restored = Session::restore(&db, fast_auth_settings()).await?;
        assert_eq!(restored.current_user().unwrap().id, "2");
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_slot() -> Result<()> {
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());

        session
            .login(&db, "admin@demo.com", "demo123", Role::Admin)
            .await?;
        session.logout(&db).await?;

        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
        assert!(get_slot_value(&db, "taxidermy_user").await?.is_none());

        // Logging out twice is harmless
        session.logout(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_round_trip() -> Result<()> {
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());
        session
            .login(&db, "taxidermist@demo.com", "demo123", Role::Taxidermist)
            .await?;

        let restored = Session::restore(&db, fast_auth_settings()).await?;
        assert_eq!(restored.current_user(), session.current_user());
        assert_eq!(
            restored.visibility(),
            Visibility::Taxidermist("2".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_with_no_slot_is_empty() -> Result<()> {
        let db = seeded_test_db().await?;
        let session = Session::restore(&db, fast_auth_settings()).await?;
        assert!(!session.is_authenticated());
        assert_eq!(session.visibility(), Visibility::Nothing);
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_discards_corrupt_slot() -> Result<()> {
        init_test_tracing();
        let db = seeded_test_db().await?;
        set_slot_value(&db, "taxidermy_user", "{not json").await?;

        let session = Session::restore(&db, fast_auth_settings()).await?;
        assert!(!session.is_authenticated());
        assert!(get_slot_value(&db, "taxidermy_user").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_has_role_accepts_single_and_many() -> Result<()> {
        let db = seeded_test_db().await?;
        let mut session = Session::new(fast_auth_settings());

        assert!(!session.has_role(Role::Admin));
        assert!(!session.has_role([Role::Hunter, Role::Taxidermist, Role::Admin]));

        session
            .login(&db, "taxidermist@demo.com", "demo123", Role::Taxidermist)
            .await?;
        assert!(session.has_role(Role::Taxidermist));
        assert!(session.has_role([Role::Taxidermist, Role::Admin]));
        assert!(!session.has_role([Role::Hunter]));

        let roles: &[Role] = &[Role::Admin, Role::Taxidermist];
        assert!(session.has_role(roles));
        Ok(())
    }

    #[tokio::test]
    async fn test_require_user() -> Result<()> {
        let session = Session::new(fast_auth_settings());
        assert!(matches!(
            session.require_user(),
            Err(Error::NotAuthenticated)
        ));
        Ok(())
    }
}

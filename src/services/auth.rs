//! Authentication service
//!
//! Email/password accounts with server-side sessions:
//! - sign-up stores an Argon2id hash and grants the admin role to
//!   configured admin emails
//! - sign-in issues a random session token valid for the configured days
//! - a token resolves to the user plus its admin flag until it expires
//! - sign-out deletes the session

use crate::config::AuthConfig;
use crate::db::is_unique_violation;
use crate::db::repositories::{RoleRepository, SessionRepository, UserRepository};
use crate::models::{Role, Session, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::validation::{validate_sign_in, validate_sign_up, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email atau password salah";
pub const EMAIL_TAKEN_MESSAGE: &str = "Email sudah terdaftar";

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    ValidationError(String),

    /// Unknown email or wrong password; callers cannot tell which
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<ValidationError> for AuthServiceError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err.0)
    }
}

/// Sign-up form
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl SignUpInput {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-in form
#[derive(Debug, Clone, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl SignInInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// A resolved session: who is signed in and whether they may moderate
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user: User,
    pub is_admin: bool,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    roles: Arc<dyn RoleRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        roles: Arc<dyn RoleRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            roles,
            config,
        }
    }

    /// Register an account.
    pub async fn sign_up(&self, input: SignUpInput) -> Result<User, AuthServiceError> {
        let (full_name, email) = validate_sign_up(&input.full_name, &input.email, &input.password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken(email));
        }

        // A concurrent sign-up can still win the insert; the UNIQUE index decides
        let password_hash = hash_password(&input.password)?;
        let user = match self
            .users
            .create(&User::new(email.clone(), password_hash, full_name))
            .await
        {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(AuthServiceError::EmailTaken(email)),
            Err(e) => return Err(e.into()),
        };

        if self.config.is_admin_email(&user.email) {
            self.roles.grant(user.id, Role::Admin).await?;
            tracing::info!(user_id = user.id, "Granted admin role at sign-up");
        }

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and open a session.
    pub async fn sign_in(&self, input: SignInInput) -> Result<Session, AuthServiceError> {
        let email = validate_sign_in(&input.email, &input.password)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "Sign-in with wrong password");
            return Err(AuthServiceError::InvalidCredentials);
        }

        let session = self
            .sessions
            .create(&Session::issue(user.id, self.config.session_expiration_days))
            .await?;

        tracing::info!(user_id = user.id, "User signed in");
        Ok(session)
    }

    /// Delete the session. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthServiceError> {
        self.sessions.delete(token).await?;
        Ok(())
    }

    /// Resolve a token to its identity.
    ///
    /// Expired sessions are deleted on sight and reported as
    /// [`AuthServiceError::SessionExpired`].
    pub async fn identify(&self, token: &str) -> Result<Identity, AuthServiceError> {
        let session = self
            .sessions
            .get_by_id(token)
            .await?
            .ok_or(AuthServiceError::SessionNotFound)?;

        if session.is_expired() {
            self.sessions.delete(token).await?;
            return Err(AuthServiceError::SessionExpired);
        }

        let user = self
            .users
            .get_by_id(session.user_id)
            .await?
            .ok_or(AuthServiceError::SessionNotFound)?;
        let is_admin = self.is_admin(user.id).await?;

        Ok(Identity { user, is_admin })
    }

    /// Current identity, `None` when signed out or expired
    pub async fn current_session(
        &self,
        token: Option<&str>,
    ) -> Result<Option<Identity>, AuthServiceError> {
        let Some(token) = token else {
            return Ok(None);
        };
        match self.identify(token).await {
            Ok(identity) => Ok(Some(identity)),
            Err(AuthServiceError::SessionNotFound) | Err(AuthServiceError::SessionExpired) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthServiceError> {
        Ok(self.roles.has_role(user_id, Role::Admin).await?)
    }

    /// Grant the admin role to every configured admin email that already
    /// has an account. Returns how many accounts were matched.
    pub async fn grant_configured_admins(&self) -> Result<usize, AuthServiceError> {
        let mut granted = 0;
        for email in &self.config.admin_emails {
            if let Some(user) = self.users.get_by_email(email).await? {
                self.roles.grant(user.id, Role::Admin).await?;
                granted += 1;
            }
        }
        Ok(granted)
    }

    /// Delete expired sessions
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AuthServiceError> {
        Ok(self.sessions.delete_expired().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxRoleRepository, SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    async fn setup_with(admin_emails: Vec<String>) -> AuthService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        AuthService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxRoleRepository::boxed(pool),
            AuthConfig {
                session_expiration_days: 7,
                admin_emails,
            },
        )
    }

    async fn setup() -> AuthService {
        setup_with(vec!["admin@mitramutiara.co.id".to_string()]).await
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let service = setup().await;
        let user = service
            .sign_up(SignUpInput::new("Dewi", "dewi@example.com", "rahasia"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "rahasia");

        let session = service
            .sign_in(SignInInput::new("dewi@example.com", "rahasia"))
            .await
            .unwrap();
        let identity = service.identify(&session.id).await.unwrap();
        assert_eq!(identity.user.id, user.id);
        assert!(!identity.is_admin);
    }

    #[tokio::test]
    async fn test_configured_email_becomes_admin() {
        let service = setup().await;
        service
            .sign_up(SignUpInput::new("Admin", "Admin@MitraMutiara.co.id", "rahasia"))
            .await
            .unwrap();
        let session = service
            .sign_in(SignInInput::new("admin@mitramutiara.co.id", "rahasia"))
            .await
            .unwrap();
        assert!(service.identify(&session.id).await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_grant_configured_admins_for_existing_accounts() {
        let service = setup_with(vec![]).await;
        let user = service
            .sign_up(SignUpInput::new("Budi", "budi@example.com", "rahasia"))
            .await
            .unwrap();
        assert!(!service.is_admin(user.id).await.unwrap());

        let service = AuthService {
            config: AuthConfig {
                session_expiration_days: 7,
                admin_emails: vec!["budi@example.com".to_string(), "none@example.com".to_string()],
            },
            ..service
        };
        assert_eq!(service.grant_configured_admins().await.unwrap(), 1);
        assert!(service.is_admin(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let service = setup().await;
        service
            .sign_up(SignUpInput::new("Dewi", "dewi@example.com", "rahasia"))
            .await
            .unwrap();
        let err = service
            .sign_up(SignUpInput::new("Dewi Dua", "DEWI@example.com", "rahasia"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthServiceError::EmailTaken(_)));
    }

    /// Lookup that never sees existing rows, as when two sign-ups interleave
    struct BlindLookup(SqlxUserRepository);

    #[async_trait::async_trait]
    impl UserRepository for BlindLookup {
        async fn create(&self, user: &User) -> anyhow::Result<User> {
            self.0.create(user).await
        }

        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
            self.0.get_by_id(id).await
        }

        async fn get_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_sign_up_is_email_taken() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let service = AuthService::new(
            Arc::new(BlindLookup(SqlxUserRepository::new(pool.clone()))),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxRoleRepository::boxed(pool),
            AuthConfig::default(),
        );

        service
            .sign_up(SignUpInput::new("Dewi", "dewi@example.com", "rahasia"))
            .await
            .unwrap();
        let err = service
            .sign_up(SignUpInput::new("Dewi Dua", "dewi@example.com", "rahasia"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthServiceError::EmailTaken(ref e) if e == "dewi@example.com"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let service = setup().await;
        service
            .sign_up(SignUpInput::new("Dewi", "dewi@example.com", "rahasia"))
            .await
            .unwrap();

        let wrong = service
            .sign_in(SignInInput::new("dewi@example.com", "salah123"))
            .await
            .unwrap_err();
        let unknown = service
            .sign_in(SignInInput::new("siapa@example.com", "rahasia"))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthServiceError::InvalidCredentials));
        assert!(matches!(unknown, AuthServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_validation_runs_before_lookup() {
        let service = setup().await;
        let err = service
            .sign_in(SignInInput::new("dewi@example.com", "123"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AuthServiceError::ValidationError(ref m) if m == "Password minimal 6 karakter")
        );
    }

    #[tokio::test]
    async fn test_sign_out_ends_session() {
        let service = setup().await;
        service
            .sign_up(SignUpInput::new("Dewi", "dewi@example.com", "rahasia"))
            .await
            .unwrap();
        let session = service
            .sign_in(SignInInput::new("dewi@example.com", "rahasia"))
            .await
            .unwrap();

        service.sign_out(&session.id).await.unwrap();
        assert!(service
            .current_session(Some(&session.id))
            .await
            .unwrap()
            .is_none());
        service.sign_out("unknown-token").await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_swept() {
        let service = setup().await;
        let user = service
            .sign_up(SignUpInput::new("Dewi", "dewi@example.com", "rahasia"))
            .await
            .unwrap();

        let mut stale = Session::issue(user.id, 1);
        stale.expires_at = Utc::now() - Duration::minutes(1);
        service.sessions.create(&stale).await.unwrap();

        assert!(matches!(
            service.identify(&stale.id).await,
            Err(AuthServiceError::SessionExpired)
        ));

        let mut stale2 = Session::issue(user.id, 1);
        stale2.expires_at = Utc::now() - Duration::minutes(1);
        service.sessions.create(&stale2).await.unwrap();
        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_current_session_without_token() {
        let service = setup().await;
        assert!(service.current_session(None).await.unwrap().is_none());
    }

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn sign_in_resolves_to_same_user(
            local in "[a-z]{3,10}",
            password in "[a-zA-Z0-9]{6,20}",
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let service = setup().await;
                let email = format!("{}{}@example.com", local, COUNTER.fetch_add(1, Ordering::SeqCst));
                let user = service
                    .sign_up(SignUpInput::new("Pelamar", email.clone(), password.clone()))
                    .await
                    .unwrap();
                let session = service.sign_in(SignInInput::new(email, password)).await.unwrap();
                let identity = service.identify(&session.id).await.unwrap();
                assert_eq!(identity.user.id, user.id);
            });
        }
    }
}

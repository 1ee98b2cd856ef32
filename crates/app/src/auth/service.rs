//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{
        AuthServiceError, AuthenticatedSession, IssuedSession, NewSession, SessionSigningKey,
        SessionTokenVersion, build_verifier_input, format_session_token, generate_session_secret,
        parse_session_token,
        password::verify_password,
        repository::{PgSessionsRepository, SessionsRepository},
    },
    domain::{
        schools::{PgSchoolsRepository, SchoolsRepository},
        users::{PgUsersRepository, UsersRepository, records::normalize_email},
    },
};

/// Default lifetime of a sign-in session.
pub const DEFAULT_SESSION_TTL: SignedDuration = SignedDuration::from_hours(24 * 7);

/// Session-based authentication over Postgres.
#[derive(Clone)]
pub struct PgAuthService {
    sessions: Arc<dyn SessionsRepository>,
    users: Arc<dyn UsersRepository>,
    schools: Arc<dyn SchoolsRepository>,
    signing_key: SessionSigningKey,
    session_ttl: SignedDuration,
}

impl std::fmt::Debug for PgAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAuthService")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool, signing_key: SessionSigningKey, session_ttl: SignedDuration) -> Self {
        Self::from_parts(
            Arc::new(PgSessionsRepository::new(pool.clone())),
            Arc::new(PgUsersRepository::new(pool.clone())),
            Arc::new(PgSchoolsRepository::new(pool)),
            signing_key,
            session_ttl,
        )
    }

    /// Build the service from explicit repositories.
    #[must_use]
    pub fn from_parts(
        sessions: Arc<dyn SessionsRepository>,
        users: Arc<dyn UsersRepository>,
        schools: Arc<dyn SchoolsRepository>,
        signing_key: SessionSigningKey,
        session_ttl: SignedDuration,
    ) -> Self {
        Self {
            sessions,
            users,
            schools,
            signing_key,
            session_ttl,
        }
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedSession, AuthServiceError> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        if !user.verified {
            return Err(AuthServiceError::Unverified);
        }

        let session_uuid = Uuid::now_v7();
        let version = SessionTokenVersion::V1;
        let secret = generate_session_secret();
        let token = format_session_token(session_uuid, version, &secret);

        let verifier_input = build_verifier_input(&session_uuid, version, &user.uuid, &secret);
        let token_hash = self.signing_key.hmac(&verifier_input)?;

        let expires_at = Timestamp::now()
            .checked_add(self.session_ttl)
            .map_err(AuthServiceError::ExpiryOutOfRange)?;

        let session = self
            .sessions
            .create_session(NewSession {
                uuid: session_uuid,
                user_uuid: user.uuid,
                version,
                token_hash,
                expires_at,
            })
            .await?;

        info!(user = %user.uuid, session = %session.uuid, "user signed in");

        Ok(IssuedSession {
            token,
            expires_at: session.expires_at,
            user,
        })
    }

    async fn authenticate_session(
        &self,
        token: &str,
    ) -> Result<AuthenticatedSession, AuthServiceError> {
        let parsed = parse_session_token(token).map_err(|_error| AuthServiceError::NotFound)?;

        let session = self
            .sessions
            .find_active_session(parsed.session_uuid, parsed.version, Timestamp::now())
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if session.version != parsed.version {
            return Err(AuthServiceError::NotFound);
        }

        let verifier_input = build_verifier_input(
            &parsed.session_uuid,
            parsed.version,
            &session.user_uuid,
            &parsed.secret,
        );

        if !self.signing_key.verify(&verifier_input, &session.token_hash) {
            debug!(session = %session.uuid, "session token verifier mismatch");

            return Err(AuthServiceError::NotFound);
        }

        let user = self
            .users
            .find_user(session.user_uuid)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let school = self
            .schools
            .find_school(user.school_uuid)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        // Best-effort metadata update; auth success should not depend on this write.
        let _touch_result = self.sessions.touch_session(session.uuid).await;

        Ok(AuthenticatedSession {
            session_uuid: session.uuid,
            user,
            school,
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthServiceError> {
        let session = self.authenticate_session(token).await?;

        let revoked = self.sessions.revoke_session(session.session_uuid).await?;

        if revoked == 0 {
            return Err(AuthServiceError::NotFound);
        }

        info!(user = %session.user.uuid, session = %session.session_uuid, "user signed out");

        Ok(())
    }
}

/// Session sign-in and lookup.
#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and open a new session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedSession, AuthServiceError>;

    /// Resolve a raw session token to its user and school.
    async fn authenticate_session(
        &self,
        token: &str,
    ) -> Result<AuthenticatedSession, AuthServiceError>;

    /// Revoke the session a token belongs to.
    async fn sign_out(&self, token: &str) -> Result<(), AuthServiceError>;
}

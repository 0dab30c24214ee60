//! Login and session resolution.
//!
//! Credentials live on the `profissionais` table (the upstream identity
//! provider is out of scope); a successful login mints an opaque session
//! token that the API layer resolves back to an identity and role on every
//! protected request. Authorisation failures never reveal which part of the
//! credential pair was wrong.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::db::Database;
use crate::error::{SupridentError, SupridentResult};
use crate::models::{now_rfc3339, AuthSession, Session};

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub profissional_id: String,
    pub role: String,
}

/// Service for login and session checks.
pub struct AuthService<'a> {
    db: &'a Database,
    session_ttl_hours: i64,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database, cfg: &CoreConfig) -> Self {
        Self {
            db,
            session_ttl_hours: cfg.session_ttl_hours(),
        }
    }

    /// Verifies credentials and mints a session.
    ///
    /// Expired sessions are purged opportunistically on each login so the
    /// table does not grow without bound.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for an unknown login or wrong code, with no
    /// distinction between the two.
    pub fn login(&self, login: &str, code: &str) -> SupridentResult<LoginOutcome> {
        if login.trim().is_empty() || code.is_empty() {
            return Err(SupridentError::Unauthorized);
        }

        let profissional = self
            .db
            .get_profissional_by_login(login.trim())?
            .ok_or(SupridentError::Unauthorized)?;

        match &profissional.senha {
            Some(senha) if senha == code => {}
            _ => return Err(SupridentError::Unauthorized),
        }

        let now = now_rfc3339();
        if let Err(err) = self.db.purge_expired_sessions(&now) {
            tracing::warn!("failed to purge expired sessions: {err}");
        }

        let expires_at = (Utc::now() + Duration::hours(self.session_ttl_hours))
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let session = Session {
            token: Uuid::new_v4().to_string(),
            profissional_id: profissional.id.clone(),
            role: profissional.role.clone(),
            created_at: now,
            expires_at,
        };
        self.db.insert_session(&session)?;

        Ok(LoginOutcome {
            token: session.token,
            profissional_id: profissional.id,
            role: profissional.role,
        })
    }

    /// Resolves a bearer token to the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for unknown, expired or unparseable sessions.
    pub fn session(&self, token: &str) -> SupridentResult<AuthSession> {
        let session = self
            .db
            .get_session(token)?
            .ok_or(SupridentError::Unauthorized)?;

        let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
            .map_err(|_| SupridentError::Unauthorized)?;
        if expires_at < Utc::now() {
            return Err(SupridentError::Unauthorized);
        }

        Ok(AuthSession {
            profissional_id: session.profissional_id,
            role: session.role,
        })
    }
}

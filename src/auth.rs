//! Admin authentication
//!
//! A single shared secret guards the admin view. Whether a caller has
//! presented it is tracked in an explicit `AdminSession`; the HTTP layer keeps
//! one per bearer token in a `SessionRegistry`.

use crate::error::{FeedbackError, Result};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The shared admin secret
pub struct AdminCredential {
    secret: Option<SecretString>,
}

impl AdminCredential {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret: Some(secret),
        }
    }

    /// Build from optional configured text; blank counts as unset
    pub fn from_password(password: Option<String>) -> Self {
        match password.filter(|p| !p.is_empty()) {
            Some(p) => Self::new(SecretString::new(p.into())),
            None => Self::disabled(),
        }
    }

    /// A credential that rejects every attempt
    pub fn disabled() -> Self {
        Self { secret: None }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Check an attempt against the secret
    ///
    /// Compares SHA-256 digests with a full-length fold so the time taken
    /// does not depend on how many leading bytes match.
    pub fn verify(&self, attempt: &str) -> Result<()> {
        let Some(secret) = &self.secret else {
            warn!("Admin login attempted but no admin password is configured");
            return Err(FeedbackError::Auth);
        };

        let expected = Sha256::digest(secret.expose_secret().as_bytes());
        let given = Sha256::digest(attempt.as_bytes());
        let diff = expected
            .iter()
            .zip(given.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(FeedbackError::Auth)
        }
    }
}

/// Whether the current caller has passed the admin check
///
/// Starts unauthenticated. `login` sets it on success and clears it on
/// failure; `logout` clears it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AdminSession {
    authenticated: bool,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn login(&mut self, credential: &AdminCredential, attempt: &str) -> Result<()> {
        let outcome = credential.verify(attempt);
        self.authenticated = outcome.is_ok();
        outcome
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
    }

    /// Fail with `FeedbackError::Auth` unless authenticated
    pub fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(FeedbackError::Auth)
        }
    }
}

/// How long a bearer token stays valid after login
pub const SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Authenticated admin sessions keyed by bearer token
///
/// Sessions expire `ttl` after login. Expired entries are dropped whenever a
/// session is opened or looked up, so the map only holds live tokens.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, (AdminSession, Instant)>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Open a session if the attempt matches, returning its token
    pub async fn login(&self, credential: &AdminCredential, attempt: &str) -> Result<Uuid> {
        let mut session = AdminSession::new();
        session.login(credential, attempt)?;

        let token = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.insert(token, (session, Instant::now()));
        info!("Admin session opened ({} active)", sessions.len());
        Ok(token)
    }

    /// Close a session; unknown tokens are ignored
    pub async fn logout(&self, token: Uuid) {
        let removed = self.sessions.write().await.remove(&token);
        if let Some((mut session, _)) = removed {
            session.logout();
            debug!("Admin session closed ({} active)", self.active().await);
        }
    }

    /// Session for `token`; unknown or expired tokens get a fresh
    /// unauthenticated one
    pub async fn session(&self, token: Uuid) -> AdminSession {
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions
            .get(&token)
            .map(|(session, _)| *session)
            .unwrap_or_default()
    }

    /// Fail with `FeedbackError::Auth` unless `token` names a live session
    pub async fn require(&self, token: Uuid) -> Result<()> {
        self.session(token).await.require()
    }

    /// Number of live sessions
    pub async fn active(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.len()
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, (AdminSession, Instant)>) {
        let before = sessions.len();
        sessions.retain(|_, (_, opened)| opened.elapsed() < self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Dropped {} expired admin session(s)", expired);
        }
    }
}

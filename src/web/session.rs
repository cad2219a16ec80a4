use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::modules::itinerary::Itinerary;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    Staff,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Staff => "Staff",
        }
    }
}

/// Per-client state from login to logout. The zero value is the logged-out state.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub authenticated: bool,
    pub role: Role,
    pub current_user: Option<String>,
    pub password_change_required: bool,
    pub title: String,
    pub itinerary: Itinerary,
}

impl Session {
    pub fn username(&self) -> &str {
        self.current_user.as_deref().unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated && self.role == Role::Admin
    }

    /// Resets everything, itinerary included.
    pub fn logout(&mut self) {
        *self = Session::default();
    }
}

struct StoredSession {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// In-memory session table keyed by the cookie token.
///
/// Only authenticated sessions are stored; logout removes the entry.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Stores a fresh session and returns its token. Expired sessions are purged here.
    pub async fn create(&self, session: Session) -> Uuid {
        let token = Uuid::new_v4();
        let now = Utc::now();
        let mut guard = self.inner.write().await;
        guard.retain(|_, stored| stored.expires_at > now);
        guard.insert(
            token,
            StoredSession {
                session,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Copy of the live session, if the token is known and unexpired.
    pub async fn get(&self, token: Uuid) -> Option<Session> {
        let guard = self.inner.read().await;
        guard
            .get(&token)
            .filter(|stored| stored.expires_at > Utc::now())
            .map(|stored| stored.session.clone())
    }

    /// Applies `apply` under the write lock so it always sees the latest state.
    pub async fn update<F, R>(&self, token: Uuid, apply: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut guard = self.inner.write().await;
        let expired = guard.get(&token)?.expires_at <= Utc::now();
        if expired {
            guard.remove(&token);
            return None;
        }
        let stored = guard.get_mut(&token)?;
        Some(apply(&mut stored.session))
    }

    /// Logs the session out and drops it.
    pub async fn remove(&self, token: Uuid) -> Option<Session> {
        let mut guard = self.inner.write().await;
        guard.remove(&token).map(|mut stored| {
            stored.session.logout();
            stored.session
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

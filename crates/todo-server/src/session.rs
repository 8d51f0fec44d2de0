//! Per-client session state
//!
//! Sessions are kept in memory and addressed by a random id carried in a
//! signed cookie. Each session sits behind its own mutex; a handler holds
//! it for its whole read-modify-write so concurrent requests from the same
//! client serialize instead of overwriting each other.

use std::collections::HashMap;
use std::future::ready;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use sha2::{Digest, Sha512};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use todo_core::TodoLists;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::RequestTrace;

/// One-shot messages shown on the next rendered view.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Flash {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Flash {
    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct SessionData {
    pub lists: TodoLists,
    flash: Flash,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.flash.success = Some(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.flash.error = Some(message.into());
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    /// Hands out pending messages and clears them.
    pub fn take_flash(&mut self) -> Flash {
        std::mem::take(&mut self.flash)
    }
}

struct SessionEntry {
    data: Arc<Mutex<SessionData>>,
    last_seen: Instant,
}

/// In-memory store of all live sessions.
///
/// Entries idle for longer than `ttl` are dropped whenever the store is
/// touched.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn evict_expired(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            log::debug!("Evicted {} expired session(s)", evicted);
        }
    }

    /// Looks up a live session and marks it as used.
    pub async fn load(&self, id: &str) -> Option<Arc<Mutex<SessionData>>> {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);

        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.data.clone())
    }

    pub async fn create(&self) -> (String, Arc<Mutex<SessionData>>) {
        let id = Uuid::new_v4().to_string();
        let data = Arc::new(Mutex::new(SessionData::new()));

        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        sessions.insert(
            id.clone(),
            SessionEntry {
                data: data.clone(),
                last_seen: Instant::now(),
            },
        );
        log::debug!("[{}] Session created", id);

        (id, data)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Signs and verifies the session id cookie.
#[derive(Clone)]
pub struct SessionCookie {
    name: String,
    key: Key,
}

impl SessionCookie {
    /// The signing key is the SHA-512 digest of `secret`, which yields the
    /// 64 bytes `Key` needs from a secret of any length.
    pub fn new(name: impl Into<String>, secret: &str) -> Self {
        let digest = Sha512::digest(secret.as_bytes());
        Self {
            name: name.into(),
            key: Key::from(digest.as_slice()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sign(&self, session_id: &str) -> Option<Cookie<'static>> {
        let cookie = Cookie::build(self.name.clone(), session_id.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish();

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key).add(cookie);
        jar.get(&self.name).cloned()
    }

    /// Returns the session id if the cookie carries a valid signature.
    pub fn verify(&self, cookie: Cookie<'static>) -> Option<String> {
        let mut jar = CookieJar::new();
        jar.add_original(cookie);
        jar.signed(&self.key)
            .get(&self.name)
            .map(|cookie| cookie.value().to_string())
    }
}

/// The current request's session.
///
/// [`crate::middleware::SessionMiddleware`] attaches an existing session to
/// the request. Without one, extracting a handle creates the session, so
/// requests whose handlers never touch it leave the store alone.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    data: Arc<Mutex<SessionData>>,
}

impl SessionHandle {
    pub fn new(id: String, data: Arc<Mutex<SessionData>>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().await
    }
}

impl FromRequest for SessionHandle {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(handle) = req.extensions().get::<SessionHandle>().cloned() {
            return Box::pin(ready(Ok(handle)));
        }

        let store = req.extensions().get::<SessionStore>().cloned();
        let req = req.clone();
        Box::pin(async move {
            let store = store.ok_or(AppError::SessionUnavailable)?;
            let (id, data) = store.create().await;
            let handle = SessionHandle::new(id, data);

            let mut extensions = req.extensions_mut();
            if let Some(trace) = extensions.get_mut::<RequestTrace>() {
                trace.record_session(handle.id());
            }
            extensions.insert(handle.clone());
            Ok(handle)
        })
    }
}

//! Per-user session state: the cached bearer token and the actions a user
//! can trigger.
//!
//! A session handles one action at a time. In the server each session sits
//! behind an async mutex held for the whole action, so the token is only ever
//! read and replaced by the action currently in flight.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::generation::GenerationRequest;
use crate::models::token::TokenInfo;
use crate::upstream::Upstream;

pub struct Session {
    upstream: Arc<Upstream>,
    token: Option<TokenInfo>,
}

impl Session {
    pub fn new(upstream: Arc<Upstream>) -> Self {
        Self {
            upstream,
            token: None,
        }
    }

    pub fn cached_token(&self) -> Option<&TokenInfo> {
        self.token.as_ref()
    }

    /// Reuse the cached token while valid, otherwise exchange the API key for
    /// a new one. A failed exchange leaves the stale entry in place; it is
    /// invalid anyway and gets replaced by the next success.
    pub async fn ensure_token(&mut self) -> Result<TokenInfo, AppError> {
        let now = self.upstream.clock().now();
        if let Some(token) = &self.token {
            if token.is_valid(now) {
                tracing::debug!(remaining_secs = token.remaining_secs(now), "reusing cached token");
                return Ok(token.clone());
            }
            tracing::debug!("cached token is stale, refreshing");
        }

        let fresh = self
            .upstream
            .iam
            .obtain_token(self.upstream.api_key(), self.upstream.clock())
            .await?;
        self.token = Some(fresh.clone());
        Ok(fresh)
    }

    /// Token first, then endpoint, then the single generation call.
    pub async fn generate(&mut self, request: &GenerationRequest) -> Result<String, AppError> {
        let token = self.ensure_token().await?;
        if !self.upstream.generation.is_configured() {
            return Err(AppError::MissingBaseUrl);
        }
        self.upstream.generation.generate(&token, request).await
    }

    /// Like [`Session::generate`] but every failure becomes display text.
    pub async fn answer(&mut self, request: &GenerationRequest) -> String {
        match self.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("answer replaced by error message: {}", e);
                e.display_message()
            }
        }
    }

    /// Token acquisition only; no generation call.
    pub async fn test_connection(&mut self) -> Result<String, AppError> {
        let token = self.ensure_token().await?;
        let now = self.upstream.clock().now();
        Ok(format!(
            "Connected: access token acquired (valid for another {}s).",
            token.remaining_secs(now)
        ))
    }
}

struct SessionEntry {
    session: Arc<Mutex<Session>>,
    last_seen: DateTime<Utc>,
}

/// Idle sessions older than this are dropped when new ones are created.
pub const SESSION_IDLE_TTL_SECS: i64 = 2 * 60 * 60;

/// Session id → session. Requests without an id share the default session.
pub struct SessionStore {
    upstream: Arc<Upstream>,
    default: Arc<Mutex<Session>>,
    sessions: DashMap<Uuid, SessionEntry>,
}

impl SessionStore {
    pub fn new(upstream: Arc<Upstream>) -> Self {
        Self {
            default: Arc::new(Mutex::new(Session::new(upstream.clone()))),
            upstream,
            sessions: DashMap::new(),
        }
    }

    pub fn get(&self, id: Option<Uuid>) -> Arc<Mutex<Session>> {
        let Some(id) = id else {
            return self.default.clone();
        };

        let now = self.upstream.clock().now();
        if !self.sessions.contains_key(&id) {
            self.evict_idle(now);
        }

        // Lookup and insert happen under one shard lock, so concurrent first
        // requests for the same id end up sharing one session.
        let mut entry = self.sessions.entry(id).or_insert_with(|| {
            tracing::debug!(session_id = %id, "new session");
            SessionEntry {
                session: Arc::new(Mutex::new(Session::new(self.upstream.clone()))),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        entry.session.clone()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_idle(&self, now: DateTime<Utc>) {
        let ttl = Duration::seconds(SESSION_IDLE_TTL_SECS);
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| now - entry.last_seen < ttl);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, "dropped idle sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;

    fn upstream(clock: &ManualClock) -> Arc<Upstream> {
        let cfg = Config::new(None, None).with_iam_url("http://127.0.0.1:9/identity/token");
        Arc::new(
            Upstream::from_config(&cfg)
                .unwrap()
                .with_clock(Arc::new(clock.clone())),
        )
    }

    #[test]
    fn test_same_id_returns_same_session() {
        let clock = ManualClock::new(Utc::now());
        let store = SessionStore::new(upstream(&clock));
        let id = Uuid::new_v4();
        let a = store.get(Some(id));
        let b = store.get(Some(id));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_first_requests_share_one_session() {
        let clock = ManualClock::new(Utc::now());
        let store = SessionStore::new(upstream(&clock));
        let id = Uuid::new_v4();
        let barrier = std::sync::Barrier::new(8);

        let sessions: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        store.get(Some(id))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_id_uses_default_session() {
        let clock = ManualClock::new(Utc::now());
        let store = SessionStore::new(upstream(&clock));
        let a = store.get(None);
        let b = store.get(None);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(store.is_empty());
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let clock = ManualClock::new(Utc::now());
        let store = SessionStore::new(upstream(&clock));
        store.get(Some(Uuid::new_v4()));
        clock.advance(Duration::seconds(SESSION_IDLE_TTL_SECS + 1));
        store.get(Some(Uuid::new_v4()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits_answer() {
        let clock = ManualClock::new(Utc::now());
        let mut session = Session::new(upstream(&clock));
        let answer = session
            .answer(&GenerationRequest::new("p", 350, 0.2))
            .await;
        assert!(answer.contains("WATSONX_API_KEY"));
        assert!(session.cached_token().is_none());
    }
}

//! In-memory meeting session state.
//!
//! Sessions live only in process memory. The store owns all conversation
//! state; the connection layer holds nothing but the session id to live
//! socket correlation.

use boardroom_types::Turn;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One active meeting: the participant, the topic, and the running transcript.
#[derive(Debug, Clone)]
pub struct MeetingSession {
    pub session_id: String,
    pub participant_name: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Append-only transcript. Unbounded in storage; composition reads only
    /// a bounded tail.
    pub history: Vec<Turn>,
}

impl MeetingSession {
    fn new(session_id: String, participant_name: String, topic: String) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            participant_name,
            topic,
            created_at: now,
            last_activity: now,
            history: Vec::new(),
        }
    }
}

/// The slice of a session the orchestrator needs to compose one reply.
///
/// Read under a single lock acquisition so the metadata and the tail come
/// from the same consistent state.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub participant_name: String,
    pub topic: String,
    pub tail: Vec<Turn>,
}

/// Shared map of live sessions keyed by session id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, MeetingSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a session, replacing any live session with the same id.
    ///
    /// Reusing an id is treated as a fresh meeting: the old transcript is
    /// discarded. Returns `true` when an existing session was replaced.
    pub async fn create(
        &self,
        session_id: impl Into<String>,
        participant_name: impl Into<String>,
        topic: impl Into<String>,
    ) -> bool {
        let session_id = session_id.into();
        let session = MeetingSession::new(
            session_id.clone(),
            participant_name.into(),
            topic.into(),
        );
        self.sessions
            .write()
            .await
            .insert(session_id, session)
            .is_some()
    }

    /// Appends a turn and refreshes the activity timestamp.
    ///
    /// Returns `false` when the session does not exist; the transcript is
    /// untouched in that case.
    pub async fn append_turn(&self, session_id: &str, turn: Turn) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.history.push(turn);
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Reads the metadata and the last `tail_len` turns in one consistent view.
    pub async fn compose_view(&self, session_id: &str, tail_len: usize) -> Option<SessionView> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|session| {
            let skip = session.history.len().saturating_sub(tail_len);
            SessionView {
                participant_name: session.participant_name.clone(),
                topic: session.topic.clone(),
                tail: session.history[skip..].to_vec(),
            }
        })
    }

    /// Refreshes the activity timestamp. No-op for unknown ids.
    pub async fn touch(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_activity = Utc::now();
        }
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Removes a session. Idempotent; removing an absent id is a no-op.
    pub async fn remove(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Evicts sessions idle for at least `threshold_seconds`, skipping any id
    /// in `live`. Returns the evicted ids.
    pub async fn prune_idle(
        &self,
        threshold_seconds: u64,
        live: &HashSet<String>,
    ) -> Vec<String> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(id, session)| {
                if live.contains(*id) {
                    return false;
                }
                let idle = now
                    .signed_duration_since(session.last_activity)
                    .num_seconds();
                idle >= 0 && idle as u64 >= threshold_seconds
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_with_live_id_resets_the_session() {
        let store = SessionStore::new();
        assert!(!store.create("s1", "Ana", "Budget").await);
        assert!(store.append_turn("s1", Turn::user("Ana", "hello")).await);

        // Same id again: fresh meeting, empty transcript.
        assert!(store.create("s1", "Ana", "Roadmap").await);
        let view = store.compose_view("s1", 10).await.expect("session exists");
        assert_eq!(view.topic, "Roadmap");
        assert!(view.tail.is_empty());
    }

    #[tokio::test]
    async fn append_to_unknown_session_is_rejected() {
        let store = SessionStore::new();
        assert!(!store.append_turn("ghost", Turn::user("Ana", "hi")).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn compose_view_caps_the_tail() {
        let store = SessionStore::new();
        store.create("s1", "Ana", "Budget").await;
        for i in 0..10 {
            store
                .append_turn("s1", Turn::user("Ana", format!("turn {i}")))
                .await;
        }

        let view = store.compose_view("s1", 6).await.expect("session exists");
        assert_eq!(view.tail.len(), 6);
        assert_eq!(view.tail[0].content, "turn 4");
        assert_eq!(view.tail[5].content, "turn 9");
        assert_eq!(view.participant_name, "Ana");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = SessionStore::new();
        store.create("s1", "Ana", "Budget").await;
        store.remove("s1").await;
        store.remove("s1").await;
        assert!(!store.contains("s1").await);
    }

    #[tokio::test]
    async fn prune_skips_live_and_fresh_sessions() {
        let store = SessionStore::new();
        store.create("idle", "Ana", "Budget").await;
        store.create("connected", "Bo", "Roadmap").await;
        store.create("fresh", "Cy", "Hiring").await;

        // Age two sessions past the threshold.
        {
            let mut sessions = store.sessions.write().await;
            for id in ["idle", "connected"] {
                if let Some(session) = sessions.get_mut(id) {
                    session.last_activity = Utc::now() - chrono::Duration::seconds(7200);
                }
            }
        }

        let live: HashSet<String> = ["connected".to_string()].into_iter().collect();
        let pruned = store.prune_idle(3600, &live).await;
        assert_eq!(pruned, vec!["idle".to_string()]);
        assert!(store.contains("connected").await);
        assert!(store.contains("fresh").await);
    }
}

//! In-memory session state.
//!
//! One session per analyzed report, holding the aggregated source text (the
//! sole context for chat questions), the current and original simplified
//! reports, and the chat transcript. Sessions are process-local; there is no
//! persistence.
//!
//! Two guarantees live here:
//! - single-flight per session: a second action while one is in flight is
//!   refused with [`SessionError::Busy`];
//! - stale-result discard: every action carries the session epoch it started
//!   under, reset bumps the epoch, and a completion whose epoch no longer
//!   matches is dropped without touching state.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChatMessage, SimplifiedReport};

pub const ASSISTANT_GREETING: &str =
    "Hello! I've analyzed your report. Feel free to ask me any questions about it.";

#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub epoch: u64,
    pub in_flight: bool,
    /// Aggregated extraction text, computed exactly once per analysis.
    pub report_text: String,
    /// Report currently displayed (possibly translated).
    pub report: Option<SimplifiedReport>,
    /// English original, retained for the "English (Original)" restore.
    pub original_report: Option<SimplifiedReport>,
    pub chat_messages: Vec<ChatMessage>,
    /// Language code of the currently displayed report.
    pub language: String,
    pub created_at: DateTime<Utc>,
}

/// Handle for an in-flight action: names the session and the epoch the
/// action started under.
#[derive(Debug, PartialEq, Eq)]
pub struct ActionTicket {
    session_id: String,
    epoch: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
    #[error("Another operation is already in progress for this session")]
    Busy,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session for a freshly analyzed report, seeding the chat
    /// transcript with the assistant greeting.
    pub fn create(&self, report_text: String, report: SimplifiedReport) -> String {
        let id = Uuid::new_v4().to_string();
        let state = SessionState {
            id: id.clone(),
            epoch: 0,
            in_flight: false,
            report_text,
            original_report: Some(report.clone()),
            report: Some(report),
            chat_messages: vec![ChatMessage::assistant(ASSISTANT_GREETING)],
            language: "en".to_string(),
            created_at: Utc::now(),
        };
        self.sessions.insert(id.clone(), state);
        id
    }

    /// Read access to a session.
    pub fn with<R>(&self, session_id: &str, read: impl FnOnce(&SessionState) -> R) -> Option<R> {
        self.sessions.get(session_id).map(|s| read(s.value()))
    }

    /// Starts a single-flight action. Fails with [`SessionError::Busy`] while
    /// another action on the same session is pending.
    pub fn begin_action(&self, session_id: &str) -> Result<ActionTicket, SessionError> {
        let mut state = self
            .sessions
            .get_mut(session_id)
            .ok_or(SessionError::NotFound)?;
        if state.in_flight {
            return Err(SessionError::Busy);
        }
        state.in_flight = true;
        Ok(ActionTicket {
            session_id: session_id.to_string(),
            epoch: state.epoch,
        })
    }

    /// Finishes an action. `apply` runs only when the session still exists
    /// and its epoch matches the ticket; a late completion against a session
    /// that was reset in the meantime is discarded and `None` is returned.
    pub fn complete<R>(
        &self,
        ticket: &ActionTicket,
        apply: impl FnOnce(&mut SessionState) -> R,
    ) -> Option<R> {
        let mut state = self.sessions.get_mut(&ticket.session_id)?;
        if state.epoch != ticket.epoch {
            return None;
        }
        state.in_flight = false;
        Some(apply(&mut state))
    }

    /// Clears report text, both report values, and the chat transcript in
    /// one mutation, and bumps the epoch so pending completions are dropped.
    pub fn reset(&self, session_id: &str) -> Result<(), SessionError> {
        let mut state = self
            .sessions
            .get_mut(session_id)
            .ok_or(SessionError::NotFound)?;
        state.epoch += 1;
        state.in_flight = false;
        state.report_text.clear();
        state.report = None;
        state.original_report = None;
        state.chat_messages.clear();
        state.language = "en".to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> SimplifiedReport {
        SimplifiedReport {
            simplified_report: "full".to_string(),
            summary: "short".to_string(),
            key_findings: "findings".to_string(),
        }
    }

    #[test]
    fn create_seeds_greeting_and_retains_original() {
        let store = SessionStore::new();
        let id = store.create("WBC 5.4".to_string(), sample_report());

        store
            .with(&id, |s| {
                assert_eq!(s.report_text, "WBC 5.4");
                assert_eq!(s.report, Some(sample_report()));
                assert_eq!(s.original_report, Some(sample_report()));
                assert_eq!(s.chat_messages.len(), 1);
                assert_eq!(s.chat_messages[0].content, ASSISTANT_GREETING);
                assert_eq!(s.language, "en");
            })
            .unwrap();
    }

    #[test]
    fn second_action_is_refused_while_one_is_pending() {
        let store = SessionStore::new();
        let id = store.create("text".to_string(), sample_report());

        let ticket = store.begin_action(&id).unwrap();
        assert_eq!(store.begin_action(&id), Err(SessionError::Busy));

        store.complete(&ticket, |_| ()).unwrap();
        assert!(store.begin_action(&id).is_ok());
    }

    #[test]
    fn reset_clears_all_session_entities_atomically() {
        let store = SessionStore::new();
        let id = store.create("text".to_string(), sample_report());
        store.reset(&id).unwrap();

        store
            .with(&id, |s| {
                assert!(s.report_text.is_empty());
                assert!(s.report.is_none());
                assert!(s.original_report.is_none());
                assert!(s.chat_messages.is_empty());
            })
            .unwrap();
    }

    #[test]
    fn late_completion_after_reset_is_discarded() {
        let store = SessionStore::new();
        let id = store.create("text".to_string(), sample_report());

        let ticket = store.begin_action(&id).unwrap();
        store.reset(&id).unwrap();

        // The action resolved after the reset; its commit must not apply.
        let applied = store.complete(&ticket, |s| {
            s.chat_messages.push(ChatMessage::assistant("stale answer"));
        });
        assert!(applied.is_none());
        store
            .with(&id, |s| assert!(s.chat_messages.is_empty()))
            .unwrap();
    }

    #[test]
    fn unknown_session_is_not_found() {
        let store = SessionStore::new();
        assert_eq!(
            store.begin_action("missing"),
            Err(SessionError::NotFound)
        );
        assert_eq!(store.reset("missing"), Err(SessionError::NotFound));
        assert!(store.with("missing", |_| ()).is_none());
    }
}

//! Per-book reading sessions with quiz and annotation checkpoints.
//!
//! A session tracks the reader's current page and remembers the last page
//! at which a quiz or annotation fired, so trigger checks are a simple
//! distance comparison against the configured interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::ids::fresh_id;
use crate::outcome::ActionOutcome;
use crate::store::{Store, UpdateOutcome};

const SESSIONS: &str = "ReadingProgress.sessions";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub total_pages: i64,
    pub current_page: i64,
    pub quiz_interval: i64,
    pub annotation_interval: i64,
    pub last_quiz_page: i64,
    pub last_annotation_page: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeInput {
    pub user_id: String,
    pub book_id: String,
    pub total_pages: i64,
    pub quiz_interval: i64,
    pub annotation_interval: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressInput {
    pub session_id: String,
    pub new_page: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRef {
    pub book_id: String,
}

#[derive(Clone)]
pub struct ReadingProgress {
    store: Store,
}

impl ReadingProgress {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Opens a session at page 1 with both checkpoint markers unset.
    pub fn initialize_progress(&self, input: InitializeInput) -> Result<ActionOutcome> {
        if input.total_pages <= 0 {
            return Ok(ActionOutcome::error("totalPages must be greater than 0"));
        }
        if input.quiz_interval <= 0 {
            return Ok(ActionOutcome::error("quizInterval must be greater than 0"));
        }
        if input.annotation_interval <= 0 {
            return Ok(ActionOutcome::error(
                "annotationInterval must be greater than 0",
            ));
        }
        let doc = SessionDoc {
            id: fresh_id(),
            user_id: input.user_id,
            book_id: input.book_id,
            total_pages: input.total_pages,
            current_page: 1,
            quiz_interval: input.quiz_interval,
            annotation_interval: input.annotation_interval,
            last_quiz_page: 0,
            last_annotation_page: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        self.store
            .insert(SESSIONS, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({ "sessionId": doc.id })))
    }

    /// Moves the reader forward. Pages never go backwards or past the end.
    pub fn update_progress(&self, input: UpdateProgressInput) -> Result<ActionOutcome> {
        let outcome = self.store.update_if(SESSIONS, &input.session_id, |mut doc| {
            let current = doc["currentPage"].as_i64().unwrap_or(1);
            let total = doc["totalPages"].as_i64().unwrap_or(0);
            if input.new_page < current {
                return Err("newPage cannot be less than current page".to_string());
            }
            if input.new_page > total {
                return Err("newPage exceeds total pages".to_string());
            }
            doc["currentPage"] = json!(input.new_page);
            Ok(doc)
        })?;
        Ok(session_outcome(outcome))
    }

    /// Whether the reader has moved a full quiz interval since the last quiz.
    pub fn trigger_quiz(&self, input: SessionRef) -> Result<ActionOutcome> {
        self.trigger(&input.session_id, "lastQuizPage", "quizInterval")
    }

    pub fn trigger_annotation(&self, input: SessionRef) -> Result<ActionOutcome> {
        self.trigger(&input.session_id, "lastAnnotationPage", "annotationInterval")
    }

    fn trigger(&self, session_id: &str, last_field: &str, interval_field: &str) -> Result<ActionOutcome> {
        let session = match self.store.get(SESSIONS, session_id)? {
            Some(doc) => doc,
            None => return Ok(ActionOutcome::error("Reading session not found")),
        };
        let current = session["currentPage"].as_i64().unwrap_or(1);
        let last = session[last_field].as_i64().unwrap_or(0);
        let interval = session[interval_field].as_i64().unwrap_or(i64::MAX);
        let should_trigger = current - last >= interval;
        Ok(ActionOutcome::ok(json!({ "shouldTrigger": should_trigger })))
    }

    /// Marks the current page as the last quiz checkpoint.
    pub fn record_quiz_triggered(&self, input: SessionRef) -> Result<ActionOutcome> {
        self.record(&input.session_id, "lastQuizPage")
    }

    pub fn record_annotation_triggered(&self, input: SessionRef) -> Result<ActionOutcome> {
        self.record(&input.session_id, "lastAnnotationPage")
    }

    fn record(&self, session_id: &str, last_field: &str) -> Result<ActionOutcome> {
        let field = last_field.to_string();
        let outcome = self.store.update_if(SESSIONS, session_id, move |mut doc| {
            let current = doc["currentPage"].clone();
            doc[&field] = current;
            Ok(doc)
        })?;
        Ok(session_outcome(outcome))
    }

    pub fn pause_reading(&self, input: SessionRef) -> Result<ActionOutcome> {
        let outcome = self.store.update_if(SESSIONS, &input.session_id, |mut doc| {
            if doc["isActive"] != json!(true) {
                return Err("Reading session is not active".to_string());
            }
            doc["isActive"] = json!(false);
            Ok(doc)
        })?;
        Ok(session_outcome(outcome))
    }

    pub fn resume_reading(&self, input: SessionRef) -> Result<ActionOutcome> {
        let outcome = self.store.update_if(SESSIONS, &input.session_id, |mut doc| {
            if doc["isActive"] == json!(true) {
                return Err("Reading session is already active".to_string());
            }
            doc["isActive"] = json!(true);
            Ok(doc)
        })?;
        Ok(session_outcome(outcome))
    }

    pub fn reading_session(&self, input: SessionRef) -> Result<Option<SessionDoc>> {
        match self.store.get(SESSIONS, &input.session_id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// A user's sessions in creation order, oldest first.
    pub fn user_sessions(&self, input: UserRef) -> Result<Vec<SessionDoc>> {
        self.sorted(&[("userId", &json!(input.user_id))])
    }

    /// Every session on a book, in creation order.
    pub fn book_sessions(&self, input: BookRef) -> Result<Vec<SessionDoc>> {
        self.sorted(&[("bookId", &json!(input.book_id))])
    }

    pub fn active_sessions(&self) -> Result<Vec<SessionDoc>> {
        self.sorted(&[("isActive", &json!(true))])
    }

    fn sorted(&self, filter: &[(&str, &serde_json::Value)]) -> Result<Vec<SessionDoc>> {
        let mut sessions: Vec<SessionDoc> = self
            .store
            .find(SESSIONS, filter)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }
}

fn session_outcome(outcome: UpdateOutcome) -> ActionOutcome {
    match outcome {
        UpdateOutcome::Updated(_) => ActionOutcome::empty(),
        UpdateOutcome::Rejected(reason) => ActionOutcome::Error(reason),
        UpdateOutcome::Missing => ActionOutcome::error("Reading session not found"),
    }
}

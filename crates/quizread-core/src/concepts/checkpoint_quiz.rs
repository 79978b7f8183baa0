//! Model-generated multiple-choice quizzes and recorded attempts.
//!
//! Reads book records from the Library collection when building quiz
//! context from a stored document. That is the one cross-concept read in
//! the system; everything else here is self-contained.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::extract::TextExtractor;
use crate::ids::fresh_id;
use crate::llm::QuizModel;
use crate::object_store::object_name_from_url;
use crate::outcome::ActionOutcome;
use crate::store::Store;

const QUIZZES: &str = "CheckpointQuiz.quizzes";
const ATTEMPTS: &str = "CheckpointQuiz.quizAttempts";
const LIBRARY_BOOKS: &str = "Library.books";

/// Model input is capped at this many characters.
const MAX_CONTENT_LEN: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_index: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub selected_index: i64,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuizInput {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerInput {
    pub user_id: String,
    pub quiz_id: String,
    pub selected_index: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRef {
    pub quiz_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContextInput {
    pub user_id: String,
    pub book_id: String,
    pub current_page: i64,
    #[serde(default)]
    pub page_range: Option<i64>,
}

#[derive(Clone)]
pub struct CheckpointQuiz {
    store: Store,
    model: Arc<dyn QuizModel>,
    extractor: Arc<dyn TextExtractor>,
}

impl CheckpointQuiz {
    pub fn new(store: Store, model: Arc<dyn QuizModel>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            store,
            model,
            extractor,
        }
    }

    /// Asks the model for one question over `content` and stores the result.
    /// Model failures and malformed model output come back as domain errors.
    pub fn create_quiz(&self, input: CreateQuizInput) -> Result<ActionOutcome> {
        if input.content.trim().is_empty() {
            return Ok(ActionOutcome::error("Content text cannot be empty"));
        }
        let content: String = input.content.chars().take(MAX_CONTENT_LEN).collect();

        let prompt = format!(
            "Generate a multiple-choice quiz question based on this content. \n\
Return a JSON object with:\n\
- \"question\": A clear, concise question\n\
- \"answers\": An array of exactly 4 answer options\n\
- \"correctIndex\": The 0-based index of the correct answer\n\
\n\
Content: {content}"
        );

        let response = match self.model.generate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                return Ok(ActionOutcome::Error(format!("Failed to generate quiz: {e}")))
            }
        };

        let (question, answers, correct_index) = match parse_quiz_response(&response) {
            Ok(parsed) => parsed,
            Err(message) => return Ok(ActionOutcome::Error(message)),
        };

        let doc = QuizDoc {
            id: fresh_id(),
            content,
            question,
            answers,
            correct_index,
            created_at: Utc::now(),
        };
        self.store
            .insert(QUIZZES, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({ "quiz": doc })))
    }

    /// Records an attempt and reports whether the answer was right.
    pub fn submit_quiz_answer(&self, input: SubmitAnswerInput) -> Result<ActionOutcome> {
        let quiz: QuizDoc = match self.store.get(QUIZZES, &input.quiz_id)? {
            Some(doc) => serde_json::from_value(doc)?,
            None => return Ok(ActionOutcome::error("Quiz not found")),
        };
        if !(0..4).contains(&input.selected_index) {
            return Ok(ActionOutcome::error(
                "Selected index must be between 0 and 3",
            ));
        }
        let doc = QuizAttemptDoc {
            id: fresh_id(),
            user_id: input.user_id,
            quiz_id: input.quiz_id,
            selected_index: input.selected_index,
            is_correct: input.selected_index == quiz.correct_index,
            created_at: Utc::now(),
        };
        self.store
            .insert(ATTEMPTS, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({
            "attemptId": doc.id,
            "isCorrect": doc.is_correct,
        })))
    }

    /// Text around the reader's position in an owned book.
    pub fn get_quiz_context(&self, input: QuizContextInput) -> Result<ActionOutcome> {
        let book = match self.store.get(LIBRARY_BOOKS, &input.book_id)? {
            Some(doc) => doc,
            None => return Ok(ActionOutcome::error("Book not found")),
        };
        if book["ownerId"] != json!(input.user_id) {
            return Ok(ActionOutcome::error("Book does not belong to user"));
        }
        let storage_url = book["storageUrl"].as_str().unwrap_or_default();
        let Some(name) = object_name_from_url(storage_url) else {
            return Ok(ActionOutcome::error("Book has no stored file"));
        };
        let page_range = input.page_range.unwrap_or(2);
        match self
            .extractor
            .extract_range(name, input.current_page, page_range)
        {
            Ok(extracted) => Ok(ActionOutcome::ok(json!({ "content": extracted.content }))),
            Err(e) => Ok(ActionOutcome::Error(format!(
                "Failed to get quiz context: {e}"
            ))),
        }
    }

    /// Context extraction and quiz generation in one step.
    pub fn create_quiz_from_pdf(&self, input: QuizContextInput) -> Result<ActionOutcome> {
        let context = self.get_quiz_context(input)?;
        let content = match &context {
            ActionOutcome::Error(_) => return Ok(context),
            ActionOutcome::Success(_) => context
                .field("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };
        self.create_quiz(CreateQuizInput { content })
    }

    pub fn quiz(&self, input: QuizRef) -> Result<Option<QuizDoc>> {
        match self.store.get(QUIZZES, &input.quiz_id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub fn quiz_attempts(&self, input: QuizRef) -> Result<Vec<QuizAttemptDoc>> {
        self.attempts(&[("quizId", &json!(input.quiz_id))])
    }

    pub fn user_attempts(&self, input: UserRef) -> Result<Vec<QuizAttemptDoc>> {
        self.attempts(&[("userId", &json!(input.user_id))])
    }

    fn attempts(&self, filter: &[(&str, &Value)]) -> Result<Vec<QuizAttemptDoc>> {
        self.store
            .find(ATTEMPTS, filter)?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(Into::into))
            .collect()
    }
}

/// Pulls the quiz JSON out of a model reply. The reply may wrap the object
/// in prose or a code fence, so this takes everything from the first `{` to
/// the last `}` and validates the shape field by field.
fn parse_quiz_response(response: &str) -> std::result::Result<(String, Vec<String>, i64), String> {
    let start = response.find('{');
    let end = response.rfind('}');
    let raw = match (start, end) {
        (Some(s), Some(e)) if s <= e => &response[s..=e],
        _ => return Err("No valid JSON found in LLM response".to_string()),
    };
    let data: Value = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to generate quiz: {e}"))?;

    let question = match data.get("question").and_then(Value::as_str) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return Err("Question is required".to_string()),
    };
    let answers = match data.get("answers").and_then(Value::as_array) {
        Some(list) => list,
        None => return Err("Answers must be an array".to_string()),
    };
    if answers.len() != 4 {
        return Err("Exactly 4 answers are required".to_string());
    }
    let answers: Vec<String> = answers
        .iter()
        .map(|a| match a {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    let correct_index = match data.get("correctIndex").and_then(Value::as_i64) {
        Some(i) => i,
        None => return Err("Correct index must be a number".to_string()),
    };
    if !(0..4).contains(&correct_index) {
        return Err("Correct index must be between 0 and 3".to_string());
    }
    Ok((question, answers, correct_index))
}

//! Reader reflections tied to a user and a book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::ids::fresh_id;
use crate::outcome::ActionOutcome;
use crate::store::Store;

const ANNOTATIONS: &str = "Annotate.annotations";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub content: String,
    pub key_ideas: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnnotationInput {
    pub user_id: String,
    pub book_id: String,
    pub content: String,
    pub key_ideas: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContentRef {
    pub user_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookRef {
    pub user_id: String,
    pub book_id: String,
}

#[derive(Clone)]
pub struct Annotate {
    store: Store,
}

impl Annotate {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Saves a reflection; `keyIdeas` is the one required part.
    pub fn save_annotation(&self, input: SaveAnnotationInput) -> Result<ActionOutcome> {
        if input.key_ideas.trim().is_empty() {
            return Ok(ActionOutcome::error("keyIdeas cannot be empty"));
        }
        let doc = AnnotationDoc {
            id: fresh_id(),
            user_id: input.user_id,
            book_id: input.book_id,
            content: input.content,
            key_ideas: input.key_ideas,
            created_at: Utc::now(),
        };
        self.store
            .insert(ANNOTATIONS, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({ "annotationId": doc.id })))
    }

    /// A user's annotations for one piece of content, newest first.
    pub fn user_annotations(&self, input: UserContentRef) -> Result<Vec<AnnotationDoc>> {
        self.sorted(&[
            ("userId", &json!(input.user_id)),
            ("content", &json!(input.content)),
        ])
    }

    /// Everything a user has written, newest first.
    pub fn all_user_annotations(&self, input: UserRef) -> Result<Vec<AnnotationDoc>> {
        self.sorted(&[("userId", &json!(input.user_id))])
    }

    /// A user's annotations on one book, newest first.
    pub fn annotations_for_book(&self, input: UserBookRef) -> Result<Vec<AnnotationDoc>> {
        self.sorted(&[
            ("userId", &json!(input.user_id)),
            ("bookId", &json!(input.book_id)),
        ])
    }

    fn sorted(&self, filter: &[(&str, &Value)]) -> Result<Vec<AnnotationDoc>> {
        let mut docs: Vec<AnnotationDoc> = self
            .store
            .find(ANNOTATIONS, filter)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }
}

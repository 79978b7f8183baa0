//! User registration and login against stored credentials.
//!
//! Password hashing happens on the client; this concept only stores and
//! compares the hash it is given.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::ids::fresh_id;
use crate::outcome::ActionOutcome;
use crate::store::Store;

const USERS: &str = "UserAuth.users";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRef {
    pub email: String,
}

#[derive(Clone)]
pub struct UserAuth {
    store: Store,
}

impl UserAuth {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Registers a user with a unique email and returns the new id.
    pub fn register(&self, input: Credentials) -> Result<ActionOutcome> {
        if !EMAIL.is_match(&input.email) {
            return Ok(ActionOutcome::error("Invalid email format"));
        }
        if input.password_hash.trim().is_empty() {
            return Ok(ActionOutcome::error("passwordHash cannot be empty"));
        }
        if !self
            .store
            .find(USERS, &[("email", &json!(input.email))])?
            .is_empty()
        {
            return Ok(ActionOutcome::error("Email already registered"));
        }
        let doc = UserDoc {
            id: fresh_id(),
            email: input.email,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        };
        self.store
            .insert(USERS, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({ "userId": doc.id })))
    }

    /// Checks credentials and returns the matching user's id. The rejection
    /// message never says which half was wrong.
    pub fn login(&self, input: Credentials) -> Result<ActionOutcome> {
        let found = self.user_by_email(EmailRef {
            email: input.email,
        })?;
        match found {
            Some(user) if user.password_hash == input.password_hash => {
                Ok(ActionOutcome::ok(json!({ "userId": user.id })))
            }
            _ => Ok(ActionOutcome::error("Invalid email or password")),
        }
    }

    pub fn user(&self, input: UserRef) -> Result<Option<UserDoc>> {
        match self.store.get(USERS, &input.user_id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub fn user_by_email(&self, input: EmailRef) -> Result<Option<UserDoc>> {
        let mut found = self.store.find(USERS, &[("email", &json!(input.email))])?;
        match found.pop() {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Every user, newest first.
    pub fn all_users(&self) -> Result<Vec<UserDoc>> {
        let mut users: Vec<UserDoc> = self
            .store
            .all(USERS)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

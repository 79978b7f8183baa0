//! Generic document store over redb.
//!
//! Collections are named redb tables (`{Concept}.{collection}`), keyed by
//! string id, holding JSON-encoded documents. The store knows nothing about
//! document shapes beyond top-level field equality for `find`; ordering
//! conventions (newest-first listings and so on) live with the concepts.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use serde_json::Value;

use crate::error::{CoreError, Result};

fn table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// Outcome of a conditional update run inside a single write transaction.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The check passed and the document was replaced.
    Updated(Value),
    /// The check returned a domain rejection; nothing was written.
    Rejected(String),
    /// No document with that id exists.
    Missing,
}

#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Ephemeral store for tests.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Insert or replace the document with the given id.
    pub fn insert(&self, collection: &str, id: &str, doc: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(doc)?;
        let txn = self
            .db
            .begin_write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        {
            let mut t = txn
                .open_table(table(collection))
                .map_err(|e| CoreError::Store(e.to_string()))?;
            t.insert(id, bytes.as_slice())
                .map_err(|e| CoreError::Store(e.to_string()))?;
        }
        txn.commit().map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(())
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let t = match txn.open_table(table(collection)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(CoreError::Store(e.to_string())),
        };
        let bytes = t
            .get(id)
            .map_err(|e| CoreError::Store(e.to_string()))?
            .map(|guard| guard.value().to_vec());
        match bytes {
            Some(b) => Ok(Some(serde_json::from_slice(&b)?)),
            None => Ok(None),
        }
    }

    /// Delete a document. Returns whether it existed.
    pub fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let existed;
        {
            let mut t = txn
                .open_table(table(collection))
                .map_err(|e| CoreError::Store(e.to_string()))?;
            existed = t
                .remove(id)
                .map_err(|e| CoreError::Store(e.to_string()))?
                .is_some();
        }
        txn.commit().map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(existed)
    }

    /// Read-check-write inside one write transaction.
    ///
    /// `check` receives the current document and either returns the updated
    /// document to write or a domain rejection string, in which case nothing
    /// is written. Precondition-guarded state transitions (pause/resume and
    /// friends) go through here so two racing transitions on the same entity
    /// cannot both pass the same precondition.
    pub fn update_if<F>(&self, collection: &str, id: &str, check: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(Value) -> std::result::Result<Value, String>,
    {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let outcome;
        {
            let mut t = txn
                .open_table(table(collection))
                .map_err(|e| CoreError::Store(e.to_string()))?;
            let current = t
                .get(id)
                .map_err(|e| CoreError::Store(e.to_string()))?
                .map(|guard| guard.value().to_vec());
            match current {
                None => outcome = UpdateOutcome::Missing,
                Some(bytes) => {
                    let doc: Value = serde_json::from_slice(&bytes)?;
                    match check(doc) {
                        Ok(updated) => {
                            let bytes = serde_json::to_vec(&updated)?;
                            t.insert(id, bytes.as_slice())
                                .map_err(|e| CoreError::Store(e.to_string()))?;
                            outcome = UpdateOutcome::Updated(updated);
                        }
                        Err(reason) => outcome = UpdateOutcome::Rejected(reason),
                    }
                }
            }
        }
        txn.commit().map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(outcome)
    }

    /// All documents whose top-level fields equal every `(field, value)`
    /// pair in `filter`. Order is by id, so callers needing a timestamp
    /// order sort the result themselves.
    pub fn find(&self, collection: &str, filter: &[(&str, &Value)]) -> Result<Vec<Value>> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let t = match txn.open_table(table(collection)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::Store(e.to_string())),
        };
        let mut result = Vec::new();
        for entry in t.iter().map_err(|e| CoreError::Store(e.to_string()))? {
            let (_, v) = entry.map_err(|e| CoreError::Store(e.to_string()))?;
            let doc: Value = serde_json::from_slice(v.value())?;
            let matches = filter.iter().all(|(field, value)| doc.get(field) == Some(*value));
            if matches {
                result.push(doc);
            }
        }
        Ok(result)
    }

    pub fn all(&self, collection: &str) -> Result<Vec<Value>> {
        self.find(collection, &[])
    }
}

//! The request ledger: one record per inbound request, completed exactly
//! once by a `respond` dispatch.

use chrono::{DateTime, Utc};
use quizread_core::{ids::fresh_id, FieldMap, Store, UpdateOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{EngineError, Result};

const REQUESTS: &str = "Requesting.requests";

/// A recorded request. `output` is only meaningful once `responded` is
/// set; a response body of JSON `null` is legitimate, so presence of the
/// output cannot stand in for the flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub path: String,
    pub input: Value,
    #[serde(default)]
    pub output: Value,
    pub responded: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RequestLedger {
    store: Store,
}

impl RequestLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record a fresh inbound request and hand back its ledger entry.
    pub fn record(&self, path: &str, input: &FieldMap) -> Result<RequestRecord> {
        let record = RequestRecord {
            id: fresh_id(),
            path: path.to_string(),
            input: Value::Object(input.clone()),
            output: Value::Null,
            responded: false,
            created_at: Utc::now(),
        };
        let doc = serde_json::to_value(&record).map_err(quizread_core::CoreError::from)?;
        self.store.insert(REQUESTS, &record.id, &doc)?;
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<Option<RequestRecord>> {
        match self.store.get(REQUESTS, id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc).map_err(
                quizread_core::CoreError::from,
            )?)),
            None => Ok(None),
        }
    }

    /// Set the request's output, exactly once. A second call for the same
    /// id is an engine fault, not a silent overwrite.
    pub fn record_response(&self, id: &str, output: Value) -> Result<()> {
        let outcome = self.store.update_if(REQUESTS, id, move |mut doc| {
            if doc["responded"] == json!(true) {
                return Err(String::new());
            }
            doc["output"] = output;
            doc["responded"] = json!(true);
            Ok(doc)
        })?;
        match outcome {
            UpdateOutcome::Updated(_) => Ok(()),
            UpdateOutcome::Rejected(_) => Err(EngineError::DoubleResponse(id.to_string())),
            UpdateOutcome::Missing => Err(EngineError::RequestNotFound(id.to_string())),
        }
    }
}

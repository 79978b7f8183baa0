use serde_json::Value;

/// The fields of an action's success payload, keyed by wire field name.
pub type FieldMap = serde_json::Map<String, Value>;

/// The result of a concept action: either a payload of named fields or a
/// domain error. Domain errors are deliberate, validated outcomes (bad
/// input, not-found, ownership mismatch) and travel through the sync
/// pipeline as ordinary data, never as Rust errors.
///
/// Infrastructure failures (store, serialization) stay in `CoreError` and
/// are a different thing entirely: the engine treats those as faults, not
/// as `{error}` completions.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Success(FieldMap),
    Error(String),
}

impl ActionOutcome {
    /// Success payload from a `json!({...})` object literal.
    pub fn ok(payload: Value) -> Self {
        match payload {
            Value::Object(map) => ActionOutcome::Success(map),
            other => ActionOutcome::Error(format!("non-object action payload: {other}")),
        }
    }

    /// Success with no fields (`{}` on the wire).
    pub fn empty() -> Self {
        ActionOutcome::Success(FieldMap::new())
    }

    pub fn error(message: impl Into<String>) -> Self {
        ActionOutcome::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ActionOutcome::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ActionOutcome::Error(msg) => Some(msg),
            ActionOutcome::Success(_) => None,
        }
    }

    /// Look up a success field by wire name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            ActionOutcome::Success(map) => map.get(name),
            ActionOutcome::Error(_) => None,
        }
    }

    /// The wire shape of this outcome: the success fields, or `{error}`.
    pub fn to_value(&self) -> Value {
        match self {
            ActionOutcome::Success(map) => Value::Object(map.clone()),
            ActionOutcome::Error(msg) => serde_json::json!({ "error": msg }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_keeps_fields() {
        let out = ActionOutcome::ok(json!({ "timerId": "t1" }));
        assert_eq!(out.field("timerId"), Some(&json!("t1")));
        assert!(!out.is_error());
    }

    #[test]
    fn empty_has_no_fields() {
        assert_eq!(ActionOutcome::empty().to_value(), json!({}));
    }

    #[test]
    fn error_round_trips_to_wire_shape() {
        let out = ActionOutcome::error("Timer is not active");
        assert_eq!(out.error_message(), Some("Timer is not active"));
        assert_eq!(out.to_value(), json!({ "error": "Timer is not active" }));
    }
}

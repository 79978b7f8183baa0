use uuid::Uuid;

/// Generate a fresh document id. Every entity across all concepts uses the
/// same id scheme so ids can flow through sync variable bindings as plain
/// JSON strings.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

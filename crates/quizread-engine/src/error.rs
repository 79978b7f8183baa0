use quizread_core::CoreError;
use thiserror::Error;

/// Engine faults. These are distinct from domain `{error}` outcomes, which
/// travel through the pipeline as ordinary completion payloads. A fault
/// here means the request's pipeline itself went wrong and the caller gets
/// a server error instead of a domain response.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sync {sync}: no binding for variable '{field}'")]
    Unresolved { sync: String, field: String },

    #[error("no binding for '{0}'")]
    MissingBinding(String),

    #[error("request {0} was already responded to")]
    DoubleResponse(String),

    #[error("request {0} not found")]
    RequestNotFound(String),

    #[error("unknown operation {concept}.{op}")]
    UnknownOperation { concept: String, op: String },

    #[error("route table entry {0} names no known operation")]
    UnknownRoute(String),

    #[error("route {0} is excluded from passthrough but no sync handles it")]
    UnhandledRoute(String),

    #[error("query {concept}.{op}: {message}")]
    QueryInput {
        concept: String,
        op: String,
        message: String,
    },

    #[error("no sync responded to request {0}")]
    NoResponse(String),

    #[error("completion limit exceeded while evaluating request {0}")]
    CompletionOverflow(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

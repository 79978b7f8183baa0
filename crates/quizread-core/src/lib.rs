//! Core domain for the quizread reading companion: persisted concepts,
//! the document store behind them, and clients for the external services
//! (object storage, the quiz model, text extraction).

pub mod concepts;
pub mod error;
pub mod extract;
pub mod ids;
pub mod llm;
pub mod object_store;
pub mod outcome;
pub mod store;

pub use error::{CoreError, Result};
pub use outcome::{ActionOutcome, FieldMap};
pub use store::{Store, UpdateOutcome};

//! Action declarations and completion events.

use std::fmt;

use quizread_core::{ActionOutcome, FieldMap};

/// A concept operation named statically at sync-definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionDecl {
    pub concept: &'static str,
    pub op: &'static str,
}

pub const fn decl(concept: &'static str, op: &'static str) -> ActionDecl {
    ActionDecl { concept, op }
}

/// The implicit pseudo-action fired when an inbound request is recorded.
/// Its input is the request body plus a `path` field; its output binds the
/// ledger id under `request`.
pub const REQUEST: ActionDecl = decl("Requesting", "request");

impl fmt::Display for ActionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.concept, self.op)
    }
}

/// One finished action invocation: what was called, with what input, and
/// what came back. Completions are transient, scoped to the evaluation of
/// a single inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub decl: ActionDecl,
    pub input: FieldMap,
    pub output: ActionOutcome,
}

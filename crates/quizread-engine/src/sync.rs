//! Sync declarations: `when` patterns, an optional `where` refinement,
//! and `then` dispatch steps.

use quizread_core::FieldMap;
use serde_json::Value;

use crate::action::ActionDecl;
use crate::error::{EngineError, Result};
use crate::frame::Frames;
use crate::ledger::RequestLedger;
use crate::pattern::{FieldPat, Pattern};
use crate::registry::Concepts;

/// What a `where` stage gets to work with: concept queries and the
/// request ledger (for re-reading a request's original input, the idiom
/// used to pick up optional body fields).
pub struct WhereCtx<'a> {
    pub concepts: &'a dyn Concepts,
    pub ledger: &'a RequestLedger,
}

impl WhereCtx<'_> {
    pub fn query(&self, concept: &str, op: &str, args: FieldMap) -> Result<Value> {
        self.concepts.invoke_query(concept, op, &args)
    }

    /// Original input payload of the request bound in a frame.
    pub fn request_input(&self, request: &Value) -> Result<FieldMap> {
        let id = request
            .as_str()
            .ok_or_else(|| EngineError::MissingBinding("request".to_string()))?;
        let record = self
            .ledger
            .get(id)?
            .ok_or_else(|| EngineError::RequestNotFound(id.to_string()))?;
        match record.input {
            Value::Object(map) => Ok(map),
            _ => Ok(FieldMap::new()),
        }
    }
}

/// Per-frame refinement. Runs over the whole surviving frame set so it
/// can filter, transform, or fan out; a thrown error here is an engine
/// fault for the triggering request, never a domain `{error}`.
pub type WhereFn = Box<dyn Fn(Frames, &WhereCtx) -> Result<Frames> + Send + std::marker::Sync>;

pub enum ThenTarget {
    Action(ActionDecl),
    /// Finalize the bound request via the response normalizer.
    Respond,
}

pub struct ThenStep {
    pub target: ThenTarget,
    pub fields: Vec<(&'static str, FieldPat)>,
}

/// A declarative rule: fire when every `when` pattern has a joining
/// completion, refine the frames, dispatch the `then` steps per frame.
pub struct Sync {
    pub name: &'static str,
    pub when: Vec<Pattern>,
    pub where_stage: Option<WhereFn>,
    pub then: Vec<ThenStep>,
}

impl Sync {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            when: Vec::new(),
            where_stage: None,
            then: Vec::new(),
        }
    }

    pub fn when(mut self, pattern: Pattern) -> Self {
        self.when.push(pattern);
        self
    }

    pub fn where_stage<F>(mut self, f: F) -> Self
    where
        F: Fn(Frames, &WhereCtx) -> Result<Frames> + Send + std::marker::Sync + 'static,
    {
        self.where_stage = Some(Box::new(f));
        self
    }

    pub fn then(mut self, decl: ActionDecl, fields: Vec<(&'static str, FieldPat)>) -> Self {
        self.then.push(ThenStep {
            target: ThenTarget::Action(decl),
            fields,
        });
        self
    }

    /// Terminal step: respond to the request bound under `request`.
    pub fn respond(mut self, fields: Vec<(&'static str, FieldPat)>) -> Self {
        self.then.push(ThenStep {
            target: ThenTarget::Respond,
            fields,
        });
        self
    }

    /// Request paths this sync subscribes to, for route-table validation.
    pub fn request_paths(&self) -> Vec<&str> {
        self.when
            .iter()
            .filter_map(Pattern::request_path)
            .collect()
    }
}

//! Completion patterns and the frame-extension matcher.

use quizread_core::ActionOutcome;
use serde_json::Value;

use crate::action::{ActionDecl, Completion, REQUEST};
use crate::frame::Frame;

/// One field constraint: an exact-match literal, or a variable to bind.
#[derive(Debug, Clone)]
pub enum FieldPat {
    Lit(Value),
    Var(&'static str),
}

pub fn lit(value: impl Into<Value>) -> FieldPat {
    FieldPat::Lit(value.into())
}

pub fn var(name: &'static str) -> FieldPat {
    FieldPat::Var(name)
}

/// A `when`-position pattern over one action's completions. Fields not
/// listed in `input` are unconstrained. `output` is matched against the
/// completion's payload by variant: a pattern naming an `error` field
/// matches only error completions, any other pattern only success ones,
/// and an empty `output` requires a success with no fields at all.
pub struct Pattern {
    pub decl: ActionDecl,
    pub input: Vec<(&'static str, FieldPat)>,
    pub output: Vec<(&'static str, FieldPat)>,
}

impl Pattern {
    pub fn new(
        decl: ActionDecl,
        input: Vec<(&'static str, FieldPat)>,
        output: Vec<(&'static str, FieldPat)>,
    ) -> Self {
        Self { decl, input, output }
    }

    /// Pattern over the implicit request pseudo-action: constrains the
    /// request path, binds the listed body fields, and binds the ledger id
    /// under `request`.
    pub fn request(path: &str, mut input: Vec<(&'static str, FieldPat)>) -> Self {
        input.insert(0, ("path", FieldPat::Lit(Value::String(path.to_string()))));
        Self {
            decl: REQUEST,
            input,
            output: vec![("request", var("request"))],
        }
    }

    /// Literal path this pattern requires, when it is a request pattern.
    pub fn request_path(&self) -> Option<&str> {
        if self.decl != REQUEST {
            return None;
        }
        self.input.iter().find_map(|(field, pat)| match pat {
            FieldPat::Lit(Value::String(path)) if *field == "path" => Some(path.as_str()),
            _ => None,
        })
    }

    pub fn matches_decl(&self, completion: &Completion) -> bool {
        self.decl == completion.decl
    }

    fn expects_error(&self) -> bool {
        self.output.iter().any(|(field, _)| *field == "error")
    }

    /// Try to extend `frame` with this pattern against `completion`.
    /// Returns `None` on any constraint or join failure.
    pub fn extend(&self, frame: &Frame, completion: &Completion) -> Option<Frame> {
        if !self.matches_decl(completion) {
            return None;
        }
        let mut frame = frame.clone();
        for (field, pat) in &self.input {
            let observed = completion.input.get(*field)?;
            frame = apply(&frame, pat, observed)?;
        }
        match &completion.output {
            ActionOutcome::Success(payload) => {
                if self.expects_error() {
                    return None;
                }
                if self.output.is_empty() && !payload.is_empty() {
                    return None;
                }
                for (field, pat) in &self.output {
                    let observed = payload.get(*field)?;
                    frame = apply(&frame, pat, observed)?;
                }
            }
            ActionOutcome::Error(message) => {
                if !self.expects_error() {
                    return None;
                }
                let message = Value::String(message.clone());
                for (field, pat) in &self.output {
                    if *field != "error" {
                        return None;
                    }
                    frame = apply(&frame, pat, &message)?;
                }
            }
        }
        Some(frame)
    }
}

fn apply(frame: &Frame, pat: &FieldPat, observed: &Value) -> Option<Frame> {
    match pat {
        FieldPat::Lit(expected) => (expected == observed).then(|| frame.clone()),
        FieldPat::Var(name) => frame.try_bind(name, observed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::decl;
    use quizread_core::FieldMap;
    use serde_json::json;

    const START: ActionDecl = decl("FocusTimer", "start");

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn start_completion(output: ActionOutcome) -> Completion {
        Completion {
            decl: START,
            input: fields(json!({ "durationMs": 30000, "phase": "reading" })),
            output,
        }
    }

    #[test]
    fn literals_constrain_and_vars_bind() {
        let pattern = Pattern::new(
            START,
            vec![("phase", lit("reading")), ("durationMs", var("duration"))],
            vec![("timerId", var("timer"))],
        );
        let completion = start_completion(ActionOutcome::ok(json!({ "timerId": "t1" })));
        let frame = pattern.extend(&Frame::new(), &completion).unwrap();
        assert_eq!(frame.get("duration"), Some(&json!(30000)));
        assert_eq!(frame.get("timer"), Some(&json!("t1")));

        let wrong_phase = Pattern::new(START, vec![("phase", lit("break"))], vec![]);
        assert!(wrong_phase.extend(&Frame::new(), &completion).is_none());
    }

    #[test]
    fn bound_variables_must_agree() {
        let pattern = Pattern::new(START, vec![("phase", var("x"))], vec![("timerId", var("t"))]);
        let completion = start_completion(ActionOutcome::ok(json!({ "timerId": "t1" })));
        let agreeing = Frame::new().bind("x", json!("reading"));
        assert!(pattern.extend(&agreeing, &completion).is_some());
        let conflicting = Frame::new().bind("x", json!("break"));
        assert!(pattern.extend(&conflicting, &completion).is_none());
    }

    #[test]
    fn empty_output_pattern_means_empty_success() {
        let pattern = Pattern::new(START, vec![], vec![]);
        assert!(pattern
            .extend(&Frame::new(), &start_completion(ActionOutcome::empty()))
            .is_some());
        assert!(pattern
            .extend(
                &Frame::new(),
                &start_completion(ActionOutcome::ok(json!({ "timerId": "t1" })))
            )
            .is_none());
        assert!(pattern
            .extend(
                &Frame::new(),
                &start_completion(ActionOutcome::error("nope"))
            )
            .is_none());
    }

    #[test]
    fn error_patterns_match_only_error_completions() {
        let error_pattern = Pattern::new(START, vec![], vec![("error", var("message"))]);
        let success_pattern = Pattern::new(START, vec![], vec![("timerId", var("timer"))]);
        let failed = start_completion(ActionOutcome::error("durationMs must be greater than 0"));
        let succeeded = start_completion(ActionOutcome::ok(json!({ "timerId": "t1" })));

        let frame = error_pattern.extend(&Frame::new(), &failed).unwrap();
        assert_eq!(
            frame.get("message"),
            Some(&json!("durationMs must be greater than 0"))
        );
        assert!(error_pattern.extend(&Frame::new(), &succeeded).is_none());
        assert!(success_pattern.extend(&Frame::new(), &failed).is_none());
    }

    #[test]
    fn request_patterns_constrain_path_and_bind_the_id() {
        let pattern = Pattern::request("/FocusTimer/start", vec![("durationMs", var("duration"))]);
        assert_eq!(pattern.request_path(), Some("/FocusTimer/start"));
        let completion = Completion {
            decl: REQUEST,
            input: fields(json!({ "path": "/FocusTimer/start", "durationMs": 30000 })),
            output: ActionOutcome::ok(json!({ "request": "r1" })),
        };
        let frame = pattern.extend(&Frame::new(), &completion).unwrap();
        assert_eq!(frame.get("request"), Some(&json!("r1")));
        assert_eq!(frame.get("duration"), Some(&json!(30000)));

        let other_path = Pattern::request("/FocusTimer/pause", vec![]);
        assert!(other_path.extend(&Frame::new(), &completion).is_none());
    }

    #[test]
    fn absent_fields_fail_the_match() {
        let pattern = Pattern::new(START, vec![("missing", var("m"))], vec![]);
        let completion = start_completion(ActionOutcome::empty());
        assert!(pattern.extend(&Frame::new(), &completion).is_none());
    }
}

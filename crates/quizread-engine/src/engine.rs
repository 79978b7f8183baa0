//! Sync evaluation: the per-request completion log, the work queue, and
//! response finalization.

use std::collections::VecDeque;
use std::sync::Arc;

use quizread_core::FieldMap;
use serde_json::Value;
use tracing::warn;

use crate::action::{Completion, REQUEST};
use crate::error::{EngineError, Result};
use crate::frame::{Frame, Frames};
use crate::ledger::RequestLedger;
use crate::pattern::FieldPat;
use crate::registry::Concepts;
use crate::sync::{Sync, ThenStep, ThenTarget, WhereCtx};

/// Hard cap on completions processed for one request. A sync set that
/// feeds its own `when` patterns forever hits this instead of spinning.
const MAX_COMPLETIONS: usize = 256;

pub struct Engine {
    concepts: Arc<dyn Concepts>,
    ledger: RequestLedger,
    syncs: Vec<Sync>,
}

impl Engine {
    pub fn new(concepts: Arc<dyn Concepts>, ledger: RequestLedger, syncs: Vec<Sync>) -> Self {
        Self {
            concepts,
            ledger,
            syncs,
        }
    }

    pub fn syncs(&self) -> &[Sync] {
        &self.syncs
    }

    pub fn ledger(&self) -> &RequestLedger {
        &self.ledger
    }

    /// Evaluate one inbound request to its terminal response body.
    ///
    /// The request is recorded in the ledger and seeded into the work
    /// queue as the implicit request pseudo-completion. Each completion is
    /// appended to a per-request log and offered to every sync; actions a
    /// firing sync dispatches come back as further completions. The call
    /// returns the responded output, or the first engine fault if no sync
    /// ever responded.
    pub fn handle_request(&self, path: &str, input: FieldMap) -> Result<Value> {
        let record = self.ledger.record(path, &input)?;

        let mut seed_input = input;
        seed_input.insert("path".to_string(), Value::String(path.to_string()));
        let mut seed_output = FieldMap::new();
        seed_output.insert("request".to_string(), Value::String(record.id.clone()));
        let seed = Completion {
            decl: REQUEST,
            input: seed_input,
            output: quizread_core::ActionOutcome::Success(seed_output),
        };

        let mut log: Vec<Completion> = Vec::new();
        let mut queue: VecDeque<Completion> = VecDeque::from([seed]);
        let mut first_fault: Option<EngineError> = None;
        let mut processed = 0usize;

        while let Some(completion) = queue.pop_front() {
            processed += 1;
            if processed > MAX_COMPLETIONS {
                return Err(EngineError::CompletionOverflow(record.id));
            }
            let anchor = completion.clone();
            log.push(completion);
            for sync in &self.syncs {
                let fired = self.fire_sync(sync, &log, &anchor, &mut first_fault);
                queue.extend(fired);
            }
        }

        match self.ledger.get(&record.id)? {
            Some(finished) if finished.responded => Ok(finished.output),
            _ => Err(first_fault.unwrap_or(EngineError::NoResponse(record.id))),
        }
    }

    /// Evaluate one sync against the log, anchored on the new completion.
    ///
    /// The anchor must occupy at least one `when` position; the remaining
    /// positions join against the whole log. Anchoring guarantees a sync
    /// never re-fires on a set of completions it already saw. Faults are
    /// contained per frame: a bad frame is logged and recorded as the
    /// request's first fault, sibling frames still dispatch.
    fn fire_sync(
        &self,
        sync: &Sync,
        log: &[Completion],
        anchor: &Completion,
        first_fault: &mut Option<EngineError>,
    ) -> Vec<Completion> {
        let mut matched = Frames::new();
        for anchor_pos in 0..sync.when.len() {
            if !sync.when[anchor_pos].matches_decl(anchor) {
                continue;
            }
            let mut frames = Frames::seed();
            for (pos, pattern) in sync.when.iter().enumerate() {
                let mut next = Frames::new();
                for frame in frames.iter() {
                    if pos == anchor_pos {
                        if let Some(extended) = pattern.extend(frame, anchor) {
                            next.push(extended);
                        }
                    } else {
                        for completion in log {
                            if let Some(extended) = pattern.extend(frame, completion) {
                                next.push(extended);
                            }
                        }
                    }
                }
                frames = next;
                if frames.is_empty() {
                    break;
                }
            }
            matched.extend(frames);
        }
        if matched.is_empty() {
            return Vec::new();
        }

        let ctx = WhereCtx {
            concepts: self.concepts.as_ref(),
            ledger: &self.ledger,
        };
        let frames = match &sync.where_stage {
            Some(refine) => match refine(matched, &ctx) {
                Ok(frames) => frames,
                Err(fault) => {
                    warn!(sync = sync.name, error = %fault, "where stage failed");
                    first_fault.get_or_insert(fault);
                    return Vec::new();
                }
            },
            None => matched,
        };

        let mut completions = Vec::new();
        for frame in frames.iter() {
            match self.dispatch_frame(sync, frame) {
                Ok(mut fired) => completions.append(&mut fired),
                Err(fault) => {
                    warn!(sync = sync.name, error = %fault, "frame dispatch failed");
                    first_fault.get_or_insert(fault);
                }
            }
        }
        completions
    }

    fn dispatch_frame(&self, sync: &Sync, frame: &Frame) -> Result<Vec<Completion>> {
        let mut completions = Vec::new();
        for step in &sync.then {
            let fields = resolve_fields(sync.name, step, frame)?;
            match &step.target {
                ThenTarget::Action(decl) => {
                    let outcome =
                        self.concepts
                            .invoke_action(decl.concept, decl.op, &fields)?;
                    completions.push(Completion {
                        decl: *decl,
                        input: fields,
                        output: outcome,
                    });
                }
                ThenTarget::Respond => {
                    let request = fields
                        .get("request")
                        .and_then(Value::as_str)
                        .ok_or_else(|| EngineError::Unresolved {
                            sync: sync.name.to_string(),
                            field: "request".to_string(),
                        })?
                        .to_string();
                    let body = normalize_response(&fields);
                    self.ledger.record_response(&request, body)?;
                }
            }
        }
        Ok(completions)
    }
}

fn resolve_fields(sync: &str, step: &ThenStep, frame: &Frame) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    for (name, pat) in &step.fields {
        let value = match pat {
            FieldPat::Lit(value) => value.clone(),
            FieldPat::Var(variable) => frame
                .get(variable)
                .cloned()
                .ok_or_else(|| EngineError::Unresolved {
                    sync: sync.to_string(),
                    field: variable.to_string(),
                })?,
        };
        fields.insert(name.to_string(), value);
    }
    Ok(fields)
}

/// The respond contract: a single array field becomes the body itself, a
/// single object-or-null field is returned directly, anything else is the
/// field map as an object. The `request` field never reaches the body.
pub fn normalize_response(fields: &FieldMap) -> Value {
    let body: Vec<(&String, &Value)> = fields
        .iter()
        .filter(|(name, _)| name.as_str() != "request")
        .collect();
    if body.len() == 1 {
        match body[0].1 {
            Value::Array(_) | Value::Object(_) | Value::Null => return body[0].1.clone(),
            _ => {}
        }
    }
    Value::Object(
        body.into_iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{decl, ActionDecl};
    use crate::pattern::{lit, var, Pattern};
    use crate::registry::OperationDecl;
    use quizread_core::concepts::focus_timer::{FocusTimer, PhaseInput, StartInput, TimerRef};
    use quizread_core::{ActionOutcome, Store};
    use serde_json::json;

    const TIMER_START: ActionDecl = decl("FocusTimer", "start");
    const TIMER_PAUSE: ActionDecl = decl("FocusTimer", "pause");

    struct TimerConcepts {
        timers: FocusTimer,
        fail_queries: bool,
    }

    impl TimerConcepts {
        fn new(store: Store) -> Self {
            Self {
                timers: FocusTimer::new(store),
                fail_queries: false,
            }
        }
    }

    impl Concepts for TimerConcepts {
        fn operations(&self) -> Vec<OperationDecl> {
            vec![
                OperationDecl::new("FocusTimer", "start"),
                OperationDecl::new("FocusTimer", "pause"),
                OperationDecl::new("FocusTimer", "_getTimersByPhase"),
            ]
        }

        fn invoke_action(
            &self,
            concept: &str,
            op: &str,
            input: &FieldMap,
        ) -> Result<ActionOutcome> {
            let input = Value::Object(input.clone());
            match (concept, op) {
                ("FocusTimer", "start") => {
                    let input: StartInput = serde_json::from_value(input)
                        .map_err(quizread_core::CoreError::from)?;
                    Ok(self.timers.start(input)?)
                }
                ("FocusTimer", "pause") => {
                    let input: TimerRef = serde_json::from_value(input)
                        .map_err(quizread_core::CoreError::from)?;
                    Ok(self.timers.pause(input)?)
                }
                _ => Err(EngineError::UnknownOperation {
                    concept: concept.to_string(),
                    op: op.to_string(),
                }),
            }
        }

        fn invoke_query(&self, concept: &str, op: &str, input: &FieldMap) -> Result<Value> {
            if self.fail_queries {
                return Err(EngineError::QueryInput {
                    concept: concept.to_string(),
                    op: op.to_string(),
                    message: "query backend down".to_string(),
                });
            }
            match (concept, op) {
                ("FocusTimer", "_getTimersByPhase") => {
                    let input: PhaseInput =
                        serde_json::from_value(Value::Object(input.clone()))
                            .map_err(quizread_core::CoreError::from)?;
                    let timers = self.timers.timers_by_phase(input)?;
                    Ok(serde_json::to_value(timers).map_err(quizread_core::CoreError::from)?)
                }
                _ => Err(EngineError::UnknownOperation {
                    concept: concept.to_string(),
                    op: op.to_string(),
                }),
            }
        }
    }

    fn timer_syncs() -> Vec<Sync> {
        vec![
            Sync::new("StartTimerRequest")
                .when(Pattern::request(
                    "/FocusTimer/start",
                    vec![("durationMs", var("durationMs")), ("phase", var("phase"))],
                ))
                .then(
                    TIMER_START,
                    vec![("durationMs", var("durationMs")), ("phase", var("phase"))],
                ),
            Sync::new("StartTimerResponse")
                .when(Pattern::request("/FocusTimer/start", vec![]))
                .when(Pattern::new(
                    TIMER_START,
                    vec![],
                    vec![("timerId", var("timerId"))],
                ))
                .respond(vec![("request", var("request")), ("timerId", var("timerId"))]),
            Sync::new("StartTimerResponseError")
                .when(Pattern::request("/FocusTimer/start", vec![]))
                .when(Pattern::new(TIMER_START, vec![], vec![("error", var("error"))]))
                .respond(vec![("request", var("request")), ("error", var("error"))]),
            Sync::new("PauseTimerRequest")
                .when(Pattern::request(
                    "/FocusTimer/pause",
                    vec![("timerId", var("timerId"))],
                ))
                .then(TIMER_PAUSE, vec![("timerId", var("timerId"))]),
            Sync::new("PauseTimerResponse")
                .when(Pattern::request("/FocusTimer/pause", vec![]))
                .when(Pattern::new(TIMER_PAUSE, vec![], vec![]))
                .respond(vec![("request", var("request"))]),
            Sync::new("PauseTimerResponseError")
                .when(Pattern::request("/FocusTimer/pause", vec![]))
                .when(Pattern::new(TIMER_PAUSE, vec![], vec![("error", var("error"))]))
                .respond(vec![("request", var("request")), ("error", var("error"))]),
        ]
    }

    fn engine_with(syncs: Vec<Sync>) -> Engine {
        let store = Store::in_memory().unwrap();
        Engine::new(
            Arc::new(TimerConcepts::new(store.clone())),
            RequestLedger::new(store),
            syncs,
        )
    }

    fn body(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn start_then_pause_then_pause_again() {
        let engine = engine_with(timer_syncs());

        let started = engine
            .handle_request(
                "/FocusTimer/start",
                body(json!({ "durationMs": 30000, "phase": "reading" })),
            )
            .unwrap();
        let timer_id = started["timerId"].as_str().unwrap().to_string();

        let paused = engine
            .handle_request("/FocusTimer/pause", body(json!({ "timerId": timer_id })))
            .unwrap();
        assert_eq!(paused, json!({}));

        let again = engine
            .handle_request("/FocusTimer/pause", body(json!({ "timerId": timer_id })))
            .unwrap();
        assert_eq!(again, json!({ "error": "Timer is not active" }));
    }

    #[test]
    fn domain_errors_flow_through_the_error_sync() {
        let engine = engine_with(timer_syncs());
        let response = engine
            .handle_request(
                "/FocusTimer/start",
                body(json!({ "durationMs": 0, "phase": "reading" })),
            )
            .unwrap();
        assert_eq!(
            response,
            json!({ "error": "durationMs must be greater than 0" })
        );
    }

    #[test]
    fn requests_join_only_their_own_completions() {
        // Two sequential requests: each response must carry its own
        // request id, never the sibling's.
        let engine = engine_with(timer_syncs());
        let r1 = engine
            .handle_request(
                "/FocusTimer/start",
                body(json!({ "durationMs": 1000, "phase": "reading" })),
            )
            .unwrap();
        let r2 = engine
            .handle_request(
                "/FocusTimer/start",
                body(json!({ "durationMs": 2000, "phase": "break" })),
            )
            .unwrap();
        assert_ne!(r1["timerId"], r2["timerId"]);
    }

    #[test]
    fn unmatched_paths_produce_no_response() {
        let engine = engine_with(timer_syncs());
        let err = engine
            .handle_request("/FocusTimer/resume", body(json!({ "timerId": "t" })))
            .unwrap_err();
        assert!(matches!(err, EngineError::NoResponse(_)));
    }

    #[test]
    fn unresolved_then_variable_is_a_fault() {
        let syncs = vec![Sync::new("BrokenRequest")
            .when(Pattern::request("/FocusTimer/start", vec![]))
            .respond(vec![
                ("request", var("request")),
                ("timerId", var("neverBound")),
            ])];
        let engine = engine_with(syncs);
        let err = engine
            .handle_request("/FocusTimer/start", FieldMap::new())
            .unwrap_err();
        match err {
            EngineError::Unresolved { sync, field } => {
                assert_eq!(sync, "BrokenRequest");
                assert_eq!(field, "neverBound");
            }
            other => panic!("expected unresolved fault, got {other}"),
        }
    }

    #[test]
    fn where_stage_faults_fail_the_request_without_poisoning_the_next() {
        let failing = Sync::new("FailingWhere")
            .when(Pattern::request("/FocusTimer/start", vec![]))
            .where_stage(|_, ctx| {
                ctx.query("FocusTimer", "_getTimersByPhase", FieldMap::new())?;
                unreachable!()
            })
            .respond(vec![("request", var("request"))]);
        let store = Store::in_memory().unwrap();
        let engine = Engine::new(
            Arc::new(TimerConcepts {
                timers: FocusTimer::new(store.clone()),
                fail_queries: true,
            }),
            RequestLedger::new(store),
            vec![failing],
        );

        let err = engine
            .handle_request("/FocusTimer/start", FieldMap::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::QueryInput { .. }));

        // The fault stays scoped to its own request.
        let err = engine
            .handle_request("/FocusTimer/start", FieldMap::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::QueryInput { .. }));
    }

    #[test]
    fn a_faulting_frame_does_not_block_its_siblings() {
        // Fan out into a broken frame and a good one; the good frame must
        // still respond.
        let syncs = vec![Sync::new("FanOutRequest")
            .when(Pattern::request("/FocusTimer/start", vec![]))
            .where_stage(|frames, _| {
                Ok(frames
                    .into_iter()
                    .flat_map(|frame| {
                        [
                            frame.clone().bind("pick", json!(1)),
                            frame.bind("answer", json!("ok")).bind("pick", json!(2)),
                        ]
                    })
                    .collect())
            })
            .respond(vec![
                ("request", var("request")),
                ("answer", var("answer")),
            ])];
        let engine = engine_with(syncs);
        let response = engine
            .handle_request("/FocusTimer/start", FieldMap::new())
            .unwrap();
        assert_eq!(response, json!({ "answer": "ok" }));
    }

    #[test]
    fn where_stage_can_bind_query_results() {
        let mut syncs = timer_syncs();
        syncs.push(
            Sync::new("ReadingTimersRequest")
                .when(Pattern::request("/FocusTimer/_reading", vec![]))
                .where_stage(|frames, ctx| {
                    let mut out = Frames::new();
                    for frame in frames {
                        let mut args = FieldMap::new();
                        args.insert("phase".to_string(), json!("reading"));
                        let timers = ctx.query("FocusTimer", "_getTimersByPhase", args)?;
                        out.push(frame.bind("timers", timers));
                    }
                    Ok(out)
                })
                .respond(vec![("request", var("request")), ("timers", var("timers"))]),
        );
        let engine = engine_with(syncs);
        engine
            .handle_request(
                "/FocusTimer/start",
                body(json!({ "durationMs": 1000, "phase": "reading" })),
            )
            .unwrap();

        let response = engine
            .handle_request("/FocusTimer/_reading", FieldMap::new())
            .unwrap();
        let timers = response.as_array().expect("array body");
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0]["phase"], "reading");
    }

    #[test]
    fn runaway_sync_sets_hit_the_completion_cap() {
        // start's completion feeds a sync that starts another timer.
        let mut syncs = timer_syncs();
        syncs.push(
            Sync::new("RestartForever")
                .when(Pattern::new(
                    TIMER_START,
                    vec![],
                    vec![("timerId", var("timerId"))],
                ))
                .then(
                    TIMER_START,
                    vec![("durationMs", lit(1000)), ("phase", lit("reading"))],
                ),
        );
        let engine = engine_with(syncs);
        let err = engine
            .handle_request(
                "/FocusTimer/start",
                body(json!({ "durationMs": 1000, "phase": "reading" })),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::CompletionOverflow(_)));
    }

    #[test]
    fn normalize_response_shape_law() {
        assert_eq!(
            normalize_response(&body(json!({ "request": "r", "items": ["a", "b"] }))),
            json!(["a", "b"])
        );
        assert_eq!(
            normalize_response(&body(json!({ "request": "r", "book": null }))),
            Value::Null
        );
        assert_eq!(
            normalize_response(&body(json!({ "request": "r", "bookId": "x" }))),
            json!({ "bookId": "x" })
        );
        assert_eq!(
            normalize_response(&body(json!({ "request": "r", "a": "x", "b": "y" }))),
            json!({ "a": "x", "b": "y" })
        );
        assert_eq!(
            normalize_response(&body(json!({ "request": "r" }))),
            json!({})
        );
    }
}

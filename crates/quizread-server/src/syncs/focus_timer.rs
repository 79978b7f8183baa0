//! FocusTimer route syncs.

use quizread_engine::{decl, var, ActionDecl, Pattern, Sync};

use super::{empty_response, error_response, field_response, query_route};

const START: ActionDecl = decl("FocusTimer", "start");
const PAUSE: ActionDecl = decl("FocusTimer", "pause");
const RESUME: ActionDecl = decl("FocusTimer", "resume");
const EXPIRE: ActionDecl = decl("FocusTimer", "expire");

pub fn syncs() -> Vec<Sync> {
    vec![
        Sync::new("StartRequest")
            .when(Pattern::request(
                "/FocusTimer/start",
                vec![("durationMs", var("durationMs")), ("phase", var("phase"))],
            ))
            .then(START, vec![("durationMs", var("durationMs")), ("phase", var("phase"))]),
        field_response("StartResponse", "/FocusTimer/start", START, "timerId"),
        error_response("StartResponseError", "/FocusTimer/start", START),
        Sync::new("PauseRequest")
            .when(Pattern::request("/FocusTimer/pause", vec![("timerId", var("timerId"))]))
            .then(PAUSE, vec![("timerId", var("timerId"))]),
        empty_response("PauseResponse", "/FocusTimer/pause", PAUSE),
        error_response("PauseResponseError", "/FocusTimer/pause", PAUSE),
        Sync::new("ResumeRequest")
            .when(Pattern::request("/FocusTimer/resume", vec![("timerId", var("timerId"))]))
            .then(RESUME, vec![("timerId", var("timerId"))]),
        empty_response("ResumeResponse", "/FocusTimer/resume", RESUME),
        error_response("ResumeResponseError", "/FocusTimer/resume", RESUME),
        Sync::new("ExpireRequest")
            .when(Pattern::request("/FocusTimer/expire", vec![("timerId", var("timerId"))]))
            .then(EXPIRE, vec![("timerId", var("timerId"))]),
        empty_response("ExpireResponse", "/FocusTimer/expire", EXPIRE),
        error_response("ExpireResponseError", "/FocusTimer/expire", EXPIRE),
        query_route(
            "GetTimerRequest",
            "/FocusTimer/_getTimer",
            vec![("timerId", var("timerId"))],
            "timer",
            "FocusTimer",
            "_getTimer",
            &["timerId"],
        ),
        query_route(
            "GetActiveTimersRequest",
            "/FocusTimer/_getActiveTimers",
            vec![],
            "timers",
            "FocusTimer",
            "_getActiveTimers",
            &[],
        ),
        query_route(
            "GetTimersByPhaseRequest",
            "/FocusTimer/_getTimersByPhase",
            vec![("phase", var("phase"))],
            "timers",
            "FocusTimer",
            "_getTimersByPhase",
            &["phase"],
        ),
    ]
}

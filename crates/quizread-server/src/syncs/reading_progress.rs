//! ReadingProgress route syncs.

use quizread_engine::{decl, var, ActionDecl, Pattern, Sync};

use super::{empty_response, error_response, field_response, query_route};

const INITIALIZE_PROGRESS: ActionDecl = decl("ReadingProgress", "initializeProgress");
const UPDATE_PROGRESS: ActionDecl = decl("ReadingProgress", "updateProgress");
const TRIGGER_QUIZ: ActionDecl = decl("ReadingProgress", "triggerQuiz");
const TRIGGER_ANNOTATION: ActionDecl = decl("ReadingProgress", "triggerAnnotation");
const RECORD_QUIZ_TRIGGERED: ActionDecl = decl("ReadingProgress", "recordQuizTriggered");
const RECORD_ANNOTATION_TRIGGERED: ActionDecl =
    decl("ReadingProgress", "recordAnnotationTriggered");
const PAUSE_READING: ActionDecl = decl("ReadingProgress", "pauseReading");
const RESUME_READING: ActionDecl = decl("ReadingProgress", "resumeReading");

/// Request sync taking a single sessionId field.
fn session_request(name: &'static str, path: &str, target: ActionDecl) -> Sync {
    Sync::new(name)
        .when(Pattern::request(path, vec![("sessionId", var("sessionId"))]))
        .then(target, vec![("sessionId", var("sessionId"))])
}

pub fn syncs() -> Vec<Sync> {
    vec![
        Sync::new("InitializeProgressRequest")
            .when(Pattern::request(
                "/ReadingProgress/initializeProgress",
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("totalPages", var("totalPages")),
                    ("quizInterval", var("quizInterval")),
                    ("annotationInterval", var("annotationInterval")),
                ],
            ))
            .then(
                INITIALIZE_PROGRESS,
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("totalPages", var("totalPages")),
                    ("quizInterval", var("quizInterval")),
                    ("annotationInterval", var("annotationInterval")),
                ],
            ),
        field_response(
            "InitializeProgressResponse",
            "/ReadingProgress/initializeProgress",
            INITIALIZE_PROGRESS,
            "sessionId",
        ),
        error_response(
            "InitializeProgressResponseError",
            "/ReadingProgress/initializeProgress",
            INITIALIZE_PROGRESS,
        ),
        Sync::new("UpdateProgressRequest")
            .when(Pattern::request(
                "/ReadingProgress/updateProgress",
                vec![("sessionId", var("sessionId")), ("newPage", var("newPage"))],
            ))
            .then(
                UPDATE_PROGRESS,
                vec![("sessionId", var("sessionId")), ("newPage", var("newPage"))],
            ),
        empty_response("UpdateProgressResponse", "/ReadingProgress/updateProgress", UPDATE_PROGRESS),
        error_response(
            "UpdateProgressResponseError",
            "/ReadingProgress/updateProgress",
            UPDATE_PROGRESS,
        ),
        session_request("TriggerQuizRequest", "/ReadingProgress/triggerQuiz", TRIGGER_QUIZ),
        field_response(
            "TriggerQuizResponse",
            "/ReadingProgress/triggerQuiz",
            TRIGGER_QUIZ,
            "shouldTrigger",
        ),
        error_response("TriggerQuizResponseError", "/ReadingProgress/triggerQuiz", TRIGGER_QUIZ),
        session_request(
            "TriggerAnnotationRequest",
            "/ReadingProgress/triggerAnnotation",
            TRIGGER_ANNOTATION,
        ),
        field_response(
            "TriggerAnnotationResponse",
            "/ReadingProgress/triggerAnnotation",
            TRIGGER_ANNOTATION,
            "shouldTrigger",
        ),
        error_response(
            "TriggerAnnotationResponseError",
            "/ReadingProgress/triggerAnnotation",
            TRIGGER_ANNOTATION,
        ),
        session_request(
            "RecordQuizTriggeredRequest",
            "/ReadingProgress/recordQuizTriggered",
            RECORD_QUIZ_TRIGGERED,
        ),
        empty_response(
            "RecordQuizTriggeredResponse",
            "/ReadingProgress/recordQuizTriggered",
            RECORD_QUIZ_TRIGGERED,
        ),
        error_response(
            "RecordQuizTriggeredResponseError",
            "/ReadingProgress/recordQuizTriggered",
            RECORD_QUIZ_TRIGGERED,
        ),
        session_request(
            "RecordAnnotationTriggeredRequest",
            "/ReadingProgress/recordAnnotationTriggered",
            RECORD_ANNOTATION_TRIGGERED,
        ),
        empty_response(
            "RecordAnnotationTriggeredResponse",
            "/ReadingProgress/recordAnnotationTriggered",
            RECORD_ANNOTATION_TRIGGERED,
        ),
        error_response(
            "RecordAnnotationTriggeredResponseError",
            "/ReadingProgress/recordAnnotationTriggered",
            RECORD_ANNOTATION_TRIGGERED,
        ),
        session_request("PauseReadingRequest", "/ReadingProgress/pauseReading", PAUSE_READING),
        empty_response("PauseReadingResponse", "/ReadingProgress/pauseReading", PAUSE_READING),
        error_response(
            "PauseReadingResponseError",
            "/ReadingProgress/pauseReading",
            PAUSE_READING,
        ),
        session_request("ResumeReadingRequest", "/ReadingProgress/resumeReading", RESUME_READING),
        empty_response("ResumeReadingResponse", "/ReadingProgress/resumeReading", RESUME_READING),
        error_response(
            "ResumeReadingResponseError",
            "/ReadingProgress/resumeReading",
            RESUME_READING,
        ),
        query_route(
            "GetReadingSessionRequest",
            "/ReadingProgress/_getReadingSession",
            vec![("sessionId", var("sessionId"))],
            "session",
            "ReadingProgress",
            "_getReadingSession",
            &["sessionId"],
        ),
        query_route(
            "GetUserSessionsRequest",
            "/ReadingProgress/_getUserSessions",
            vec![("userId", var("userId"))],
            "sessions",
            "ReadingProgress",
            "_getUserSessions",
            &["userId"],
        ),
        query_route(
            "GetBookSessionsRequest",
            "/ReadingProgress/_getBookSessions",
            vec![("bookId", var("bookId"))],
            "sessions",
            "ReadingProgress",
            "_getBookSessions",
            &["bookId"],
        ),
        query_route(
            "GetActiveSessionsRequest",
            "/ReadingProgress/_getActiveSessions",
            vec![],
            "sessions",
            "ReadingProgress",
            "_getActiveSessions",
            &[],
        ),
    ]
}

//! Passthrough policy.
//!
//! Every concept operation is reachable at `/api/{Concept}/{operation}`
//! by default. Inclusions name the routes allowed to stay on the direct
//! passthrough, each with a justification; exclusions are routed through
//! the sync pipeline instead and must be covered by a request sync.
//! Both tables are validated at startup.

/// Routes deliberately left on the passthrough.
pub const INCLUSIONS: &[(&str, &str)] = &[
    ("/api/UserAuth/register", "public action - anyone can register"),
    ("/api/UserAuth/login", "public action - anyone can login"),
];

/// Routes pulled off the passthrough: auth and ownership checks happen
/// in their syncs.
pub const EXCLUSIONS: &[&str] = &[
    "/api/UserAuth/_getUser",
    "/api/UserAuth/_getUserByEmail",
    "/api/UserAuth/_getAllUsers",
    "/api/Library/prepareUpload",
    "/api/Library/addBook",
    "/api/Library/getBook",
    "/api/Library/listBooks",
    "/api/Library/removeBook",
    "/api/Library/cleanupFailedUpload",
    "/api/Library/getViewUrl",
    "/api/Library/_getBook",
    "/api/Library/_getUserBooks",
    "/api/Library/_getAllBooks",
    "/api/Annotate/saveAnnotation",
    "/api/Annotate/_getUserAnnotations",
    "/api/Annotate/_getAllUserAnnotations",
    "/api/Annotate/_getAnnotationsForBook",
    "/api/CheckpointQuiz/createQuiz",
    "/api/CheckpointQuiz/submitQuizAnswer",
    "/api/CheckpointQuiz/getQuizContext",
    "/api/CheckpointQuiz/createQuizFromPDF",
    "/api/CheckpointQuiz/_getQuiz",
    "/api/CheckpointQuiz/_getQuizAttempts",
    "/api/CheckpointQuiz/_getUserAttempts",
    "/api/FocusTimer/start",
    "/api/FocusTimer/pause",
    "/api/FocusTimer/resume",
    "/api/FocusTimer/expire",
    "/api/FocusTimer/_getTimer",
    "/api/FocusTimer/_getActiveTimers",
    "/api/FocusTimer/_getTimersByPhase",
    "/api/ReadingProgress/initializeProgress",
    "/api/ReadingProgress/updateProgress",
    "/api/ReadingProgress/triggerQuiz",
    "/api/ReadingProgress/triggerAnnotation",
    "/api/ReadingProgress/recordQuizTriggered",
    "/api/ReadingProgress/recordAnnotationTriggered",
    "/api/ReadingProgress/pauseReading",
    "/api/ReadingProgress/resumeReading",
    "/api/ReadingProgress/_getReadingSession",
    "/api/ReadingProgress/_getUserSessions",
    "/api/ReadingProgress/_getBookSessions",
    "/api/ReadingProgress/_getActiveSessions",
];

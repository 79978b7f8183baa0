//! CheckpointQuiz route syncs.
//!
//! getQuizContext and createQuizFromPDF take an optional pageRange, bound
//! from the recorded request in a `where` stage.

use quizread_engine::{decl, var, ActionDecl, Pattern, Sync};

use super::{bind_optional, error_response, field_response, query_route};

const CREATE_QUIZ: ActionDecl = decl("CheckpointQuiz", "createQuiz");
const SUBMIT_QUIZ_ANSWER: ActionDecl = decl("CheckpointQuiz", "submitQuizAnswer");
const GET_QUIZ_CONTEXT: ActionDecl = decl("CheckpointQuiz", "getQuizContext");
const CREATE_QUIZ_FROM_PDF: ActionDecl = decl("CheckpointQuiz", "createQuizFromPDF");

pub fn syncs() -> Vec<Sync> {
    vec![
        Sync::new("CreateQuizRequest")
            .when(Pattern::request(
                "/CheckpointQuiz/createQuiz",
                vec![("content", var("content"))],
            ))
            .then(CREATE_QUIZ, vec![("content", var("content"))]),
        field_response("CreateQuizResponse", "/CheckpointQuiz/createQuiz", CREATE_QUIZ, "quiz"),
        error_response("CreateQuizResponseError", "/CheckpointQuiz/createQuiz", CREATE_QUIZ),
        Sync::new("SubmitQuizAnswerRequest")
            .when(Pattern::request(
                "/CheckpointQuiz/submitQuizAnswer",
                vec![
                    ("userId", var("userId")),
                    ("quizId", var("quizId")),
                    ("selectedIndex", var("selectedIndex")),
                ],
            ))
            .then(
                SUBMIT_QUIZ_ANSWER,
                vec![
                    ("userId", var("userId")),
                    ("quizId", var("quizId")),
                    ("selectedIndex", var("selectedIndex")),
                ],
            ),
        Sync::new("SubmitQuizAnswerResponse")
            .when(Pattern::request("/CheckpointQuiz/submitQuizAnswer", vec![]))
            .when(Pattern::new(
                SUBMIT_QUIZ_ANSWER,
                vec![],
                vec![("attemptId", var("attemptId")), ("isCorrect", var("isCorrect"))],
            ))
            .respond(vec![
                ("request", var("request")),
                ("attemptId", var("attemptId")),
                ("isCorrect", var("isCorrect")),
            ]),
        error_response(
            "SubmitQuizAnswerResponseError",
            "/CheckpointQuiz/submitQuizAnswer",
            SUBMIT_QUIZ_ANSWER,
        ),
        Sync::new("GetQuizContextRequest")
            .when(Pattern::request(
                "/CheckpointQuiz/getQuizContext",
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("currentPage", var("currentPage")),
                ],
            ))
            .where_stage(bind_optional(&["pageRange"]))
            .then(
                GET_QUIZ_CONTEXT,
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("currentPage", var("currentPage")),
                    ("pageRange", var("pageRange")),
                ],
            ),
        field_response(
            "GetQuizContextResponse",
            "/CheckpointQuiz/getQuizContext",
            GET_QUIZ_CONTEXT,
            "content",
        ),
        error_response(
            "GetQuizContextResponseError",
            "/CheckpointQuiz/getQuizContext",
            GET_QUIZ_CONTEXT,
        ),
        Sync::new("CreateQuizFromPDFRequest")
            .when(Pattern::request(
                "/CheckpointQuiz/createQuizFromPDF",
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("currentPage", var("currentPage")),
                ],
            ))
            .where_stage(bind_optional(&["pageRange"]))
            .then(
                CREATE_QUIZ_FROM_PDF,
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("currentPage", var("currentPage")),
                    ("pageRange", var("pageRange")),
                ],
            ),
        field_response(
            "CreateQuizFromPDFResponse",
            "/CheckpointQuiz/createQuizFromPDF",
            CREATE_QUIZ_FROM_PDF,
            "quiz",
        ),
        error_response(
            "CreateQuizFromPDFResponseError",
            "/CheckpointQuiz/createQuizFromPDF",
            CREATE_QUIZ_FROM_PDF,
        ),
        query_route(
            "GetQuizRequest",
            "/CheckpointQuiz/_getQuiz",
            vec![("quizId", var("quizId"))],
            "quiz",
            "CheckpointQuiz",
            "_getQuiz",
            &["quizId"],
        ),
        query_route(
            "GetQuizAttemptsRequest",
            "/CheckpointQuiz/_getQuizAttempts",
            vec![("quizId", var("quizId"))],
            "attempts",
            "CheckpointQuiz",
            "_getQuizAttempts",
            &["quizId"],
        ),
        query_route(
            "GetUserAttemptsRequest",
            "/CheckpointQuiz/_getUserAttempts",
            vec![("userId", var("userId"))],
            "attempts",
            "CheckpointQuiz",
            "_getUserAttempts",
            &["userId"],
        ),
    ]
}

//! Annotate route syncs.

use quizread_engine::{decl, var, ActionDecl, Pattern, Sync};

use super::{error_response, field_response, query_route};

const SAVE_ANNOTATION: ActionDecl = decl("Annotate", "saveAnnotation");

pub fn syncs() -> Vec<Sync> {
    vec![
        Sync::new("SaveAnnotationRequest")
            .when(Pattern::request(
                "/Annotate/saveAnnotation",
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("content", var("content")),
                    ("keyIdeas", var("keyIdeas")),
                ],
            ))
            .then(
                SAVE_ANNOTATION,
                vec![
                    ("userId", var("userId")),
                    ("bookId", var("bookId")),
                    ("content", var("content")),
                    ("keyIdeas", var("keyIdeas")),
                ],
            ),
        field_response(
            "SaveAnnotationResponse",
            "/Annotate/saveAnnotation",
            SAVE_ANNOTATION,
            "annotationId",
        ),
        error_response("SaveAnnotationResponseError", "/Annotate/saveAnnotation", SAVE_ANNOTATION),
        query_route(
            "GetUserAnnotationsRequest",
            "/Annotate/_getUserAnnotations",
            vec![("userId", var("userId")), ("content", var("content"))],
            "annotations",
            "Annotate",
            "_getUserAnnotations",
            &["userId", "content"],
        ),
        query_route(
            "GetAllUserAnnotationsRequest",
            "/Annotate/_getAllUserAnnotations",
            vec![("userId", var("userId"))],
            "annotations",
            "Annotate",
            "_getAllUserAnnotations",
            &["userId"],
        ),
        query_route(
            "GetAnnotationsForBookRequest",
            "/Annotate/_getAnnotationsForBook",
            vec![("userId", var("userId")), ("bookId", var("bookId"))],
            "annotations",
            "Annotate",
            "_getAnnotationsForBook",
            &["userId", "bookId"],
        ),
    ]
}

//! Library route syncs.
//!
//! prepareUpload, addBook and getViewUrl have optional body fields, so
//! their request syncs match on the required fields only and pick the
//! optional ones out of the recorded request in a `where` stage. getBook
//! and listBooks cannot produce a domain error, so they carry no error
//! sync.

use quizread_engine::{decl, var, ActionDecl, Pattern, Sync};

use super::{bind_optional, empty_response, error_response, field_response, query_route};

const PREPARE_UPLOAD: ActionDecl = decl("Library", "prepareUpload");
const ADD_BOOK: ActionDecl = decl("Library", "addBook");
const GET_BOOK: ActionDecl = decl("Library", "getBook");
const LIST_BOOKS: ActionDecl = decl("Library", "listBooks");
const REMOVE_BOOK: ActionDecl = decl("Library", "removeBook");
const CLEANUP_FAILED_UPLOAD: ActionDecl = decl("Library", "cleanupFailedUpload");
const GET_VIEW_URL: ActionDecl = decl("Library", "getViewUrl");

pub fn syncs() -> Vec<Sync> {
    vec![
        Sync::new("PrepareUploadRequest")
            .when(Pattern::request(
                "/Library/prepareUpload",
                vec![("ownerId", var("ownerId")), ("fileName", var("fileName"))],
            ))
            .where_stage(bind_optional(&["contentType"]))
            .then(
                PREPARE_UPLOAD,
                vec![
                    ("ownerId", var("ownerId")),
                    ("fileName", var("fileName")),
                    ("contentType", var("contentType")),
                ],
            ),
        Sync::new("PrepareUploadResponse")
            .when(Pattern::request("/Library/prepareUpload", vec![]))
            .when(Pattern::new(
                PREPARE_UPLOAD,
                vec![],
                vec![
                    ("signedUrl", var("signedUrl")),
                    ("publicUrl", var("publicUrl")),
                    ("fileName", var("fileName")),
                ],
            ))
            .respond(vec![
                ("request", var("request")),
                ("signedUrl", var("signedUrl")),
                ("publicUrl", var("publicUrl")),
                ("fileName", var("fileName")),
            ]),
        error_response("PrepareUploadResponseError", "/Library/prepareUpload", PREPARE_UPLOAD),
        Sync::new("AddBookRequest")
            .when(Pattern::request(
                "/Library/addBook",
                vec![
                    ("ownerId", var("ownerId")),
                    ("title", var("title")),
                    ("storageUrl", var("storageUrl")),
                ],
            ))
            .where_stage(bind_optional(&["fileName"]))
            .then(
                ADD_BOOK,
                vec![
                    ("ownerId", var("ownerId")),
                    ("title", var("title")),
                    ("storageUrl", var("storageUrl")),
                    ("fileName", var("fileName")),
                ],
            ),
        field_response("AddBookResponse", "/Library/addBook", ADD_BOOK, "bookId"),
        error_response("AddBookResponseError", "/Library/addBook", ADD_BOOK),
        Sync::new("GetBookRequest")
            .when(Pattern::request("/Library/getBook", vec![("bookId", var("bookId"))]))
            .then(GET_BOOK, vec![("bookId", var("bookId"))]),
        field_response("GetBookResponse", "/Library/getBook", GET_BOOK, "exists"),
        Sync::new("ListBooksRequest")
            .when(Pattern::request("/Library/listBooks", vec![("ownerId", var("ownerId"))]))
            .then(LIST_BOOKS, vec![("ownerId", var("ownerId"))]),
        field_response("ListBooksResponse", "/Library/listBooks", LIST_BOOKS, "bookIds"),
        Sync::new("RemoveBookRequest")
            .when(Pattern::request(
                "/Library/removeBook",
                vec![("ownerId", var("ownerId")), ("bookId", var("bookId"))],
            ))
            .then(REMOVE_BOOK, vec![("ownerId", var("ownerId")), ("bookId", var("bookId"))]),
        empty_response("RemoveBookResponse", "/Library/removeBook", REMOVE_BOOK),
        error_response("RemoveBookResponseError", "/Library/removeBook", REMOVE_BOOK),
        Sync::new("CleanupFailedUploadRequest")
            .when(Pattern::request(
                "/Library/cleanupFailedUpload",
                vec![("fileName", var("fileName"))],
            ))
            .then(CLEANUP_FAILED_UPLOAD, vec![("fileName", var("fileName"))]),
        empty_response(
            "CleanupFailedUploadResponse",
            "/Library/cleanupFailedUpload",
            CLEANUP_FAILED_UPLOAD,
        ),
        error_response(
            "CleanupFailedUploadResponseError",
            "/Library/cleanupFailedUpload",
            CLEANUP_FAILED_UPLOAD,
        ),
        Sync::new("GetViewUrlRequest")
            .when(Pattern::request(
                "/Library/getViewUrl",
                vec![("ownerId", var("ownerId")), ("bookId", var("bookId"))],
            ))
            .where_stage(bind_optional(&["expiresInMinutes"]))
            .then(
                GET_VIEW_URL,
                vec![
                    ("ownerId", var("ownerId")),
                    ("bookId", var("bookId")),
                    ("expiresInMinutes", var("expiresInMinutes")),
                ],
            ),
        field_response("GetViewUrlResponse", "/Library/getViewUrl", GET_VIEW_URL, "viewUrl"),
        error_response("GetViewUrlResponseError", "/Library/getViewUrl", GET_VIEW_URL),
        query_route(
            "GetBookQueryRequest",
            "/Library/_getBook",
            vec![("bookId", var("bookId"))],
            "book",
            "Library",
            "_getBook",
            &["bookId"],
        ),
        query_route(
            "GetUserBooksRequest",
            "/Library/_getUserBooks",
            vec![("ownerId", var("ownerId"))],
            "books",
            "Library",
            "_getUserBooks",
            &["ownerId"],
        ),
        query_route(
            "GetAllBooksRequest",
            "/Library/_getAllBooks",
            vec![],
            "books",
            "Library",
            "_getAllBooks",
            &[],
        ),
    ]
}

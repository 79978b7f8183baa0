//! UserAuth route syncs.
//!
//! register and login stay on the passthrough; only the three queries go
//! through the sync pipeline.

use quizread_engine::{var, Sync};

use super::query_route;

pub fn syncs() -> Vec<Sync> {
    vec![
        query_route(
            "GetUserRequest",
            "/UserAuth/_getUser",
            vec![("userId", var("userId"))],
            "user",
            "UserAuth",
            "_getUser",
            &["userId"],
        ),
        query_route(
            "GetUserByEmailRequest",
            "/UserAuth/_getUserByEmail",
            vec![("email", var("email"))],
            "user",
            "UserAuth",
            "_getUserByEmail",
            &["email"],
        ),
        query_route(
            "GetAllUsersRequest",
            "/UserAuth/_getAllUsers",
            vec![],
            "users",
            "UserAuth",
            "_getAllUsers",
            &[],
        ),
    ]
}

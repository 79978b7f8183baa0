//! Sync declarations for every route excluded from passthrough.
//!
//! Each action route gets a Request/Response/ResponseError triple (the
//! two response syncs split on the completion's success/error variant);
//! query routes get a single Request sync whose `where` stage runs the
//! query and binds its result. Routes whose actions never produce a
//! domain error (Library getBook and listBooks) have no error sync.

use quizread_engine::{var, ActionDecl, FieldPat, Frames, Pattern, Result, Sync, WhereCtx};
use serde_json::Value;

pub mod annotate;
pub mod checkpoint_quiz;
pub mod focus_timer;
pub mod library;
pub mod reading_progress;
pub mod user_auth;

/// Every sync in the system, in registration order.
pub fn all() -> Vec<Sync> {
    let mut syncs = Vec::new();
    syncs.extend(user_auth::syncs());
    syncs.extend(library::syncs());
    syncs.extend(annotate::syncs());
    syncs.extend(checkpoint_quiz::syncs());
    syncs.extend(focus_timer::syncs());
    syncs.extend(reading_progress::syncs());
    syncs
}

// ---------------------------------------------------------------------------
// Shared sync shapes
// ---------------------------------------------------------------------------

/// Response sync for an action that succeeded with an empty payload:
/// respond with `{}`.
pub(crate) fn empty_response(name: &'static str, path: &str, decl: ActionDecl) -> Sync {
    Sync::new(name)
        .when(Pattern::request(path, vec![]))
        .when(Pattern::new(decl, vec![], vec![]))
        .respond(vec![("request", var("request"))])
}

/// Error-variant response sync: forward the action's `{error}` verbatim.
pub(crate) fn error_response(name: &'static str, path: &str, decl: ActionDecl) -> Sync {
    Sync::new(name)
        .when(Pattern::request(path, vec![]))
        .when(Pattern::new(decl, vec![], vec![("error", var("error"))]))
        .respond(vec![("request", var("request")), ("error", var("error"))])
}

/// Single-field success response sync: bind one output field and respond
/// with it.
pub(crate) fn field_response(
    name: &'static str,
    path: &str,
    decl: ActionDecl,
    field: &'static str,
) -> Sync {
    Sync::new(name)
        .when(Pattern::request(path, vec![]))
        .when(Pattern::new(decl, vec![], vec![(field, var(field))]))
        .respond(vec![("request", var("request")), (field, var(field))])
}

/// Where stage running one concept query per frame and binding its raw
/// result (entity-or-null or array, bound whole) under `target`. Query
/// arguments are drawn from frame variables by name.
pub(crate) fn bind_query(
    target: &'static str,
    concept: &'static str,
    op: &'static str,
    args: &'static [&'static str],
) -> impl Fn(Frames, &WhereCtx) -> Result<Frames> + Send + std::marker::Sync {
    move |frames, ctx| {
        let mut out = Frames::new();
        for frame in frames {
            let mut input = quizread_core::FieldMap::new();
            for arg in args {
                input.insert(arg.to_string(), frame.require(arg)?.clone());
            }
            let result = ctx.query(concept, op, input)?;
            out.push(frame.bind(target, result));
        }
        Ok(out)
    }
}

/// Where stage re-reading the original request input to pick up optional
/// body fields: each listed field is bound under its own name, `null`
/// when the caller omitted it (the action's deserializer treats `null`
/// as absent and applies its default).
pub(crate) fn bind_optional(
    fields: &'static [&'static str],
) -> impl Fn(Frames, &WhereCtx) -> Result<Frames> + Send + std::marker::Sync {
    move |frames, ctx| {
        let mut out = Frames::new();
        for frame in frames {
            let input = ctx.request_input(frame.require("request")?)?;
            let mut frame = frame;
            for field in fields {
                let value = input.get(*field).cloned().unwrap_or(Value::Null);
                frame = frame.bind(field, value);
            }
            out.push(frame);
        }
        Ok(out)
    }
}

/// Query-route sync: match the request, run the query in `where`, respond
/// with the bound result.
pub(crate) fn query_route(
    name: &'static str,
    path: &str,
    request_fields: Vec<(&'static str, FieldPat)>,
    target: &'static str,
    concept: &'static str,
    op: &'static str,
    args: &'static [&'static str],
) -> Sync {
    Sync::new(name)
        .when(Pattern::request(path, request_fields))
        .where_stage(bind_query(target, concept, op, args))
        .respond(vec![("request", var("request")), (target, var(target))])
}

//! Declarative synchronization engine.
//!
//! Inbound requests become completions of an implicit request
//! pseudo-action. Syncs join completions on shared variable bindings,
//! optionally refine the surviving frames through a `where` stage, and
//! dispatch further actions or the terminal `respond`. The request ledger
//! records every inbound request and its single response.

pub mod action;
pub mod engine;
pub mod error;
pub mod frame;
pub mod ledger;
pub mod pattern;
pub mod registry;
pub mod sync;

pub use action::{decl, ActionDecl, Completion, REQUEST};
pub use engine::{normalize_response, Engine};
pub use error::{EngineError, Result};
pub use frame::{Frame, Frames};
pub use ledger::{RequestLedger, RequestRecord};
pub use pattern::{lit, var, FieldPat, Pattern};
pub use registry::{Concepts, OpKind, OperationDecl, RouteKind, RouteTable};
pub use sync::{Sync, ThenStep, ThenTarget, WhereCtx, WhereFn};

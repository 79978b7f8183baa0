//! Concept operation registry and the startup-built route table.

use std::collections::BTreeMap;

use quizread_core::{ActionOutcome, FieldMap};
use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::sync::Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Action,
    Query,
}

/// One operation on one concept. Queries are marked by the leading
/// underscore in their wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDecl {
    pub concept: &'static str,
    pub name: &'static str,
}

impl OperationDecl {
    pub const fn new(concept: &'static str, name: &'static str) -> Self {
        Self { concept, name }
    }

    pub fn kind(&self) -> OpKind {
        if self.name.starts_with('_') {
            OpKind::Query
        } else {
            OpKind::Action
        }
    }

    /// Route path as sync patterns see it, without the `/api` prefix.
    pub fn path(&self) -> String {
        format!("/{}/{}", self.concept, self.name)
    }
}

/// The full concept surface as the engine sees it: a static operation
/// list plus dynamic dispatch into actions and queries. Implemented by
/// the server's concept registry.
pub trait Concepts: Send + std::marker::Sync {
    fn operations(&self) -> Vec<OperationDecl>;

    fn invoke_action(&self, concept: &str, op: &str, input: &FieldMap) -> Result<ActionOutcome>;

    /// Queries return an entity-or-null or an array, never a domain error.
    fn invoke_query(&self, concept: &str, op: &str, input: &FieldMap) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Forward the request body straight to the operation.
    Passthrough,
    /// Excluded from passthrough; handled by explicit syncs.
    Synced,
}

/// Allow/deny table over operation routes, built once at startup from the
/// operation declarations. Every inbound path resolves here before any
/// dispatch happens.
#[derive(Debug)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteKind>,
}

fn strip_api(route: &str) -> &str {
    route.strip_prefix("/api").unwrap_or(route)
}

impl RouteTable {
    /// Build and validate the table. Inclusions are routes deliberately
    /// left on the passthrough path (with a recorded justification);
    /// exclusions are routes that must be covered by explicit syncs.
    /// Stale entries naming no real operation, and exclusions no sync
    /// handles, are startup errors.
    pub fn build(
        operations: &[OperationDecl],
        inclusions: &[(&str, &str)],
        exclusions: &[&str],
        syncs: &[Sync],
    ) -> Result<Self> {
        let mut routes: BTreeMap<String, RouteKind> = operations
            .iter()
            .map(|op| (op.path(), RouteKind::Passthrough))
            .collect();

        for (route, _justification) in inclusions {
            if !routes.contains_key(strip_api(route)) {
                return Err(EngineError::UnknownRoute(route.to_string()));
            }
        }

        let handled: Vec<&str> = syncs
            .iter()
            .flat_map(|sync| sync.request_paths())
            .collect();
        for route in exclusions {
            let path = strip_api(route);
            match routes.get_mut(path) {
                None => return Err(EngineError::UnknownRoute(route.to_string())),
                Some(kind) => {
                    if !handled.contains(&path) {
                        return Err(EngineError::UnhandledRoute(route.to_string()));
                    }
                    *kind = RouteKind::Synced;
                }
            }
        }

        Ok(Self { routes })
    }

    pub fn kind(&self, path: &str) -> Option<RouteKind> {
        self.routes.get(strip_api(path)).copied()
    }
}

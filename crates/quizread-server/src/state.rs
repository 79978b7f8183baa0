//! Shared application state: concepts, engine and route table wired
//! together at startup.

use std::sync::Arc;

use quizread_core::extract::{PlainTextExtractor, TextExtractor};
use quizread_core::llm::{GeminiClient, QuizModel};
use quizread_core::object_store::{LocalObjectStore, ObjectStore};
use quizread_core::Store;
use quizread_engine::{Concepts, Engine, RequestLedger, RouteTable};

use crate::passthrough::{EXCLUSIONS, INCLUSIONS};
use crate::registry::App;
use crate::syncs;

/// External services the registry is wired against. Split out so tests
/// can swap the model and extractor for fakes.
pub struct Services {
    pub objects: Arc<dyn ObjectStore>,
    pub model: Arc<dyn QuizModel>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl Services {
    /// Production wiring: local signed object storage, the Gemini quiz
    /// model and plain-text page extraction.
    pub fn local(objects_root: std::path::PathBuf, base_url: String, secret: &[u8], api_key: String) -> Self {
        let objects: Arc<dyn ObjectStore> =
            Arc::new(LocalObjectStore::new(objects_root, base_url, secret));
        let extractor = Arc::new(PlainTextExtractor::new(objects.clone()));
        Self {
            objects,
            model: Arc::new(GeminiClient::new(api_key)),
            extractor,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    pub engine: Arc<Engine>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    /// Wire the full pipeline over one store. Fails when the passthrough
    /// tables name a stale route or an exclusion no sync covers.
    pub fn new(store: Store, services: Services) -> anyhow::Result<Self> {
        let app = Arc::new(App::new(
            store.clone(),
            services.objects,
            services.model,
            services.extractor,
        ));
        let syncs = syncs::all();
        let routes = RouteTable::build(&app.operations(), INCLUSIONS, EXCLUSIONS, &syncs)?;
        let engine = Engine::new(app.clone(), RequestLedger::new(store), syncs);
        Ok(Self {
            app,
            engine: Arc::new(engine),
            routes: Arc::new(routes),
        })
    }
}

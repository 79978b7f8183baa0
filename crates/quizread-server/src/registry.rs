//! Concept registry: the full operation surface the engine and the
//! passthrough dispatch into.

use std::sync::Arc;

use quizread_core::concepts::{
    annotate, checkpoint_quiz, focus_timer, library, reading_progress, user_auth, Annotate,
    CheckpointQuiz, FocusTimer, Library, ReadingProgress, UserAuth,
};
use quizread_core::extract::TextExtractor;
use quizread_core::llm::QuizModel;
use quizread_core::object_store::ObjectStore;
use quizread_core::{ActionOutcome, FieldMap, Store};
use quizread_engine::{Concepts, EngineError, OperationDecl, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// All six concepts over one shared store.
pub struct App {
    pub user_auth: UserAuth,
    pub library: Library,
    pub annotate: Annotate,
    pub checkpoint_quiz: CheckpointQuiz,
    pub focus_timer: FocusTimer,
    pub reading_progress: ReadingProgress,
}

impl App {
    pub fn new(
        store: Store,
        objects: Arc<dyn ObjectStore>,
        model: Arc<dyn QuizModel>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            user_auth: UserAuth::new(store.clone()),
            library: Library::new(store.clone(), objects),
            annotate: Annotate::new(store.clone()),
            checkpoint_quiz: CheckpointQuiz::new(store.clone(), model, extractor),
            focus_timer: FocusTimer::new(store.clone()),
            reading_progress: ReadingProgress::new(store),
        }
    }
}

fn parse<T: DeserializeOwned>(input: &FieldMap) -> std::result::Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(input.clone()))
}

/// Run an action against a deserialized input. A body that does not fit
/// the input shape is a domain error, not an engine fault.
fn act<T, F>(input: &FieldMap, run: F) -> Result<ActionOutcome>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> quizread_core::Result<ActionOutcome>,
{
    match parse(input) {
        Ok(parsed) => Ok(run(parsed)?),
        Err(e) => Ok(ActionOutcome::error(format!("invalid input: {e}"))),
    }
}

/// Query inputs are engine-supplied, so a shape mismatch is a fault.
fn query_input<T: DeserializeOwned>(concept: &str, op: &str, input: &FieldMap) -> Result<T> {
    parse(input).map_err(|e| EngineError::QueryInput {
        concept: concept.to_string(),
        op: op.to_string(),
        message: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| quizread_core::CoreError::from(e).into())
}

impl Concepts for App {
    fn operations(&self) -> Vec<OperationDecl> {
        vec![
            OperationDecl::new("UserAuth", "register"),
            OperationDecl::new("UserAuth", "login"),
            OperationDecl::new("UserAuth", "_getUser"),
            OperationDecl::new("UserAuth", "_getUserByEmail"),
            OperationDecl::new("UserAuth", "_getAllUsers"),
            OperationDecl::new("Library", "prepareUpload"),
            OperationDecl::new("Library", "addBook"),
            OperationDecl::new("Library", "getBook"),
            OperationDecl::new("Library", "listBooks"),
            OperationDecl::new("Library", "removeBook"),
            OperationDecl::new("Library", "cleanupFailedUpload"),
            OperationDecl::new("Library", "getViewUrl"),
            OperationDecl::new("Library", "_getBook"),
            OperationDecl::new("Library", "_getUserBooks"),
            OperationDecl::new("Library", "_getAllBooks"),
            OperationDecl::new("Annotate", "saveAnnotation"),
            OperationDecl::new("Annotate", "_getUserAnnotations"),
            OperationDecl::new("Annotate", "_getAllUserAnnotations"),
            OperationDecl::new("Annotate", "_getAnnotationsForBook"),
            OperationDecl::new("CheckpointQuiz", "createQuiz"),
            OperationDecl::new("CheckpointQuiz", "submitQuizAnswer"),
            OperationDecl::new("CheckpointQuiz", "getQuizContext"),
            OperationDecl::new("CheckpointQuiz", "createQuizFromPDF"),
            OperationDecl::new("CheckpointQuiz", "_getQuiz"),
            OperationDecl::new("CheckpointQuiz", "_getQuizAttempts"),
            OperationDecl::new("CheckpointQuiz", "_getUserAttempts"),
            OperationDecl::new("FocusTimer", "start"),
            OperationDecl::new("FocusTimer", "pause"),
            OperationDecl::new("FocusTimer", "resume"),
            OperationDecl::new("FocusTimer", "expire"),
            OperationDecl::new("FocusTimer", "_getTimer"),
            OperationDecl::new("FocusTimer", "_getActiveTimers"),
            OperationDecl::new("FocusTimer", "_getTimersByPhase"),
            OperationDecl::new("ReadingProgress", "initializeProgress"),
            OperationDecl::new("ReadingProgress", "updateProgress"),
            OperationDecl::new("ReadingProgress", "triggerQuiz"),
            OperationDecl::new("ReadingProgress", "triggerAnnotation"),
            OperationDecl::new("ReadingProgress", "recordQuizTriggered"),
            OperationDecl::new("ReadingProgress", "recordAnnotationTriggered"),
            OperationDecl::new("ReadingProgress", "pauseReading"),
            OperationDecl::new("ReadingProgress", "resumeReading"),
            OperationDecl::new("ReadingProgress", "_getReadingSession"),
            OperationDecl::new("ReadingProgress", "_getUserSessions"),
            OperationDecl::new("ReadingProgress", "_getBookSessions"),
            OperationDecl::new("ReadingProgress", "_getActiveSessions"),
        ]
    }

    fn invoke_action(&self, concept: &str, op: &str, input: &FieldMap) -> Result<ActionOutcome> {
        match (concept, op) {
            ("UserAuth", "register") => act(input, |i: user_auth::Credentials| {
                self.user_auth.register(i)
            }),
            ("UserAuth", "login") => act(input, |i: user_auth::Credentials| self.user_auth.login(i)),
            ("Library", "prepareUpload") => act(input, |i: library::PrepareUploadInput| {
                self.library.prepare_upload(i)
            }),
            ("Library", "addBook") => {
                act(input, |i: library::AddBookInput| self.library.add_book(i))
            }
            ("Library", "getBook") => act(input, |i: library::BookRef| self.library.get_book(i)),
            ("Library", "listBooks") => {
                act(input, |i: library::OwnerRef| self.library.list_books(i))
            }
            ("Library", "removeBook") => {
                act(input, |i: library::OwnedBookRef| self.library.remove_book(i))
            }
            ("Library", "cleanupFailedUpload") => act(input, |i: library::CleanupInput| {
                self.library.cleanup_failed_upload(i)
            }),
            ("Library", "getViewUrl") => {
                act(input, |i: library::ViewUrlInput| self.library.get_view_url(i))
            }
            ("Annotate", "saveAnnotation") => act(input, |i: annotate::SaveAnnotationInput| {
                self.annotate.save_annotation(i)
            }),
            ("CheckpointQuiz", "createQuiz") => act(input, |i: checkpoint_quiz::CreateQuizInput| {
                self.checkpoint_quiz.create_quiz(i)
            }),
            ("CheckpointQuiz", "submitQuizAnswer") => {
                act(input, |i: checkpoint_quiz::SubmitAnswerInput| {
                    self.checkpoint_quiz.submit_quiz_answer(i)
                })
            }
            ("CheckpointQuiz", "getQuizContext") => {
                act(input, |i: checkpoint_quiz::QuizContextInput| {
                    self.checkpoint_quiz.get_quiz_context(i)
                })
            }
            ("CheckpointQuiz", "createQuizFromPDF") => {
                act(input, |i: checkpoint_quiz::QuizContextInput| {
                    self.checkpoint_quiz.create_quiz_from_pdf(i)
                })
            }
            ("FocusTimer", "start") => {
                act(input, |i: focus_timer::StartInput| self.focus_timer.start(i))
            }
            ("FocusTimer", "pause") => {
                act(input, |i: focus_timer::TimerRef| self.focus_timer.pause(i))
            }
            ("FocusTimer", "resume") => {
                act(input, |i: focus_timer::TimerRef| self.focus_timer.resume(i))
            }
            ("FocusTimer", "expire") => {
                act(input, |i: focus_timer::TimerRef| self.focus_timer.expire(i))
            }
            ("ReadingProgress", "initializeProgress") => {
                act(input, |i: reading_progress::InitializeInput| {
                    self.reading_progress.initialize_progress(i)
                })
            }
            ("ReadingProgress", "updateProgress") => {
                act(input, |i: reading_progress::UpdateProgressInput| {
                    self.reading_progress.update_progress(i)
                })
            }
            ("ReadingProgress", "triggerQuiz") => act(input, |i: reading_progress::SessionRef| {
                self.reading_progress.trigger_quiz(i)
            }),
            ("ReadingProgress", "triggerAnnotation") => {
                act(input, |i: reading_progress::SessionRef| {
                    self.reading_progress.trigger_annotation(i)
                })
            }
            ("ReadingProgress", "recordQuizTriggered") => {
                act(input, |i: reading_progress::SessionRef| {
                    self.reading_progress.record_quiz_triggered(i)
                })
            }
            ("ReadingProgress", "recordAnnotationTriggered") => {
                act(input, |i: reading_progress::SessionRef| {
                    self.reading_progress.record_annotation_triggered(i)
                })
            }
            ("ReadingProgress", "pauseReading") => act(input, |i: reading_progress::SessionRef| {
                self.reading_progress.pause_reading(i)
            }),
            ("ReadingProgress", "resumeReading") => {
                act(input, |i: reading_progress::SessionRef| {
                    self.reading_progress.resume_reading(i)
                })
            }
            _ => Err(EngineError::UnknownOperation {
                concept: concept.to_string(),
                op: op.to_string(),
            }),
        }
    }

    fn invoke_query(&self, concept: &str, op: &str, input: &FieldMap) -> Result<Value> {
        match (concept, op) {
            ("UserAuth", "_getUser") => to_json(self.user_auth.user(query_input(concept, op, input)?)?),
            ("UserAuth", "_getUserByEmail") => {
                to_json(self.user_auth.user_by_email(query_input(concept, op, input)?)?)
            }
            ("UserAuth", "_getAllUsers") => to_json(self.user_auth.all_users()?),
            ("Library", "_getBook") => to_json(self.library.book(query_input(concept, op, input)?)?),
            ("Library", "_getUserBooks") => {
                to_json(self.library.user_books(query_input(concept, op, input)?)?)
            }
            ("Library", "_getAllBooks") => to_json(self.library.all_books()?),
            ("Annotate", "_getUserAnnotations") => {
                to_json(self.annotate.user_annotations(query_input(concept, op, input)?)?)
            }
            ("Annotate", "_getAllUserAnnotations") => {
                to_json(self.annotate.all_user_annotations(query_input(concept, op, input)?)?)
            }
            ("Annotate", "_getAnnotationsForBook") => {
                to_json(self.annotate.annotations_for_book(query_input(concept, op, input)?)?)
            }
            ("CheckpointQuiz", "_getQuiz") => {
                to_json(self.checkpoint_quiz.quiz(query_input(concept, op, input)?)?)
            }
            ("CheckpointQuiz", "_getQuizAttempts") => {
                to_json(self.checkpoint_quiz.quiz_attempts(query_input(concept, op, input)?)?)
            }
            ("CheckpointQuiz", "_getUserAttempts") => {
                to_json(self.checkpoint_quiz.user_attempts(query_input(concept, op, input)?)?)
            }
            ("FocusTimer", "_getTimer") => {
                to_json(self.focus_timer.get_timer(query_input(concept, op, input)?)?)
            }
            ("FocusTimer", "_getActiveTimers") => to_json(self.focus_timer.active_timers()?),
            ("FocusTimer", "_getTimersByPhase") => {
                to_json(self.focus_timer.timers_by_phase(query_input(concept, op, input)?)?)
            }
            ("ReadingProgress", "_getReadingSession") => {
                to_json(self.reading_progress.reading_session(query_input(concept, op, input)?)?)
            }
            ("ReadingProgress", "_getUserSessions") => {
                to_json(self.reading_progress.user_sessions(query_input(concept, op, input)?)?)
            }
            ("ReadingProgress", "_getBookSessions") => {
                to_json(self.reading_progress.book_sessions(query_input(concept, op, input)?)?)
            }
            ("ReadingProgress", "_getActiveSessions") => {
                to_json(self.reading_progress.active_sessions()?)
            }
            _ => Err(EngineError::UnknownOperation {
                concept: concept.to_string(),
                op: op.to_string(),
            }),
        }
    }
}

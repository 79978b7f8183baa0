//! Persisted concepts.
//!
//! Each concept owns its own collections in the [`Store`](crate::store::Store)
//! and never reads another concept's state, with one documented exception:
//! CheckpointQuiz reads book records when building quiz context. Actions
//! return [`ActionOutcome`](crate::outcome::ActionOutcome), folding domain
//! rejections into its `Error` variant; queries return typed documents and
//! only fail on infrastructure errors.

pub mod annotate;
pub mod checkpoint_quiz;
pub mod focus_timer;
pub mod library;
pub mod reading_progress;
pub mod user_auth;

pub use annotate::Annotate;
pub use checkpoint_quiz::CheckpointQuiz;
pub use focus_timer::FocusTimer;
pub use library::Library;
pub use reading_progress::ReadingProgress;
pub use user_auth::UserAuth;

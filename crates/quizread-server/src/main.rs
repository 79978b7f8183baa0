use std::path::PathBuf;

use clap::Parser;
use quizread_core::Store;
use quizread_server::state::{AppState, Services};

#[derive(Parser)]
#[command(name = "quizread-server", version, about = "QuizRead API server")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8000, env = "PORT")]
    port: u16,

    /// Path to the redb database file
    #[arg(long, default_value = "quizread.redb", env = "QUIZREAD_DB")]
    db: PathBuf,

    /// Root directory for stored book files
    #[arg(long, default_value = "objects", env = "QUIZREAD_OBJECTS")]
    objects_root: PathBuf,

    /// Public base URL embedded in signed object links
    #[arg(long, default_value = "http://localhost:8000", env = "QUIZREAD_BASE_URL")]
    base_url: String,

    /// Secret used to sign object URLs
    #[arg(long, env = "QUIZREAD_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: String,

    /// Gemini API key for quiz generation
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let store = Store::open(&cli.db)?;
    let services = Services::local(
        cli.objects_root,
        cli.base_url,
        cli.signing_secret.as_bytes(),
        cli.gemini_api_key,
    );
    let state = AppState::new(store, services)?;

    quizread_server::serve(state, cli.port).await
}

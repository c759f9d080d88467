//! Courseflow Server
//!
//! Axum server exposing the dispatch engine over a small HTTP API, plus a
//! one-shot CLI mode for driving a single dispatch cycle from the terminal.

use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use courseflow_core::engine::{Engine, TurnOutcome};
use courseflow_core::error::CoreError;
use courseflow_core::models::GeminiClient;
use courseflow_core::skills::builtin_catalog;
use courseflow_core::state::{FileStore, SqliteStore, StateStore};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct AppState {
    engine: Engine,
    outputs_dir: PathBuf,
}

type SharedState = Arc<AppState>;

#[derive(Parser)]
#[command(author, version, about = "Courseflow - dependency-gated course production")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,

    /// Session state file
    #[arg(long, default_value = "state.json", global = true)]
    state_path: PathBuf,

    /// Directory for generated artifacts
    #[arg(long, default_value = "outputs", global = true)]
    outputs_dir: PathBuf,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the HTTP server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Run one dispatch cycle and print the outcome as JSON
    Dispatch {
        /// The user message; read from stdin when omitted
        #[arg(short, long)]
        text: Option<String>,
    },
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::UnknownSkill(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn chat(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let outcome = state.engine.handle_message(&req.message).await?;
    Ok(Json(outcome))
}

async fn bus_state(State(state): State<SharedState>) -> Json<courseflow_core::state::BusState> {
    Json(state.engine.state().await)
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("md") | Some("txt") | Some("log") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Serve a generated artifact by its file name. Path segments are rejected so
/// requests cannot escape the outputs directory.
async fn output_file(
    State(state): State<SharedState>,
    AxumPath(name): AxumPath<String>,
) -> Response {
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.outputs_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&name))],
            bytes,
        )
            .into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `.db`/`.sqlite` state paths get the SQLite backend, everything else the
/// plain JSON document store.
fn open_store(state_path: &std::path::Path) -> anyhow::Result<Box<dyn StateStore>> {
    match state_path.extension().and_then(|e| e.to_str()) {
        Some("db") | Some("sqlite") => Ok(Box::new(SqliteStore::open(state_path)?)),
        _ => Ok(Box::new(FileStore::new(state_path))),
    }
}

fn build_engine(args: &Args) -> anyhow::Result<Engine> {
    let llm = Arc::new(GeminiClient::from_env()?);
    let engine = Engine::new(
        builtin_catalog()?,
        open_store(&args.state_path)?,
        llm,
        &args.outputs_dir,
    )?;
    Ok(engine)
}

async fn run_server(args: Args, port: u16) -> anyhow::Result<()> {
    let outputs_dir = args.outputs_dir.clone();
    let state: SharedState = Arc::new(AppState {
        engine: build_engine(&args)?,
        outputs_dir,
    });

    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/state", get(bus_state))
        .route("/outputs/:name", get(output_file))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, "courseflow server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_dispatch(args: Args, text: Option<String>) -> anyhow::Result<()> {
    let message = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let engine = build_engine(&args)?;
    let outcome = engine.handle_message(message.trim()).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Dispatch { ref text }) => {
            let text = text.clone();
            run_dispatch(args, text).await
        }
        Some(CliCommand::Serve { port }) => run_server(args, port).await,
        None => run_server(args, 3000).await,
    }
}

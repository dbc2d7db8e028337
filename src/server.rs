//! Process wiring and the HTTP chat front end.
//!
//! [`setup_driver`] builds the agent side (embedding provider, indexes,
//! tools, model). [`serve_http`] exposes the UI side of the exchange over
//! axum: `POST /chat` submits a message and streams the assistant's reply a
//! character at a time. [`serve_all`] runs both in one process.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::agent::Agent;
use crate::config::EdutorConfig;
use crate::driver::TurnDriver;
use crate::embedding;
use crate::index::IndexSet;
use crate::llm;
use crate::mailbox::{self, Exchange};
use crate::tools::ContentTools;

/// Build the agent-side turn driver over `exchange`.
pub fn setup_driver(config: &EdutorConfig, exchange: Arc<Exchange>) -> Result<TurnDriver> {
    let provider = embedding::create_provider(&config.embedding)?;
    let embedding: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!("embedding provider ready");

    let indexes = Arc::new(IndexSet::open(config, embedding));
    let tools = Arc::new(ContentTools::from_config(
        config,
        indexes,
        Arc::clone(&exchange),
    ));

    let model: Arc<dyn llm::ChatModel> = Arc::from(llm::create_model(&config.llm)?);
    tracing::info!(model = model.name(), "language model ready");

    let agent = Agent::new(model, tools, &config.agent);
    Ok(TurnDriver::new(
        exchange,
        agent,
        config.agent.failure_message.clone(),
    ))
}

/// Shared state of the HTTP front end.
pub struct AppState {
    exchange: Arc<Exchange>,
    stream_delay: Duration,
    // one conversation: a submission waits for the previous reply
    turn: Mutex<()>,
}

impl AppState {
    pub fn new(exchange: Arc<Exchange>, stream_delay: Duration) -> Self {
        Self {
            exchange,
            stream_delay,
            turn: Mutex::new(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    user_messages: usize,
    assistant_messages: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    if req.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message must not be empty".into()));
    }

    let reply = {
        let _turn = state.turn.lock().await;
        state.exchange.submit(&req.message).await
    }
    .map_err(|e| {
        tracing::error!(error = %e, "chat submission failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let delay = state.stream_delay;
    let pieces: Vec<String> = mailbox::reveal(&reply).map(str::to_owned).collect();
    let stream = futures_util::stream::iter(pieces).then(move |piece| async move {
        tokio::time::sleep(delay).await;
        Ok::<_, Infallible>(piece)
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Health>, (StatusCode, String)> {
    let internal = |e: anyhow::Error| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    Ok(Json(Health {
        status: "ok",
        user_messages: state.exchange.user().len().map_err(internal)?,
        assistant_messages: state.exchange.assistant().len().map_err(internal)?,
    }))
}

/// Serve the chat front end until ctrl-c.
pub async fn serve_http(config: &EdutorConfig, exchange: Arc<Exchange>) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(exchange, config.stream_delay()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "chat UI listening at http://{bind_addr}/chat");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down chat UI");
        })
        .await?;

    Ok(())
}

/// Agent driver and chat front end in one process, sharing one exchange.
pub async fn serve_all(config: EdutorConfig) -> Result<()> {
    let exchange = Arc::new(Exchange::open(&config)?);
    let driver = setup_driver(&config, Arc::clone(&exchange))?;

    let driver_task = tokio::spawn(driver.run());
    let result = serve_http(&config, exchange).await;
    driver_task.abort();
    result
}

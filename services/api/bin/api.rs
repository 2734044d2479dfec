//! Main Entrypoint for the Coding Coach API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Restoring stored courses from the data directory.
//! 3. Initializing the model client and the tutor built on top of it.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use coach_api::{
    config::Config, router::create_router, session::Learner, state::AppState,
    store::SessionStore,
};
use coach_core::{
    llm_client::{OpenAICompatibleGenerator, TextClient},
    prompts::PromptBook,
    tutor::Tutor,
};
use std::{collections::HashMap, fs, net::SocketAddr, path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Waits for `Ctrl+C`, then cancels in-flight generations.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
    info!("Received shutdown signal. Shutting down gracefully...");
    shutdown.cancel();
}

/// Reads every `*.md` file in the directory, keyed by file stem.
fn load_prompts(prompts_path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    let entries = fs::read_dir(prompts_path)
        .with_context(|| format!("Failed to read prompts from {}", prompts_path.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Restore Stored Courses ---
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
    let store = SessionStore::new(config.data_dir.clone());
    let learner = Learner::restore(&store).await?;

    // --- 4. Initialize Shared Services ---
    let mut prompts = PromptBook::default();
    if let Some(path) = &config.prompts_path {
        let overrides = load_prompts(path)?;
        info!(count = overrides.len(), path = %path.display(), "Loaded prompt overrides");
        prompts = prompts.with_overrides(overrides);
    }

    info!(provider = ?config.provider, "Using model provider.");
    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.api_key)
        .with_api_base(config.provider.api_base());
    let generator = Arc::new(OpenAICompatibleGenerator::new(
        openai_config,
        config.chat_model.clone(),
    ));
    let client = TextClient::new(generator, config.retry_policy());
    let tutor = Tutor::new(client, Arc::new(prompts), config.max_plan_turns);

    let app_state = Arc::new(AppState::new(store, tutor, learner));
    let shutdown = app_state.shutdown.clone();

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        data_dir = %config.data_dir.display(),
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown))
    .await?;

    info!("Server has shut down.");
    Ok(())
}

// Main entry point for Prompt Firewall

use prompt_firewall::api::{create_router, AppState};
use prompt_firewall::config::Config;
use prompt_firewall::engine::anomaly::AnomalyScorer;
use prompt_firewall::engine::firewall::PromptFirewall;
use prompt_firewall::loader::policy_loader::PolicyLoader;
use prompt_firewall::recognizer::RegexEntityRecognizer;
use prompt_firewall::state::{CachedPolicyStore, InMemoryHistoryStore, YamlPolicyStore};

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load and validate configuration first (before any logging)
    let config = Config::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!(e)
    })?;

    // 2. Initialize tracing subscriber with config values
    // Must be done only once - tracing panics if init() is called multiple times
    init_tracing(&config)?;

    info!("Starting Prompt Firewall");

    info!(
        bind_address = %config.bind_address,
        port = config.port,
        "Configuration loaded"
    );

    // 3. Load tenant policies
    let policy_loader = PolicyLoader::from_file(&config.policies_yaml_path).map_err(|e| {
        error!(error = %e, path = ?config.policies_yaml_path, "Failed to load policies");
        anyhow::anyhow!(e)
    })?;

    let policy_store = Arc::new(CachedPolicyStore::new(Arc::new(YamlPolicyStore::new(
        policy_loader,
    ))));

    info!("Policy store initialized");

    // 4. Initialize entity recognizer and firewall pipeline
    let recognizer = Arc::new(RegexEntityRecognizer::new().map_err(|e| {
        error!(error = %e, "Failed to build entity recognizer");
        anyhow::anyhow!(e)
    })?);

    let firewall = Arc::new(
        PromptFirewall::new(recognizer, config.entity_confidence_threshold).map_err(|e| {
            error!(error = %e, "Failed to build firewall pipeline");
            anyhow::anyhow!(e)
        })?,
    );

    info!("Firewall pipeline initialized");

    // 5. Initialize history store and anomaly scorer
    let history_store = Arc::new(InMemoryHistoryStore::new());
    let scorer = Arc::new(AnomalyScorer::new(
        history_store.clone(),
        config.history_window_days,
    ));

    info!("Anomaly scorer initialized");

    // 6. Create AppState and router
    let app_state = AppState {
        firewall,
        scorer,
        policy_store,
        history_store,
        config: Arc::new(config.clone()),
    };

    let router = create_router(app_state);

    info!("Router created");

    // 7. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        anyhow::anyhow!(e)
    })?;

    info!(addr = %addr, "Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            anyhow::anyhow!(e)
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use plan_builder::chat::{ChatSession, DEFAULT_NAMESPACE, FileThreadStore, HttpTransport};
use plan_builder::cli::Wizard;
use plan_builder::config::{ServerConfig, WizardConfig};
use plan_builder::llm::{LlmBackend, LlmConfig, create_provider};
use plan_builder::onboarding::OnboardingSession;
use plan_builder::projects::HttpProjectApi;
use plan_builder::proxy::{ChatProxy, ProxyState, app_routes};
use plan_builder::store::{Database, LibSqlBackend};

const USAGE: &str = "usage: plan-builder <serve|wizard>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::args().nth(1).as_deref() {
        Some("serve") => serve().await,
        Some("wizard") => wizard().await,
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("reading server configuration")?;

    eprintln!("📋 Plan Builder v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Chat API: http://0.0.0.0:{}/api/chat", config.port);
    eprintln!("   Projects API: http://0.0.0.0:{}/api/projects", config.port);

    let llm = create_provider(&LlmConfig {
        backend: LlmBackend::OpenAi,
        api_key: config.api_key.clone(),
        base_url: config.base_url.clone(),
        model: config.model.clone(),
    })?;

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );

    let chat = ChatProxy::new(Arc::clone(&db), llm, config.limits);
    let app = app_routes(ProxyState::new(db, chat, config.model.clone()));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    tracing::info!(port = config.port, "Plan builder server started");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn wizard() -> anyhow::Result<()> {
    let config = WizardConfig::from_env();
    std::fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("creating {}", config.state_dir.display()))?;

    // Logs go to a file so they don't interleave with the prompts.
    let appender = tracing_appender::rolling::never(&config.state_dir, "wizard.log");
    let (writer, _log_guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let transport = Arc::new(HttpTransport::new(&config.api_url));
    let store = Arc::new(FileThreadStore::new(config.thread_store_path()));
    let chat = Arc::new(ChatSession::open(transport, store, DEFAULT_NAMESPACE).await);
    let api = Arc::new(HttpProjectApi::new(&config.api_url));
    let session = Arc::new(OnboardingSession::new(api, chat));

    tracing::info!(api_url = %config.api_url, "Wizard started");
    let mut wizard = Wizard::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), session);
    wizard.run().await
}

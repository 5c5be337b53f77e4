use anyhow::Context;
use flipshare::sinks::{LogNotifier, SqliteActivityLog, WebhookNotifier};
use flipshare::{api, config::Config, db::init_db, NotificationSink, Orchestrator, Repository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("failed to initialize database at {}", config.database_path))?;
    let repo = Arc::new(Repository::new(pool));

    let notifier: Arc<dyn NotificationSink> = match &config.notify_webhook_url {
        Some(url) => {
            info!(%url, "notifications delivered by webhook");
            Arc::new(WebhookNotifier::new(url.clone(), config.notify_max_elapsed))
        }
        None => {
            info!("NOTIFY_WEBHOOK_URL not set, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };
    let activity = Arc::new(SqliteActivityLog::new(repo.clone()));
    let orchestrator = Arc::new(Orchestrator::new(repo, activity, notifier));

    let app = api::create_router(api::AppState::new(orchestrator));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

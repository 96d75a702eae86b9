use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studydesk::api::router;
use studydesk::config::AppConfig;
use studydesk::notify::{LogNotifier, Notifier, WebhookNotifier};
use studydesk::services::ReminderScheduler;
use studydesk::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studydesk=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => {
            info!("delivering reminders to webhook {}", url);
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => Arc::new(LogNotifier),
    };

    let scheduler = ReminderScheduler::new(pool.clone(), notifier.clone(), config.reminder_poll_secs);
    tokio::spawn(scheduler.start());

    let state = AppState {
        db: pool.clone(),
        notifier,
        default_requirement: config.default_requirement,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

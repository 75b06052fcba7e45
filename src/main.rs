use std::sync::Arc;

use dotenv::dotenv;
use sqlx::PgPool;

mod config;
mod credentials;
mod error;
mod model;
mod notify;
mod routes;
mod services;
mod store;

use config::Config;
use notify::{DisabledSender, NotificationSender, SmtpMailer};
use routes::app_router;
use services::{accounts::AccountService, wastes::ListingService};
use store::postgres::PgStore;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

fn build_sender(config: &Config) -> anyhow::Result<Arc<dyn NotificationSender>> {
    match &config.mail {
        Some(mail) => {
            let mailer = SmtpMailer::new(&config.smtp_host, &mail.user, &mail.pass, &config.sender_name)?;
            Ok(Arc::new(mailer))
        }
        None => {
            tracing::warn!("⚠️ EMAIL_USER/EMAIL_PASS not set, company notifications will fail");
            Ok(Arc::new(DisabledSender))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    // Connect to PostgreSQL
    let pool = PgPool::connect(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool.clone()));
    store.ensure_schema().await?;
    tracing::info!("✅ Database connected");

    let sender = build_sender(&config)?;
    let accounts = AccountService::new(store.clone(), config.bcrypt_cost);
    let listings = ListingService::new(store.clone(), store, sender);

    let app = app_router(accounts, listings);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}

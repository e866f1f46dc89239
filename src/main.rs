use sqlx::postgres::PgPoolOptions;
use talentboard::app;
use talentboard::utils::config::{AppEnv, Config};
use talentboard::utils::constant::DB_ACQUIRE_TIMEOUT;
use tokio::net::TcpListener;
use tracing::info;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(app_env: AppEnv) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "talentboard=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match app_env {
        AppEnv::Production => registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                "talentboard".into(),
                std::io::stdout,
            ))
            .init(),
        AppEnv::Development => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing(AppEnv::from_env());

    let config = Config::from_env()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations applied");

    let app = app(db_pool, &config);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Server starting at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

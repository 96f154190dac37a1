use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait};
use settings::{Database, DatabaseKind};

mod settings;

/// Keeps the only in-memory connection alive for the process lifetime.
const MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(365 * 24 * 3600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "sams={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = match connect_database(&settings.database).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };

    let engine = engine::Engine::builder()
        .database(db)
        .token_secret(&settings.server.token_secret)
        .build()
        .await?;

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return Err(err.into());
        }
    };

    let options = server::ServerOptions {
        allowed_origin: settings.server.allowed_origin,
    };
    server::run_with_listener(engine, options, listener).await?;

    Ok(())
}

async fn connect_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let mut options = match config.kind {
        DatabaseKind::Memory => {
            let mut options = ConnectOptions::new("sqlite::memory:");
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(MEMORY_CONNECTION_LIFETIME)
                .max_lifetime(MEMORY_CONNECTION_LIFETIME);
            options
        }
        DatabaseKind::Sqlite => {
            let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", config.path));
            options
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs));
            options
        }
    };
    options
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    if config.kind == DatabaseKind::Sqlite {
        // Readers keep going while one submission holds the write lock.
        database
            .execute_unprepared("PRAGMA journal_mode = WAL")
            .await?;
    }
    Migrator::up(&database, None).await?;
    tracing::info!(kind = ?config.kind, "database ready");
    Ok(database)
}

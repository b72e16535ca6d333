use std::net::SocketAddr;

use axum::middleware;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tourism_backend::{
    config::Config,
    db,
    entities::user,
    middleware::rate_limit::{create_global_governor, log_request},
    routes,
    utils::{password::hash_password, time::now},
    AppError, AppResult, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourism_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> AppResult<()> {
    tracing::info!("Starting server at {}", config.server_addr());

    let db = db::connect(&config).await?;
    tracing::info!("Connected to database");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations complete");

    seed_admin(&db, &config).await?;

    let governor = create_global_governor(config.rate_limit_per_minute)?;
    let state = AppState::new(db, config.clone());

    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(governor)
        .layer(middleware::from_fn(log_request));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|_| AppError::Internal(format!("Invalid address {}", config.server_addr())))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}

/// Creates the staff account from `ADMIN_EMAIL`/`ADMIN_PASSWORD` unless it
/// already exists.
async fn seed_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    let Some(password) = config.admin_password.as_deref() else {
        tracing::info!("ADMIN_PASSWORD not set, skipping admin seed");
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(config.admin_email.as_str()))
        .one(db)
        .await?;

    if existing.is_none() {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(config.admin_email.clone()),
            password_hash: Set(hash_password(password)?),
            name: Set("Admin".to_string()),
            is_staff: Set(true),
            is_active: Set(true),
            created_at: Set(now()),
        }
        .insert(db)
        .await?;
        tracing::info!("Admin account created: {}", config.admin_email);
    }

    Ok(())
}

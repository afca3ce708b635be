use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use cache_revalidation::RevalidationPublisher;
use chrono::Utc;
use db_pool::{create_pool, DbConfig};
use redis::aio::ConnectionManager;
use redis::RedisError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thread_service::handlers;
use thread_service::Config;
use tokio::sync::Mutex;
use tracing::info;
use tracing_actix_web::TracingLogger;

const SERVICE_NAME: &str = "thread-service";

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
    redis_manager: Arc<Mutex<ConnectionManager>>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    fn new(
        db_pool: sqlx::Pool<sqlx::Postgres>,
        redis_manager: Arc<Mutex<ConnectionManager>>,
    ) -> Self {
        Self {
            db_pool,
            redis_manager,
        }
    }

    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }

    async fn check_redis(&self) -> Result<(), RedisError> {
        let mut conn = self.redis_manager.lock().await;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(RedisError::from((
                redis::ErrorKind::ResponseError,
                "unexpected PING response",
            )))
        }
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": SERVICE_NAME
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    match state.check_postgres().await {
        Ok(_) => {
            checks.insert(
                "postgres".to_string(),
                ComponentCheck {
                    status: ComponentStatus::Healthy,
                    message: "connected".to_string(),
                },
            );
        }
        Err(e) => {
            ready = false;
            checks.insert(
                "postgres".to_string(),
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: e.to_string(),
                },
            );
        }
    }

    match state.check_redis().await {
        Ok(_) => {
            checks.insert(
                "redis".to_string(),
                ComponentCheck {
                    status: ComponentStatus::Healthy,
                    message: "connected".to_string(),
                },
            );
        }
        Err(e) => {
            ready = false;
            checks.insert(
                "redis".to_string(),
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: e.to_string(),
                },
            );
        }
    }

    let response = ReadinessResponse {
        ready,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting {}", SERVICE_NAME);

    // Load configuration
    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, port={}",
        config.app.env, config.app.port
    );

    // Initialize database pool
    let db_config = DbConfig {
        service_name: SERVICE_NAME.to_string(),
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DbConfig::default()
    };
    db_config.log_config();

    let pg_pool = create_pool(db_config)
        .await
        .context("Failed to create database pool")?;

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    // Initialize Redis connection for health checks
    let redis_client =
        redis::Client::open(config.cache.url.as_str()).context("Failed to create Redis client")?;
    let redis_manager = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    // Initialize revalidation publisher
    let revalidator = Arc::new(
        RevalidationPublisher::new(&config.cache.url, SERVICE_NAME.to_string())
            .await
            .map_err(anyhow::Error::from)
            .context("Failed to create revalidation publisher")?,
    );
    info!("Revalidation publisher initialized");

    let health_state = web::Data::new(HealthState::new(
        pg_pool.clone(),
        Arc::new(Mutex::new(redis_manager)),
    ));

    let bind_addr = (config.app.host.clone(), config.app.port);
    info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(pg_pool.clone()))
            .app_data(web::Data::new(revalidator.clone()))
            .app_data(health_state.clone())
            .route("/health", web::get().to(health_summary))
            .route("/ready", web::get().to(readiness_summary))
            .service(
                web::scope("/threads")
                    .route("", web::post().to(handlers::create_thread))
                    .route("", web::get().to(handlers::list_threads))
                    .route("/{id}", web::get().to(handlers::get_thread))
                    .route("/{id}/comments", web::post().to(handlers::add_comment)),
            )
            .route(
                "/users/{id}/threads",
                web::get().to(handlers::get_user_threads),
            )
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}

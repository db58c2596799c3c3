use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;
use thiserror::Error;
use url::Url;

use crate::config::DatabaseConfig;

/// Tables the service cannot run without; checked by the health endpoint
const REQUIRED_TABLES: [&str; 4] = ["users", "recipes", "short_links", "shopping_cart"];

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Failed to create database: {0}")]
    DatabaseCreationFailed(String),
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// Shared Postgres pool handed to every repository
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DBHealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseHealth {
    pub status: DBHealthStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    /// Required tables absent from the schema, i.e. migrations not applied
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        debug!(
            "Connecting to Postgres: max_conn={}, min_conn={}, timeout={}s",
            config.max_connections, config.min_connections, config.connect_timeout_seconds
        );

        if !config.skip_db_exists_check {
            prepare_database(config).await?;
        }

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                DatabaseError::ConnectionError(e)
            })?;
        info!("Connected to database");

        if config.use_migrations {
            info!("Applying recipe schema migrations");
            sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
                warn!("Database migration error: {}", e);
                DatabaseError::MigrationError(e.to_string())
            })?;
            info!("Schema is up to date");
        }

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips to the server and verifies the recipe schema is in place
    pub async fn health_check(&self) -> DatabaseHealth {
        let start = Instant::now();
        let probe = sqlx::query_scalar::<_, String>("SELECT current_setting('server_version')")
            .fetch_one(&self.pool)
            .await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let server_version = match probe {
            Ok(version) => version,
            Err(e) => {
                return DatabaseHealth {
                    status: DBHealthStatus::Unhealthy,
                    response_time_ms,
                    server_version: None,
                    missing_tables: Vec::new(),
                    message: Some(format!("Database query failed: {}", e)),
                }
            }
        };

        let missing_tables = sqlx::query_scalar::<_, String>(
            "SELECT t FROM UNNEST($1::TEXT[]) AS t WHERE to_regclass(t) IS NULL",
        )
        .bind(REQUIRED_TABLES.map(str::to_string).to_vec())
        .fetch_all(&self.pool)
        .await;

        match missing_tables {
            Ok(missing) if missing.is_empty() => DatabaseHealth {
                status: DBHealthStatus::Healthy,
                response_time_ms,
                server_version: Some(server_version),
                missing_tables: missing,
                message: None,
            },
            Ok(missing) => DatabaseHealth {
                status: DBHealthStatus::Unhealthy,
                response_time_ms,
                server_version: Some(server_version),
                missing_tables: missing,
                message: Some("Schema migrations have not been applied".to_string()),
            },
            Err(e) => DatabaseHealth {
                status: DBHealthStatus::Unhealthy,
                response_time_ms,
                server_version: Some(server_version),
                missing_tables: Vec::new(),
                message: Some(format!("Schema check failed: {}", e)),
            },
        }
    }

    pub async fn shutdown(&self) {
        info!(
            "Closing database pool ({} connections, {} idle)",
            self.pool.size(),
            self.pool.num_idle()
        );
        self.pool.close().await;
        info!("Database pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
}

// Creates the target database when it is missing and creation is allowed
async fn prepare_database(config: &DatabaseConfig) -> DbResult<()> {
    let name = database_name(&config.url).ok_or_else(|| {
        DatabaseError::DatabaseNotFound("DATABASE_URL does not name a database".to_string())
    })?;

    if Postgres::database_exists(&config.url).await? {
        debug!("Database '{}' exists", name);
        return Ok(());
    }

    if !config.create_database_if_missing {
        return Err(DatabaseError::DatabaseNotFound(format!(
            "Database '{}' does not exist",
            name
        )));
    }

    info!("Creating database '{}'", name);
    Postgres::create_database(&config.url)
        .await
        .map_err(|e| DatabaseError::DatabaseCreationFailed(format!("'{}': {}", name, e)))
}

/// Database name from a `postgres://` connection string
fn database_name(connection: &str) -> Option<String> {
    let parsed = Url::parse(connection).ok()?;
    let name = parsed.path().trim_start_matches('/');
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name() {
        assert_eq!(
            database_name("postgres://u:p@localhost:5432/recipe_share"),
            Some("recipe_share".to_string())
        );
        assert_eq!(
            database_name("postgres://u:p@localhost/recipes?sslmode=disable"),
            Some("recipes".to_string())
        );
        assert_eq!(database_name("postgres://localhost"), None);
        assert_eq!(database_name("postgres://localhost/"), None);
        assert_eq!(database_name("not a url"), None);
    }

    #[test]
    fn test_pool_min_never_exceeds_max() {
        let config = DatabaseConfig {
            url: "postgres://localhost/recipe_share".to_string(),
            max_connections: 2,
            min_connections: 5,
            use_migrations: false,
            skip_db_exists_check: true,
            connect_timeout_seconds: 1,
            create_database_if_missing: false,
        };
        let options = pool_options(&config);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_max_connections(), 2);
    }

    #[test]
    fn test_health_omits_empty_fields() {
        let health = DatabaseHealth {
            status: DBHealthStatus::Healthy,
            response_time_ms: 3,
            server_version: Some("16.2".to_string()),
            missing_tables: Vec::new(),
            message: None,
        };
        let value = serde_json::to_value(&health).unwrap();
        assert_eq!(value["status"], "healthy");
        assert!(value.get("missing_tables").is_none());
        assert!(value.get("message").is_none());
    }
}

use std::time::Instant;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};
use env_logger::Env;
use log::{debug, info};
use tokio::fs;

use crate::{
    config::{Config, CorsConfig, Environment},
    db::Database,
    errors::AppError,
    middleware::RequestLogger,
    routes, services,
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Base64 images make recipe and avatar bodies large
const MAX_JSON_BODY_BYTES: usize = 10 * 1024 * 1024;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    // Configure log level based on environment and config
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info,sqlx=warn".to_string(),
        Environment::Production => "info,actix_web=warn,sqlx=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

fn build_cors(config: &CorsConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_DISPOSITION])
        .max_age(3600);

    config
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

// Malformed bodies, queries and path segments become our JSON 400 responses
fn extractor_configs() -> (web::JsonConfig, web::QueryConfig, web::PathConfig) {
    let json = web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());
    let query = web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());
    let path = web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());
    (json, query, path)
}

fn access_log_format(verbose: bool) -> &'static str {
    if verbose {
        "%a \"%r\" %s %b %T"
    } else {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}o"
    }
}

pub async fn server() -> AppResult<()> {
    let config = Config::load()?;
    setup_logging(&config)?;
    let started_at = Instant::now();

    info!(
        "Starting {} v{} ({:?})",
        config.app.name, config.app.version, config.app.environment
    );
    debug!("Full configuration: {:?}", config);

    let db = Database::connect(&config.db).await?;

    // Uploaded images land here before the first request can reference them
    fs::create_dir_all(&config.media.root).await?;
    info!("Media root: {}", config.media.root.display());

    let verbose = config.app.environment != Environment::Production;
    let state = web::Data::new(AppState {
        name: config.app.name.clone(),
        version: config.app.version.clone(),
        started_at,
        db: db.clone(),
    });
    let shared_config = web::Data::new(config.clone());

    info!(
        "Listening on {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    HttpServer::new(move || {
        let (json_config, query_config, path_config) = extractor_configs();
        let service_config = shared_config.clone();
        let service_db = state.db.clone();
        let media_prefix = shared_config.media.url_prefix.clone();

        App::new()
            .app_data(state.clone())
            .app_data(shared_config.clone())
            .app_data(json_config)
            .app_data(query_config)
            .app_data(path_config)
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&shared_config.cors))
            .wrap(RequestLogger::new(verbose))
            .wrap(Logger::new(access_log_format(verbose)))
            .configure(move |cfg| services::register(service_db, &service_config, cfg))
            .configure(routes::configure_routes)
            .configure(move |cfg| routes::configure_media(cfg, &media_prefix))
    })
    .workers(config.server.workers)
    .bind((config.server.host, config.server.port))?
    .run()
    .await?;

    db.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, HttpResponse};
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        status_code: u16,
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let (json_config, _, path_config) = extractor_configs();
        let app = test::init_service(
            App::new()
                .app_data(json_config)
                .app_data(path_config)
                .wrap(NormalizePath::trim())
                .route(
                    "/items",
                    web::post().to(|_: web::Json<Payload>| async { HttpResponse::Ok().finish() }),
                )
                .route(
                    "/items/{id}",
                    web::get().to(|_: web::Path<i64>| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/items/")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{\"name\":")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.status_code, 400);

        let req = test::TestRequest::get().uri("/items/abc").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

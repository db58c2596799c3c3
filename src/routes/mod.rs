use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use log::warn;

use crate::db::DBHealthStatus;
use crate::handlers::{media::media_handler, short_links::redirect_handler};
use crate::types::{AppState, HealthStatus, ResponsePayload};

mod api;

async fn index() -> impl Responder {
    HttpResponse::Ok().json(ResponsePayload {
        status: StatusCode::OK.as_u16(),
        message: String::from("Welcome to the recipe share API"),
    })
}

// 503 while the database is unreachable or unmigrated
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let database = data.db.health_check().await;
    let healthy = database.status == DBHealthStatus::Healthy;

    let body = HealthStatus {
        status: String::from(if healthy { "OK" } else { "DEGRADED" }),
        service: data.name.clone(),
        version: data.version.clone(),
        uptime_seconds: data.started_at.elapsed().as_secs(),
        database,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));
    cfg.route("/s/{code}", web::get().to(redirect_handler));
    api::configure(cfg);
}

/// Serves uploads under `prefix`; an empty prefix would shadow every route
pub fn configure_media(cfg: &mut web::ServiceConfig, prefix: &str) {
    if prefix.is_empty() {
        warn!("MEDIA_URL is empty, uploaded files will not be served");
        return;
    }
    cfg.route(&format!("{}/{{path:.*}}", prefix), web::get().to(media_handler));
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};

    use super::*;

    #[actix_web::test]
    async fn test_index() {
        let app = test::init_service(App::new().route("/", web::get().to(index))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: ResponsePayload = test::read_body_json(res).await;
        assert_eq!(body.status, 200);
    }
}

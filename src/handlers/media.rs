use actix_web::{web, HttpResponse, Responder};

use crate::{
    errors::AppError,
    types::Result,
    utils::images::{content_type_for, ImageStore},
};

/// Serves an uploaded image from the media root
pub async fn media_handler(
    path: web::Path<String>,
    store: web::Data<ImageStore>,
) -> Result<impl Responder> {
    let relative = path.into_inner();
    let bytes = store
        .read(&relative)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media file '{}' not found", relative)))?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&relative))
        .body(bytes))
}

use actix_web::HttpRequest;

use crate::config::Config;
use crate::utils::urls::UrlBuilder;

pub mod auth;
pub mod catalogue;
pub mod media;
pub mod recipes;
pub mod short_links;
pub mod users;

/// Absolute URL builder for the current request
pub(crate) fn url_builder(req: &HttpRequest, config: &Config) -> UrlBuilder {
    UrlBuilder::from_request(
        req,
        config.app.public_base_url.as_deref(),
        &config.media.url_prefix,
    )
}

use actix_web::HttpRequest;
use url::Url;

/// Builds absolute links against the public origin of the service
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    media_prefix: String,
}

impl UrlBuilder {
    pub fn new(base: impl Into<String>, media_prefix: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            media_prefix: media_prefix.into(),
        }
    }

    /// Uses `public_base_url` when configured, otherwise the scheme and host of the request
    pub fn from_request(
        req: &HttpRequest,
        public_base_url: Option<&str>,
        media_prefix: &str,
    ) -> Self {
        let base = match public_base_url {
            Some(base) => base.to_string(),
            None => {
                let info = req.connection_info();
                format!("{}://{}", info.scheme(), info.host())
            }
        };
        Self::new(base, media_prefix)
    }

    pub fn absolute(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub fn media(&self, relative: &str) -> String {
        self.absolute(&format!("{}/{}", self.media_prefix, relative))
    }

    pub fn short_link(&self, code: &str) -> String {
        self.absolute(&format!("s/{}/", code))
    }

    pub fn recipe(&self, recipe_path_prefix: &str, recipe_id: i64) -> String {
        self.absolute(&format!("{}/{}/", recipe_path_prefix, recipe_id))
    }

    /// Absolute form of the current request URL, query string included
    pub fn current(&self, req: &HttpRequest) -> String {
        self.absolute(&req.uri().to_string())
    }
}

/// Returns `url` with its `page` parameter set to `page`; page 1 drops the parameter
pub fn with_page(url: &str, page: i64) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    parsed.set_query(None);
    if !kept.is_empty() || page > 1 {
        let mut pairs = parsed.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    Some(parsed.to_string())
}

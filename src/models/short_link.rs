use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Short code owned by exactly one recipe
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ShortLink {
    pub id: i64,
    pub recipe_id: i64,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponseDto {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

// ── Live visit feed payloads ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::short_url::ShortUrl;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub date: DateTime<Utc>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub potential_bot: bool,
}

/// One item of the "visits created" feed.
///
/// `short_url` carries the owning short URL with its authoritative, already
/// updated `visits_count`. Orphan visits (base URL, invalid short code, ...)
/// have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVisit {
    pub short_url: Option<ShortUrl>,
    pub visit: Visit,
}

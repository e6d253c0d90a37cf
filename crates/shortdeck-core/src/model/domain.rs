// ── Domain types ──

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::identity::Identified;

pub use shortdeck_api::DomainRedirects;

/// Health of a domain as seen from the dashboard.
///
/// `Validating` is only entered on a fresh listing; `Valid` and `Invalid`
/// are terminal until the next one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DomainStatus {
    Validating,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub domain: String,
    pub is_default: bool,
    pub redirects: Option<DomainRedirects>,
    pub status: DomainStatus,
}

impl Identified for Domain {
    type Key<'a> = &'a str;

    fn identity(&self) -> Self::Key<'_> {
        &self.domain
    }
}

/// Result of a domains listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainsListing {
    pub domains: Vec<Arc<Domain>>,
    pub default_redirects: Option<DomainRedirects>,
}

/// Redirects of one domain after an edit, as echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDomainRedirects {
    pub domain: String,
    pub redirects: DomainRedirects,
}

/// Outcome of one health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainHealth {
    pub domain: String,
    pub status: DomainStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(DomainStatus::Validating.to_string(), "validating");
        assert_eq!("invalid".parse::<DomainStatus>().unwrap(), DomainStatus::Invalid);
    }
}

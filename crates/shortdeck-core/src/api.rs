// ── Remote API seam ──
//
// The engine only needs these operations from the server. `ShlinkClient`
// implements them over HTTP; tests substitute an in-memory fake.

use async_trait::async_trait;
use url::Url;

use shortdeck_api::{EditDomainRedirectsRequest, ShlinkClient};

use crate::error::CoreError;
use crate::model::{
    DomainRedirects, DomainsListing, EditDomainRedirects, ShortUrl, ShortUrlDraft, ShortUrlEdit,
    ShortUrlIdentifier, ShortUrlsList, ShortUrlsQuery,
};

/// Health of a server as reported by its health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthReport {
    Pass,
    /// Anything but `pass`.
    Fail,
}

#[async_trait]
pub trait ShortenerApi: Send + Sync {
    async fn list_short_urls(&self, query: &ShortUrlsQuery) -> Result<ShortUrlsList, CoreError>;

    /// The full entity is echoed back, including the server-assigned short code.
    async fn create_short_url(&self, draft: &ShortUrlDraft) -> Result<ShortUrl, CoreError>;

    async fn edit_short_url(
        &self,
        id: &ShortUrlIdentifier,
        edit: &ShortUrlEdit,
    ) -> Result<ShortUrl, CoreError>;

    async fn delete_short_url(&self, id: &ShortUrlIdentifier) -> Result<(), CoreError>;

    async fn list_domains(&self) -> Result<DomainsListing, CoreError>;

    async fn edit_domain_redirects(
        &self,
        edit: &EditDomainRedirects,
    ) -> Result<DomainRedirects, CoreError>;

    /// Probe the health endpoint of the server rooted at `base_url`.
    async fn check_health(&self, base_url: &Url) -> Result<HealthReport, CoreError>;
}

#[async_trait]
impl ShortenerApi for ShlinkClient {
    async fn list_short_urls(&self, query: &ShortUrlsQuery) -> Result<ShortUrlsList, CoreError> {
        Ok(ShlinkClient::list_short_urls(self, query).await?.into())
    }

    async fn create_short_url(&self, draft: &ShortUrlDraft) -> Result<ShortUrl, CoreError> {
        Ok(ShlinkClient::create_short_url(self, draft).await?.into())
    }

    async fn edit_short_url(
        &self,
        id: &ShortUrlIdentifier,
        edit: &ShortUrlEdit,
    ) -> Result<ShortUrl, CoreError> {
        Ok(
            ShlinkClient::edit_short_url(self, &id.short_code, id.domain.as_deref(), edit)
                .await?
                .into(),
        )
    }

    async fn delete_short_url(&self, id: &ShortUrlIdentifier) -> Result<(), CoreError> {
        Ok(ShlinkClient::delete_short_url(self, &id.short_code, id.domain.as_deref()).await?)
    }

    async fn list_domains(&self) -> Result<DomainsListing, CoreError> {
        Ok(ShlinkClient::list_domains(self).await?.into())
    }

    async fn edit_domain_redirects(
        &self,
        edit: &EditDomainRedirects,
    ) -> Result<DomainRedirects, CoreError> {
        let request = EditDomainRedirectsRequest {
            domain: edit.domain.clone(),
            redirects: edit.redirects.clone(),
        };
        Ok(ShlinkClient::edit_domain_redirects(self, &request).await?)
    }

    async fn check_health(&self, base_url: &Url) -> Result<HealthReport, CoreError> {
        let health = self.at(base_url.clone()).health().await?;
        Ok(if health.is_pass() {
            HealthReport::Pass
        } else {
            HealthReport::Fail
        })
    }
}

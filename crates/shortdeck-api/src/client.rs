// Hand-crafted async HTTP client for the Shlink REST API (v3).
//
// Base path: {server}/rest/v3/
// Auth: X-Api-Key header
// Errors: RFC 7807 problem details

use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    CreateShortUrlRequest, DomainRedirects, DomainsEnvelope, DomainsPage,
    EditDomainRedirectsRequest, EditShortUrlRequest, HealthResponse, ProblemDetails,
    ShortUrlResponse, ShortUrlsEnvelope, ShortUrlsPage, ShortUrlsQuery,
};

const API_PREFIX: &str = "rest/v3/";
const HEALTH_PATH: &str = "rest/health";

/// Async client for a single Shlink server.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted and
/// carries the `X-Api-Key` default header.
#[derive(Debug, Clone)]
pub struct ShlinkClient {
    http: reqwest::Client,
    /// Server root, always ending with `/`.
    server_url: Url,
}

impl ShlinkClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from the server URL, its API key and transport settings.
    pub fn new(
        server_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(api_key)?;
        Ok(Self {
            http,
            server_url: Self::normalize_server_url(Url::parse(server_url)?),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, server_url: Url) -> Self {
        Self {
            http,
            server_url: Self::normalize_server_url(server_url),
        }
    }

    /// Same credentials and transport, different server root.
    ///
    /// Used to probe custom domains served by this server.
    pub fn at(&self, server_url: Url) -> Self {
        Self::with_client(self.http.clone(), server_url)
    }

    /// The server root URL.
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn normalize_server_url(mut url: Url) -> Url {
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.server_url.join(API_PREFIX)?.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<T, Error> {
        debug!("PATCH {url} params={params:?}");

        let resp = self.http.patch(url).query(params).json(body).send().await?;
        handle_response(resp).await
    }

    async fn delete(&self, url: Url, params: &[(&str, String)]) -> Result<(), Error> {
        debug!("DELETE {url} params={params:?}");

        let resp = self.http.delete(url).query(params).send().await?;
        handle_empty(resp).await
    }

    // ── Short URLs ───────────────────────────────────────────────────

    /// `GET /short-urls`: one page of short URLs.
    pub async fn list_short_urls(&self, query: &ShortUrlsQuery) -> Result<ShortUrlsPage, Error> {
        let envelope: ShortUrlsEnvelope =
            self.get(self.url("short-urls")?, &query.to_params()).await?;
        Ok(envelope.short_urls)
    }

    /// `POST /short-urls`: the created entity is echoed back.
    pub async fn create_short_url(
        &self,
        request: &CreateShortUrlRequest,
    ) -> Result<ShortUrlResponse, Error> {
        self.post(self.url("short-urls")?, request).await
    }

    /// `PATCH /short-urls/{shortCode}`: the resulting entity is echoed back.
    pub async fn edit_short_url(
        &self,
        short_code: &str,
        domain: Option<&str>,
        request: &EditShortUrlRequest,
    ) -> Result<ShortUrlResponse, Error> {
        let url = self.short_url_path(short_code)?;
        self.patch(url, &domain_param(domain), request).await
    }

    /// `DELETE /short-urls/{shortCode}`.
    pub async fn delete_short_url(&self, short_code: &str, domain: Option<&str>) -> Result<(), Error> {
        let url = self.short_url_path(short_code)?;
        self.delete(url, &domain_param(domain)).await
    }

    fn short_url_path(&self, short_code: &str) -> Result<Url, Error> {
        let mut url = self.url("short-urls")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidAuthority {
                url: self.server_url.to_string(),
                authority: String::new(),
            })?
            .push(short_code);
        Ok(url)
    }

    // ── Domains ──────────────────────────────────────────────────────

    /// `GET /domains`: every domain known to the server plus default redirects.
    pub async fn list_domains(&self) -> Result<DomainsPage, Error> {
        let envelope: DomainsEnvelope = self.get(self.url("domains")?, &[]).await?;
        Ok(envelope.domains)
    }

    /// `PATCH /domains/redirects`: returns the redirects as stored.
    pub async fn edit_domain_redirects(
        &self,
        request: &EditDomainRedirectsRequest,
    ) -> Result<DomainRedirects, Error> {
        self.patch(self.url("domains/redirects")?, &[], request).await
    }

    // ── Health ───────────────────────────────────────────────────────

    /// `GET /rest/health` on this client's server root.
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        let url = self.server_url.join(HEALTH_PATH)?;
        self.get(url, &[]).await
    }
}

fn domain_param(domain: Option<&str>) -> Vec<(&'static str, String)> {
    domain
        .map(|d| vec![("domain", d.to_owned())])
        .unwrap_or_default()
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) if ProblemDetails::looks_like(&value) => {
            match serde_json::from_value::<ProblemDetails>(value) {
                Ok(mut problem) => {
                    problem.status.get_or_insert(status.as_u16());
                    Error::Api(Box::new(problem))
                }
                Err(_) => Error::Http {
                    status: status.as_u16(),
                    body: raw,
                },
            }
        }
        _ => Error::Http {
            status: status.as_u16(),
            body: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        },
    }
}

//! End-to-end tests for the `Controller` against an in-memory API.
//!
//! Every operation goes through the real event queue, reducers and store;
//! only the remote server is faked.
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use url::Url;

use shortdeck_core::{
    Controller, ControllerConfig, CoreError, CreateVisit, Domain, DomainRedirects, DomainStatus,
    DomainsListing, EditDomainRedirects, HealthReport, Pagination, ProblemDetails,
    RealTimeUpdates, ServerConfig, ShortUrl, ShortUrlDraft, ShortUrlEdit, ShortUrlIdentifier,
    ShortUrlMeta, ShortUrlsList, ShortUrlsQuery, ShortenerApi, TlsVerification, Visit,
};

// ── Fake server ─────────────────────────────────────────────────────

#[derive(Default)]
struct FakeApi {
    short_urls: Mutex<Vec<ShortUrl>>,
    domains: Vec<&'static str>,
    listing_problem: Option<ProblemDetails>,
    health_calls: Mutex<Vec<Url>>,
}

fn short_url(code: &str, visits_count: u64) -> ShortUrl {
    ShortUrl {
        short_code: code.into(),
        domain: None,
        short_url: format!("https://s.test/{code}"),
        long_url: format!("https://example.com/{code}"),
        visits_count,
        date_created: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        tags: Vec::new(),
        title: None,
        meta: ShortUrlMeta::default(),
        crawlable: false,
        forward_query: true,
    }
}

fn not_found() -> ProblemDetails {
    ProblemDetails {
        problem_type: "https://shlink.io/api/error/short-url-not-found".into(),
        title: "Short URL not found".into(),
        detail: "No URL found with short code \"nope\"".into(),
        status: Some(404),
        extra: serde_json::Map::new(),
    }
}

#[async_trait]
impl ShortenerApi for FakeApi {
    async fn list_short_urls(&self, _query: &ShortUrlsQuery) -> Result<ShortUrlsList, CoreError> {
        if let Some(problem) = &self.listing_problem {
            return Err(CoreError::Problem {
                problem: Box::new(problem.clone()),
            });
        }
        let data: Vec<_> = self
            .short_urls
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Arc::new)
            .collect();
        let total = u64::try_from(data.len()).unwrap();
        Ok(ShortUrlsList {
            data,
            pagination: Pagination {
                current_page: 1,
                pages_count: 1,
                items_per_page: 10,
                items_in_current_page: u32::try_from(total).unwrap(),
                total_items: total,
            },
        })
    }

    async fn create_short_url(&self, draft: &ShortUrlDraft) -> Result<ShortUrl, CoreError> {
        let code = draft.custom_slug.clone().unwrap_or_else(|| "gen123".into());
        let mut created = short_url(&code, 0);
        created.long_url.clone_from(&draft.long_url);
        self.short_urls.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn edit_short_url(
        &self,
        id: &ShortUrlIdentifier,
        edit: &ShortUrlEdit,
    ) -> Result<ShortUrl, CoreError> {
        let mut stored = self.short_urls.lock().unwrap();
        let entry = stored
            .iter_mut()
            .find(|s| s.short_code == id.short_code && s.domain == id.domain)
            .ok_or_else(|| CoreError::Problem {
                problem: Box::new(not_found()),
            })?;
        if let Some(long_url) = &edit.long_url {
            entry.long_url.clone_from(long_url);
        }
        Ok(entry.clone())
    }

    async fn delete_short_url(&self, id: &ShortUrlIdentifier) -> Result<(), CoreError> {
        let mut stored = self.short_urls.lock().unwrap();
        let before = stored.len();
        stored.retain(|s| !(s.short_code == id.short_code && s.domain == id.domain));
        if stored.len() == before {
            return Err(CoreError::Problem {
                problem: Box::new(not_found()),
            });
        }
        Ok(())
    }

    async fn list_domains(&self) -> Result<DomainsListing, CoreError> {
        Ok(DomainsListing {
            domains: self
                .domains
                .iter()
                .map(|name| {
                    Arc::new(Domain {
                        domain: (*name).into(),
                        is_default: *name == "s.test",
                        redirects: None,
                        status: DomainStatus::Validating,
                    })
                })
                .collect(),
            default_redirects: None,
        })
    }

    async fn edit_domain_redirects(
        &self,
        edit: &EditDomainRedirects,
    ) -> Result<DomainRedirects, CoreError> {
        Ok(edit.redirects.clone())
    }

    async fn check_health(&self, base_url: &Url) -> Result<HealthReport, CoreError> {
        self.health_calls.lock().unwrap().push(base_url.clone());
        match base_url.host_str() {
            Some("good.test" | "s.test") => Ok(HealthReport::Pass),
            Some("boom.test") => Err(CoreError::ConnectionFailed {
                url: base_url.to_string(),
                reason: "connection refused".into(),
            }),
            _ => Ok(HealthReport::Fail),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn server() -> ServerConfig {
    ServerConfig {
        name: "local".into(),
        url: Url::parse("https://s.test:8443/").unwrap(),
        api_key: SecretString::from("api-key".to_owned()),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
    }
}

fn config() -> ControllerConfig {
    ControllerConfig {
        server: Some(server()),
        real_time_updates: RealTimeUpdates::default(),
    }
}

async fn started(api: Arc<FakeApi>) -> Controller {
    let controller = Controller::with_api(config(), api);
    controller.start().await;
    controller
}

fn seeded(codes: &[&str]) -> Arc<FakeApi> {
    Arc::new(FakeApi {
        short_urls: Mutex::new(codes.iter().map(|c| short_url(c, 10)).collect()),
        domains: vec!["s.test", "good.test", "bad.test", "boom.test"],
        ..FakeApi::default()
    })
}

fn cached_codes(controller: &Controller) -> Vec<String> {
    controller
        .short_urls()
        .current()
        .short_urls
        .as_ref()
        .unwrap()
        .data
        .iter()
        .map(|s| s.short_code.clone())
        .collect()
}

// ── Short URLs ──────────────────────────────────────────────────────

#[tokio::test]
async fn listing_populates_store() {
    let controller = started(seeded(&["a", "b"])).await;

    controller
        .list_short_urls(ShortUrlsQuery::default())
        .await
        .unwrap();
    controller.settled().await.unwrap();

    let state = controller.short_urls().current();
    assert!(!state.loading);
    assert!(!state.error);
    assert_eq!(cached_codes(&controller), vec!["a", "b"]);
    controller.shutdown().await;
}

#[tokio::test]
async fn listing_failure_exposes_problem_details() {
    let api = Arc::new(FakeApi {
        listing_problem: Some(not_found()),
        ..FakeApi::default()
    });
    let controller = started(api).await;

    let result = controller.list_short_urls(ShortUrlsQuery::default()).await;
    controller.settled().await.unwrap();

    assert!(matches!(result, Err(CoreError::Problem { .. })));
    let state = controller.short_urls().current();
    assert!(state.error);
    assert!(state.short_urls.is_none());
    assert_eq!(state.error_data, Some(not_found()));
    controller.shutdown().await;
}

#[tokio::test]
async fn creation_prepends_and_counts() {
    let controller = started(seeded(&["a", "b", "c", "d", "e"])).await;
    controller
        .list_short_urls(ShortUrlsQuery::default())
        .await
        .unwrap();

    let created = controller
        .create_short_url(ShortUrlDraft {
            long_url: "https://example.com/new".into(),
            custom_slug: Some("new".into()),
            ..ShortUrlDraft::default()
        })
        .await
        .unwrap();
    controller.settled().await.unwrap();

    assert_eq!(created.short_code, "new");
    assert_eq!(cached_codes(&controller), vec!["new", "a", "b", "c", "d"]);
    let state = controller.short_urls().current();
    assert_eq!(state.short_urls.as_ref().unwrap().pagination.total_items, 6);
    let creation = controller.short_url_creation().current();
    assert!(creation.saved);
    assert_eq!(creation.result.as_ref(), Some(&created));
    controller.shutdown().await;
}

#[tokio::test]
async fn edition_replaces_cached_entry() {
    let controller = started(seeded(&["a", "b"])).await;
    controller
        .list_short_urls(ShortUrlsQuery::default())
        .await
        .unwrap();

    controller
        .edit_short_url(
            ShortUrlIdentifier::new("b", None),
            ShortUrlEdit {
                long_url: Some("https://edited.example.com".into()),
                ..ShortUrlEdit::default()
            },
        )
        .await
        .unwrap();
    controller.settled().await.unwrap();

    let state = controller.short_urls().current();
    let data = &state.short_urls.as_ref().unwrap().data;
    assert_eq!(data[1].long_url, "https://edited.example.com");
    assert_eq!(data[0].long_url, "https://example.com/a");
    controller.shutdown().await;
}

#[tokio::test]
async fn deletion_removes_cached_entry() {
    let controller = started(seeded(&["a", "b"])).await;
    controller
        .list_short_urls(ShortUrlsQuery::default())
        .await
        .unwrap();

    controller
        .delete_short_url(ShortUrlIdentifier::new("a", None))
        .await
        .unwrap();
    let missing = controller
        .delete_short_url(ShortUrlIdentifier::new("nope", None))
        .await;
    controller.settled().await.unwrap();

    assert!(missing.is_err());
    assert_eq!(cached_codes(&controller), vec!["b"]);
    let state = controller.short_urls().current();
    assert_eq!(state.short_urls.as_ref().unwrap().pagination.total_items, 1);
    let deletion = controller.short_url_deletion().current();
    assert!(deletion.error);
    assert_eq!(deletion.error_data, Some(not_found()));
    controller.shutdown().await;
}

#[tokio::test]
async fn live_visits_raise_counts() {
    let controller = started(seeded(&["a", "b"])).await;
    controller
        .list_short_urls(ShortUrlsQuery::default())
        .await
        .unwrap();
    controller.settled().await.unwrap();

    let mut stream = controller.short_urls();
    stream.latest();
    let visit = |count| CreateVisit {
        short_url: Some(short_url("a", count)),
        visit: Visit {
            date: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            referer: None,
            user_agent: Some("curl/8".into()),
            potential_bot: false,
        },
    };
    controller.record_visits(vec![visit(12), visit(11)]).unwrap();

    let state = stream.changed().await.unwrap();
    let data = &state.short_urls.as_ref().unwrap().data;
    assert_eq!(data[0].visits_count, 12);
    assert_eq!(data[1].visits_count, 10);
    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_flushes_buffered_visits() {
    let config = ControllerConfig {
        real_time_updates: RealTimeUpdates {
            enabled: true,
            interval_minutes: 5,
        },
        ..config()
    };
    let controller = Controller::with_api(config, seeded(&["a"]));
    controller.start().await;
    controller
        .list_short_urls(ShortUrlsQuery::default())
        .await
        .unwrap();
    controller.settled().await.unwrap();

    controller
        .record_visits(vec![CreateVisit {
            short_url: Some(short_url("a", 15)),
            visit: Visit {
                date: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
                referer: None,
                user_agent: None,
                potential_bot: false,
            },
        }])
        .unwrap();
    controller.shutdown().await;

    let state = controller.short_urls().current();
    assert_eq!(state.short_urls.as_ref().unwrap().data[0].visits_count, 15);
}

#[tokio::test]
async fn operations_without_server_fail() {
    let controller = started(seeded(&["a"])).await;
    controller.reset_selected_server();

    let result = controller.list_short_urls(ShortUrlsQuery::default()).await;
    controller.settled().await.unwrap();

    assert!(matches!(result, Err(CoreError::NoServerSelected)));
    let state = controller.short_urls().current();
    assert!(state.error);
    assert!(state.error_data.is_none());
    controller.shutdown().await;
}

// ── Domains ─────────────────────────────────────────────────────────

#[tokio::test]
async fn validation_resolves_every_domain() {
    let api = seeded(&[]);
    let controller = started(Arc::clone(&api)).await;
    controller.list_domains().await.unwrap();
    controller.settled().await.unwrap();

    let results = controller.validate_domains().await.unwrap();
    controller.settled().await.unwrap();

    let statuses: Vec<_> = results
        .iter()
        .map(|h| (h.domain.as_str(), h.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("s.test", DomainStatus::Valid),
            ("good.test", DomainStatus::Valid),
            ("bad.test", DomainStatus::Invalid),
            ("boom.test", DomainStatus::Invalid),
        ]
    );

    let state = controller.domains().current();
    assert!(!state.error);
    assert_eq!(state.domains[1].status, DomainStatus::Valid);
    assert_eq!(state.filtered_domains[3].status, DomainStatus::Invalid);

    let calls = api.health_calls.lock().unwrap();
    assert!(
        calls
            .iter()
            .any(|u| u.as_str() == "https://good.test/")
    );
    controller.shutdown().await;
}

#[tokio::test]
async fn probe_without_server_is_invalid_and_offline() {
    let api = seeded(&[]);
    let controller = started(Arc::clone(&api)).await;
    controller.list_domains().await.unwrap();
    controller.reset_selected_server();

    let status = controller.check_domain_health("good.test").await.unwrap();
    controller.settled().await.unwrap();

    assert_eq!(status, DomainStatus::Invalid);
    assert!(api.health_calls.lock().unwrap().is_empty());
    assert_eq!(
        controller.domains().current().domains[1].status,
        DomainStatus::Invalid
    );
    controller.shutdown().await;
}

#[tokio::test]
async fn filter_and_redirects_edition() {
    let controller = started(seeded(&[])).await;
    controller.list_domains().await.unwrap();
    controller.filter_domains("GOOD").unwrap();

    let redirects = DomainRedirects {
        base_url_redirect: Some("https://home.example.com".into()),
        regular_404_redirect: None,
        invalid_short_url_redirect: None,
    };
    controller
        .edit_domain_redirects(EditDomainRedirects {
            domain: "good.test".into(),
            redirects: redirects.clone(),
        })
        .await
        .unwrap();
    controller.settled().await.unwrap();

    let state = controller.domains().current();
    assert_eq!(state.filtered_domains.len(), 1);
    assert_eq!(state.filtered_domains[0].redirects, Some(redirects.clone()));
    assert_eq!(state.domains[1].redirects, Some(redirects));
    assert!(controller.domain_redirects_edition().current().saved);
    controller.shutdown().await;
}

#[tokio::test]
async fn oneshot_settles_before_returning() {
    let controller = Controller::with_api(config(), seeded(&["a"]));

    let listed = controller
        .clone()
        .oneshot(|c| async move { c.list_short_urls(ShortUrlsQuery::default()).await })
        .await
        .unwrap();

    assert_eq!(listed.data.len(), 1);
    assert_eq!(cached_codes(&controller), vec!["a"]);
    assert!(controller.filter_domains("x").is_err());
}

#[tokio::test]
async fn oneshot_stops_even_when_the_operation_fails() {
    let api = Arc::new(FakeApi {
        listing_problem: Some(not_found()),
        ..FakeApi::default()
    });
    let controller = Controller::with_api(config(), api);

    let result = controller
        .clone()
        .oneshot(|c| async move { c.list_short_urls(ShortUrlsQuery::default()).await })
        .await;

    assert!(matches!(result, Err(CoreError::Problem { .. })));
    assert!(controller.short_urls().current().error);
    assert!(controller.filter_domains("x").is_err());
}

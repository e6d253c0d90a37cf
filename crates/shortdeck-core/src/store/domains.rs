// ── Domain collection engine ──
//
// Owns the listed domains, the filtered view derived from them, and the
// per-domain health status resolved by independent probes.

use std::sync::Arc;

use tracing::debug;

use crate::event::{Event, TaskPhase};
use crate::model::{
    Domain, DomainHealth, DomainRedirects, DomainStatus, DomainsListing, EditDomainRedirects,
    Identified, ProblemDetails, replace_matching,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainsListState {
    pub domains: Vec<Arc<Domain>>,
    /// View over `domains` matching `filter`. Never authoritative.
    pub filtered_domains: Vec<Arc<Domain>>,
    /// Last applied filter term.
    pub filter: String,
    pub default_redirects: Option<DomainRedirects>,
    pub loading: bool,
    pub error: bool,
    pub error_data: Option<ProblemDetails>,
}

/// Case-insensitive substring match on the domain name.
fn matches_filter(domain: &Domain, term: &str) -> bool {
    term.is_empty()
        || domain
            .domain
            .to_lowercase()
            .contains(&term.to_lowercase())
}

/// Rewrite the entity named `domain` in `list`; `None` when it is absent or
/// the update is a no-op.
fn update_one<F>(list: &[Arc<Domain>], domain: &str, update: F) -> Option<Vec<Arc<Domain>>>
where
    F: Fn(&Domain) -> Option<Domain>,
{
    let mut changed = false;
    let next = replace_matching(
        list,
        |d| d.identity() == domain,
        |d| match update(d) {
            Some(updated) => {
                changed = true;
                Some(Arc::new(updated))
            }
            None => Some(Arc::clone(d)),
        },
    );
    changed.then_some(next)
}

impl DomainsListState {
    /// Next state after `event`, or `None` when the event leaves this state
    /// untouched.
    #[must_use]
    pub fn reduce(&self, event: &Event) -> Option<Self> {
        match event {
            Event::DomainsListed(phase) => Some(Self::listed(phase)),
            Event::DomainHealthChecked(health) => self.health_checked(health),
            Event::DomainsFiltered(term) => self.filtered(term),
            Event::DomainRedirectsEdited(TaskPhase::Fulfilled(edit)) => {
                self.redirects_edited(edit)
            }
            _ => None,
        }
    }

    /// Like [`reduce`](Self::reduce), but always yields a state.
    #[must_use]
    pub fn apply(&self, event: &Event) -> Self {
        self.reduce(event).unwrap_or_else(|| self.clone())
    }

    fn listed(phase: &TaskPhase<DomainsListing>) -> Self {
        match phase {
            TaskPhase::Pending => Self {
                loading: true,
                ..Self::default()
            },
            TaskPhase::Fulfilled(listing) => {
                let domains: Vec<Arc<Domain>> = listing
                    .domains
                    .iter()
                    .map(|d| {
                        if d.status == DomainStatus::Validating {
                            Arc::clone(d)
                        } else {
                            Arc::new(Domain {
                                status: DomainStatus::Validating,
                                ..(**d).clone()
                            })
                        }
                    })
                    .collect();
                Self {
                    filtered_domains: domains.clone(),
                    domains,
                    default_redirects: listing.default_redirects.clone(),
                    ..Self::default()
                }
            }
            TaskPhase::Rejected(problem) => Self {
                error: true,
                error_data: problem.clone(),
                ..Self::default()
            },
        }
    }

    /// Applied to both lists unconditionally, so a probe for a domain the
    /// current filter hides still lands once the filter is cleared.
    fn health_checked(&self, health: &DomainHealth) -> Option<Self> {
        let set_status = |d: &Domain| {
            (d.status != health.status).then(|| Domain {
                status: health.status,
                ..d.clone()
            })
        };

        let domains = update_one(&self.domains, &health.domain, set_status);
        let filtered_domains = update_one(&self.filtered_domains, &health.domain, set_status);
        if domains.is_none() && filtered_domains.is_none() {
            debug!(domain = %health.domain, "health result for uncached domain");
            return None;
        }

        Some(Self {
            domains: domains.unwrap_or_else(|| self.domains.clone()),
            filtered_domains: filtered_domains.unwrap_or_else(|| self.filtered_domains.clone()),
            ..self.clone()
        })
    }

    fn filtered(&self, term: &str) -> Option<Self> {
        let filtered_domains: Vec<Arc<Domain>> = self
            .domains
            .iter()
            .filter(|d| matches_filter(d, term))
            .cloned()
            .collect();

        let unchanged = self.filter == term
            && filtered_domains.len() == self.filtered_domains.len()
            && filtered_domains
                .iter()
                .zip(&self.filtered_domains)
                .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            return None;
        }

        Some(Self {
            filtered_domains,
            filter: term.to_owned(),
            ..self.clone()
        })
    }

    fn redirects_edited(&self, edit: &EditDomainRedirects) -> Option<Self> {
        let set_redirects = |d: &Domain| {
            (d.redirects.as_ref() != Some(&edit.redirects)).then(|| Domain {
                redirects: Some(edit.redirects.clone()),
                ..d.clone()
            })
        };

        let domains = update_one(&self.domains, &edit.domain, set_redirects);
        let filtered_domains = update_one(&self.filtered_domains, &edit.domain, set_redirects);
        if domains.is_none() && filtered_domains.is_none() {
            return None;
        }

        Some(Self {
            domains: domains.unwrap_or_else(|| self.domains.clone()),
            filtered_domains: filtered_domains.unwrap_or_else(|| self.filtered_domains.clone()),
            ..self.clone()
        })
    }
}

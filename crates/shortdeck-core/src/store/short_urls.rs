// ── Short URL collection engine ──
//
// Owns the cached page of short URLs and reconciles it with local
// create/edit/delete results and the live visit feed, without refetching.

use std::sync::Arc;

use tracing::debug;

use crate::event::{Event, TaskPhase};
use crate::model::{
    CreateVisit, Identified, ProblemDetails, ShortUrl, ShortUrlIdentifier, ShortUrlsList,
    merge_count, replace_matching, same_entity,
};

/// Entries kept in the "latest short URLs" overview after local creations.
pub const OVERVIEW_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlsListState {
    /// Absent until a listing succeeds, and again while one is in flight.
    pub short_urls: Option<ShortUrlsList>,
    pub loading: bool,
    pub error: bool,
    pub error_data: Option<ProblemDetails>,
}

impl ShortUrlsListState {
    /// Next state after `event`, or `None` when the event leaves this state
    /// untouched.
    #[must_use]
    pub fn reduce(&self, event: &Event) -> Option<Self> {
        match event {
            Event::ShortUrlsListed(phase) => Some(Self::listed(phase)),
            Event::ShortUrlCreated(TaskPhase::Fulfilled(created)) => self.created(created),
            Event::ShortUrlEdited(TaskPhase::Fulfilled(edited)) => self.edited(edited),
            Event::ShortUrlDeleted(TaskPhase::Fulfilled(id)) => self.deleted(id),
            Event::VisitsRecorded(visits) => self.visits_recorded(visits),
            _ => None,
        }
    }

    /// Like [`reduce`](Self::reduce), but always yields a state.
    #[must_use]
    pub fn apply(&self, event: &Event) -> Self {
        self.reduce(event).unwrap_or_else(|| self.clone())
    }

    fn listed(phase: &TaskPhase<ShortUrlsList>) -> Self {
        match phase {
            TaskPhase::Pending => Self {
                loading: true,
                ..Self::default()
            },
            TaskPhase::Fulfilled(list) => Self {
                short_urls: Some(list.clone()),
                ..Self::default()
            },
            TaskPhase::Rejected(problem) => Self {
                error: true,
                error_data: problem.clone(),
                ..Self::default()
            },
        }
    }

    fn with_list(&self, short_urls: ShortUrlsList) -> Self {
        Self {
            short_urls: Some(short_urls),
            ..self.clone()
        }
    }

    fn created(&self, created: &ShortUrl) -> Option<Self> {
        let Some(current) = &self.short_urls else {
            debug!(short_code = %created.short_code, "no short URLs cached, ignoring creation");
            return None;
        };

        let mut data = Vec::with_capacity(current.data.len() + 1);
        data.push(Arc::new(created.clone()));
        data.extend(current.data.iter().cloned());
        data.truncate(OVERVIEW_PAGE_SIZE);

        let mut pagination = current.pagination;
        pagination.total_items += 1;

        Some(self.with_list(ShortUrlsList { data, pagination }))
    }

    fn edited(&self, edited: &ShortUrl) -> Option<Self> {
        let current = self.short_urls.as_ref()?;
        if !current.data.iter().any(|s| same_entity(&**s, edited)) {
            return None;
        }

        let replacement = Arc::new(edited.clone());
        let data = replace_matching(
            &current.data,
            |s| same_entity(s, edited),
            |_| Some(Arc::clone(&replacement)),
        );

        Some(self.with_list(ShortUrlsList {
            data,
            pagination: current.pagination,
        }))
    }

    fn deleted(&self, id: &ShortUrlIdentifier) -> Option<Self> {
        let current = self.short_urls.as_ref()?;
        let data = replace_matching(&current.data, |s| s.identity() == id.identity(), |_| None);
        if data.len() == current.data.len() {
            debug!(%id, "deleted short URL not cached");
            return None;
        }

        let mut pagination = current.pagination;
        pagination.total_items = pagination.total_items.saturating_sub(1);

        Some(self.with_list(ShortUrlsList { data, pagination }))
    }

    fn visits_recorded(&self, visits: &[CreateVisit]) -> Option<Self> {
        let current = self.short_urls.as_ref()?;

        let mut data = current.data.clone();
        for reported in visits.iter().filter_map(|v| v.short_url.as_ref()) {
            data = replace_matching(
                &data,
                |s| same_entity(s, reported),
                |s| {
                    let merged = merge_count(s.visits_count, reported.visits_count);
                    if merged == s.visits_count {
                        return Some(Arc::clone(s));
                    }
                    let mut updated = (**s).clone();
                    updated.visits_count = merged;
                    Some(Arc::new(updated))
                },
            );
        }

        let changed = data
            .iter()
            .zip(&current.data)
            .any(|(a, b)| !Arc::ptr_eq(a, b));
        changed.then(|| {
            self.with_list(ShortUrlsList {
                data,
                pagination: current.pagination,
            })
        })
    }
}

// ── Mutation lifecycle ──

use crate::event::TaskPhase;
use crate::model::ProblemDetails;

/// Progress of one kind of mutation (creation, edition, ...).
///
/// Only the most recent attempt is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationState<T> {
    pub saving: bool,
    pub saved: bool,
    pub error: bool,
    pub error_data: Option<ProblemDetails>,
    /// What the server echoed back on success.
    pub result: Option<T>,
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self {
            saving: false,
            saved: false,
            error: false,
            error_data: None,
            result: None,
        }
    }
}

impl<T: Clone> MutationState<T> {
    #[must_use]
    pub fn reduce(&self, phase: &TaskPhase<T>) -> Self {
        match phase {
            TaskPhase::Pending => Self {
                saving: true,
                ..Self::default()
            },
            TaskPhase::Fulfilled(result) => Self {
                saved: true,
                result: Some(result.clone()),
                ..Self::default()
            },
            TaskPhase::Rejected(problem) => Self {
                error: true,
                error_data: problem.clone(),
                ..Self::default()
            },
        }
    }
}

//! Job lifecycle: draft → submitting → pending → complete.
//!
//! The server never reports "submitting" — that state exists only inside
//! the client while a create request is in flight. Everything the server
//! knows is derivable from two markers: whether an id has been assigned
//! and whether a result URL is present.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Phase (server-derivable tri-state)
// ---------------------------------------------------------------------------

/// Where a job stands, as derivable from the server's copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// No id assigned yet.
    Draft,
    /// Id assigned, result not yet available.
    Pending,
    /// Result available.
    Complete,
}

/// Derive the phase from the two authoritative markers.
///
/// An empty result URL counts as absent.
pub fn derive_phase(id: Option<&str>, result_url: Option<&str>) -> JobPhase {
    let has_result = result_url.is_some_and(|url| !url.is_empty());
    match (id, has_result) {
        (None, _) => JobPhase::Draft,
        (Some(_), false) => JobPhase::Pending,
        (Some(_), true) => JobPhase::Complete,
    }
}

// ---------------------------------------------------------------------------
// Client-side state machine
// ---------------------------------------------------------------------------

/// Client-side lifecycle state of one generation job.
///
/// `Draft → Submitting → Pending → Complete`, with `Submitting → Draft`
/// on a failed create call. There is no way back to `Draft` once the
/// server has accepted the job; a fresh draft means a fresh controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Draft,
    /// A create request is in flight.
    Submitting,
    /// Accepted by the server; waiting for the result.
    Pending,
    /// The result artifact exists.
    Complete,
}

impl JobState {
    /// Editable fields are only mutable before submission starts.
    pub fn is_editable(&self) -> bool {
        matches!(self, JobState::Draft)
    }

    /// Whether the completion poll should be running in this state.
    pub fn wants_polling(&self) -> bool {
        matches!(self, JobState::Pending)
    }

    /// `Draft → Submitting`.
    pub fn begin_submit(self) -> Result<JobState, CoreError> {
        match self {
            JobState::Draft => Ok(JobState::Submitting),
            _ => Err(CoreError::Conflict(
                "Job has already been submitted".to_string(),
            )),
        }
    }

    /// `Submitting → Pending`, or straight to `Complete` when the create
    /// response already carries a result.
    pub fn submit_accepted(self, has_result: bool) -> Result<JobState, CoreError> {
        match self {
            JobState::Submitting => Ok(if has_result {
                JobState::Complete
            } else {
                JobState::Pending
            }),
            _ => Err(CoreError::Conflict(
                "No create request is in flight".to_string(),
            )),
        }
    }

    /// `Submitting → Draft`. The failed create call retains nothing.
    pub fn submit_failed(self) -> Result<JobState, CoreError> {
        match self {
            JobState::Submitting => Ok(JobState::Draft),
            _ => Err(CoreError::Conflict(
                "No create request is in flight".to_string(),
            )),
        }
    }

    /// `Pending → Complete` once a poll observes the result. Observing a
    /// result while already complete is a no-op, so a racing final poll
    /// cannot fail.
    pub fn result_observed(self) -> Result<JobState, CoreError> {
        match self {
            JobState::Pending | JobState::Complete => Ok(JobState::Complete),
            _ => Err(CoreError::Conflict(
                "Job has not been submitted yet".to_string(),
            )),
        }
    }
}

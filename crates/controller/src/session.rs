//! One generation job, draft to completion.
//!
//! [`JobController`] owns the draft, the create call, the optimistic
//! visibility toggle, and the background completion poll. Errors follow
//! a fixed taxonomy: validation problems never reach the network and are
//! published as notices; a failed create call leaves the draft intact;
//! poll failures are logged only; a failed visibility patch rolls the
//! optimistic flip back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use thumbsmith_client::models::ThumbnailRecord;
use thumbsmith_client::ApiError;
use thumbsmith_core::attachment::{
    AttachmentLimits, AttachmentRejection, ReferenceImage, ReferenceRole, ReferenceSet,
};
use thumbsmith_core::draft::{DraftUpdate, ThumbnailDraft};
use thumbsmith_core::error::CoreError;
use thumbsmith_core::lifecycle::{JobPhase, JobState};
use thumbsmith_core::options::{default_color_scheme, AspectRatio, ThumbnailStyle};
use thumbsmith_core::types::JobId;
use thumbsmith_core::visibility::VisibilityToggle;
use thumbsmith_events::NoticeBus;

use crate::poller::{run_poll_loop, PollConfig};
use crate::service::ThumbnailService;

/// Errors surfaced by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A domain-level error (validation, auth precondition, lifecycle
    /// conflict).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A transport or server error from the REST client.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Mutable job state shared with the poll task.
pub(crate) struct JobShared {
    pub(crate) draft: ThumbnailDraft,
    pub(crate) record: Option<ThumbnailRecord>,
    pub(crate) state: JobState,
    pub(crate) visibility: VisibilityToggle,
}

impl JobShared {
    /// Mirror the authoritative server copy into local state.
    ///
    /// Unknown or missing option values fall back to the form defaults,
    /// and the visibility toggle only adopts the server value when no
    /// patch is outstanding. Returns whether the copy carries a result.
    pub(crate) fn absorb(&mut self, record: ThumbnailRecord) -> bool {
        self.draft.title = record.title.clone();
        self.draft.prompt = record.user_prompt.clone().unwrap_or_default();
        self.draft.style = record
            .style
            .as_deref()
            .and_then(ThumbnailStyle::parse)
            .unwrap_or_default();
        self.draft.color_scheme = record
            .color_scheme
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| default_color_scheme().id.to_string());
        self.draft.aspect_ratio = record
            .aspect_ratio
            .as_deref()
            .and_then(AspectRatio::parse)
            .unwrap_or_default();

        self.visibility.reconcile(record.is_public);
        self.draft.is_public = self.visibility.current();

        let has_result = record.result_url().is_some();
        self.record = Some(record);
        has_result
    }

    /// Absorb a poll response and advance `Pending → Complete` when the
    /// result has arrived. Returns whether the job is now complete.
    pub(crate) fn observe_server_copy(&mut self, record: ThumbnailRecord) -> bool {
        let has_result = self.absorb(record);
        if has_result {
            if let Ok(next) = self.state.result_observed() {
                self.state = next;
            }
        }
        has_result
    }
}

/// Controller for a single generation job.
///
/// Constructed with [`new`](Self::new) for a fresh draft or
/// [`open`](Self::open) to attach to an existing job by id. All methods
/// take `&self`; state lives behind an async `RwLock` so the poll task
/// can reconcile concurrently.
pub struct JobController<S> {
    service: Arc<S>,
    notices: Arc<NoticeBus>,
    shared: Arc<RwLock<JobShared>>,
    poll_config: PollConfig,
    cancel: CancellationToken,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    logged_in: AtomicBool,
    controller_id: uuid::Uuid,
}

impl<S: ThumbnailService + 'static> JobController<S> {
    /// Create a controller holding a fresh, empty draft.
    pub fn new(
        service: Arc<S>,
        notices: Arc<NoticeBus>,
        poll_config: PollConfig,
        limits: AttachmentLimits,
    ) -> Self {
        let draft = ThumbnailDraft {
            references: ReferenceSet::new(limits),
            ..ThumbnailDraft::default()
        };
        let visibility = VisibilityToggle::new(draft.is_public);

        Self {
            service,
            notices,
            shared: Arc::new(RwLock::new(JobShared {
                draft,
                record: None,
                state: JobState::Draft,
                visibility,
            })),
            poll_config,
            cancel: CancellationToken::new(),
            poll_task: Mutex::new(None),
            logged_in: AtomicBool::new(false),
            controller_id: uuid::Uuid::new_v4(),
        }
    }

    /// Attach to an existing job by id.
    ///
    /// Fetches the server copy, rehydrates the (frozen) draft fields from
    /// it, and starts the completion poll when the job is still pending.
    pub async fn open(
        service: Arc<S>,
        notices: Arc<NoticeBus>,
        poll_config: PollConfig,
        limits: AttachmentLimits,
        id: &str,
    ) -> Result<Self, ControllerError> {
        let record = match service.fetch(id).await {
            Ok(record) => record,
            Err(e) => {
                notices.error(e.server_message());
                return Err(e.into());
            }
        };

        let controller = Self::new(service, notices, poll_config, limits);
        let pending = {
            let mut shared = controller.shared.write().await;
            let has_result = shared.absorb(record);
            shared.state = if has_result {
                JobState::Complete
            } else {
                JobState::Pending
            };
            shared.state.wants_polling()
        };

        tracing::info!(
            controller_id = %controller.controller_id,
            job_id = %id,
            pending,
            "Opened existing job",
        );

        if pending {
            controller.start_polling(id.to_string()).await;
        }
        Ok(controller)
    }

    /// Mark whether a user session is active. Submission requires one.
    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::Relaxed);
    }

    /// Whether a user session is active.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Relaxed)
    }

    /// The notice stream for this controller.
    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    // ---- draft editing ----

    /// Apply a field update to the draft.
    ///
    /// Fails with a notice once the job has been submitted — the draft is
    /// frozen from that point on.
    pub async fn update(&self, update: DraftUpdate) -> Result<(), CoreError> {
        let mut shared = self.shared.write().await;
        if !shared.state.is_editable() {
            drop(shared);
            let err = CoreError::Conflict("Submitted jobs can no longer be edited".to_string());
            self.notices.error(err.to_string());
            return Err(err);
        }
        match shared.draft.apply(update) {
            Ok(()) => Ok(()),
            Err(e) => {
                drop(shared);
                self.notices.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate and add a batch of reference images.
    ///
    /// Each rejected file produces its own error notice; an overflowing
    /// batch produces a single "too many" notice and the excess is
    /// dropped. Accepted images start with the `auto` role.
    pub async fn add_reference_images(
        &self,
        files: Vec<ReferenceImage>,
    ) -> Result<Vec<AttachmentRejection>, CoreError> {
        let mut shared = self.shared.write().await;
        if !shared.state.is_editable() {
            drop(shared);
            let err = CoreError::Conflict(
                "Reference images are fixed once the job is submitted".to_string(),
            );
            self.notices.error(err.to_string());
            return Err(err);
        }
        let rejections = shared.draft.references.add(files);
        drop(shared);

        for rejection in &rejections {
            self.notices.error(rejection.to_string());
        }
        Ok(rejections)
    }

    /// Change the role hint of a reference image.
    ///
    /// A no-op for out-of-bounds slots and for submitted jobs —
    /// attachments are never sent again after creation.
    pub async fn set_reference_role(&self, index: usize, role: ReferenceRole) {
        let mut shared = self.shared.write().await;
        if shared.state.is_editable() {
            shared.draft.references.set_role(index, role);
        }
    }

    /// Remove a reference image and its paired role.
    pub async fn remove_reference(&self, index: usize) -> Result<(), CoreError> {
        let mut shared = self.shared.write().await;
        if !shared.state.is_editable() {
            drop(shared);
            let err = CoreError::Conflict(
                "Reference images are fixed once the job is submitted".to_string(),
            );
            self.notices.error(err.to_string());
            return Err(err);
        }
        match shared.draft.references.remove(index) {
            Ok(()) => Ok(()),
            Err(e) => {
                drop(shared);
                self.notices.error(e.to_string());
                Err(e)
            }
        }
    }

    // ---- submission ----

    /// Submit the draft for generation.
    ///
    /// Preconditions are checked before any network call: a user session
    /// must be active and the title must be non-blank. On success the job
    /// enters the pending state and the completion poll starts. On a
    /// transport or server failure the draft is preserved unchanged so
    /// the caller can retry without re-entering anything.
    pub async fn submit(&self) -> Result<JobId, ControllerError> {
        if !self.is_logged_in() {
            let message = "You must be logged in to generate a thumbnail";
            self.notices.error(message);
            return Err(CoreError::Unauthorized(message.to_string()).into());
        }

        let draft = {
            let mut shared = self.shared.write().await;
            if let Err(e) = shared.draft.validate_for_submit() {
                drop(shared);
                self.notices.error("Title is required");
                return Err(e.into());
            }
            match shared.state.begin_submit() {
                Ok(next) => shared.state = next,
                Err(e) => {
                    drop(shared);
                    self.notices.error(e.to_string());
                    return Err(e.into());
                }
            }
            shared.draft.clone()
        };

        tracing::info!(
            controller_id = %self.controller_id,
            "Submitting generation request",
        );

        match self.service.create(&draft).await {
            Ok(record) => {
                let id = record.id.clone();
                let has_result = record.result_url().is_some();
                let pending = {
                    let mut shared = self.shared.write().await;
                    shared.state = shared.state.submit_accepted(has_result)?;
                    shared.absorb(record);
                    shared.state.wants_polling()
                };
                self.notices.success("Thumbnail generated successfully");
                if pending {
                    self.start_polling(id.clone()).await;
                }
                Ok(id)
            }
            Err(e) => {
                {
                    let mut shared = self.shared.write().await;
                    shared.state = shared.state.submit_failed()?;
                }
                tracing::warn!(
                    controller_id = %self.controller_id,
                    error = %e,
                    "Create request failed",
                );
                self.notices.error(e.server_message());
                Err(e.into())
            }
        }
    }

    // ---- visibility ----

    /// Flip the community-visibility flag, optimistically.
    ///
    /// The in-memory value changes before any network confirmation. For a
    /// job without an id the change is local-only and carried along at
    /// submit time. For a submitted job one patch request is issued; on
    /// failure the flip rolls back and an error notice is published. Each
    /// patch carries a sequence number, so a stale response can neither
    /// confirm nor roll back over a newer toggle. Repeating the current
    /// value issues no request.
    pub async fn set_visibility(&self, next: bool) -> Result<(), ControllerError> {
        let (seq, id) = {
            let mut shared = self.shared.write().await;
            let Some(seq) = shared.visibility.begin(next) else {
                return Ok(());
            };
            shared.draft.is_public = next;
            (seq, shared.record.as_ref().map(|r| r.id.clone()))
        };

        let Some(id) = id else {
            // Not yet submitted: nothing to patch, settle locally.
            self.shared.write().await.visibility.confirm(seq);
            return Ok(());
        };

        match self.service.set_visibility(&id, next).await {
            Ok(()) => {
                let mut shared = self.shared.write().await;
                if shared.visibility.confirm(seq) {
                    if let Some(record) = shared.record.as_mut() {
                        record.is_public = next;
                    }
                    drop(shared);
                    self.notices
                        .success(if next { "Now public" } else { "Now private" });
                } else {
                    tracing::debug!(job_id = %id, seq, "Stale visibility response ignored");
                }
                Ok(())
            }
            Err(e) => {
                let mut shared = self.shared.write().await;
                match shared.visibility.fail(seq) {
                    Some(restored) => {
                        shared.draft.is_public = restored;
                        drop(shared);
                        self.notices.error(e.server_message());
                    }
                    None => {
                        tracing::debug!(job_id = %id, seq, "Stale visibility failure ignored");
                    }
                }
                Err(e.into())
            }
        }
    }

    // ---- snapshots ----

    /// Current lifecycle state.
    pub async fn state(&self) -> JobState {
        self.shared.read().await.state
    }

    /// Lifecycle phase as the server would derive it.
    pub async fn phase(&self) -> JobPhase {
        match self.shared.read().await.state {
            JobState::Draft | JobState::Submitting => JobPhase::Draft,
            JobState::Pending => JobPhase::Pending,
            JobState::Complete => JobPhase::Complete,
        }
    }

    /// Snapshot of the draft.
    pub async fn draft(&self) -> ThumbnailDraft {
        self.shared.read().await.draft.clone()
    }

    /// Snapshot of the latest server copy, if any.
    pub async fn record(&self) -> Option<ThumbnailRecord> {
        self.shared.read().await.record.clone()
    }

    /// The server-assigned job id, once submitted.
    pub async fn job_id(&self) -> Option<JobId> {
        self.shared.read().await.record.as_ref().map(|r| r.id.clone())
    }

    /// The generated artifact URL, once complete.
    pub async fn result_url(&self) -> Option<String> {
        self.shared
            .read()
            .await
            .record
            .as_ref()
            .and_then(|r| r.result_url().map(str::to_string))
    }

    /// The visibility value currently shown (optimistic).
    pub async fn is_public(&self) -> bool {
        self.shared.read().await.visibility.current()
    }

    // ---- lifecycle ----

    /// Stop the completion poll and detach from the job.
    ///
    /// Safe to call more than once. A fetch in flight at this moment is
    /// allowed to finish; its response is discarded.
    pub async fn teardown(&self) {
        self.cancel.cancel();
        let handle = self.poll_task.lock().await.take();
        if let Some(handle) = handle {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
        tracing::debug!(controller_id = %self.controller_id, "Controller torn down");
    }

    /// Spawn the completion poll task for a pending job.
    async fn start_polling(&self, id: JobId) {
        let service = Arc::clone(&self.service);
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.child_token();
        let config = self.poll_config;

        let handle = tokio::spawn(run_poll_loop(service, id, shared, cancel, config));
        *self.poll_task.lock().await = Some(handle);
    }
}

impl<S> Drop for JobController<S> {
    fn drop(&mut self) {
        // Dropping without an explicit teardown still stops the poll; the
        // task notices the cancelled token at its next tick.
        self.cancel.cancel();
    }
}

//! End-to-end controller scenarios against an in-memory fake service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;

use thumbsmith_client::models::ThumbnailRecord;
use thumbsmith_client::ApiError;
use thumbsmith_controller::{ControllerError, JobController, PollConfig, ThumbnailService};
use thumbsmith_core::attachment::{AttachmentLimits, AttachmentRejection, ReferenceImage};
use thumbsmith_core::draft::{DraftUpdate, ThumbnailDraft};
use thumbsmith_core::error::CoreError;
use thumbsmith_core::lifecycle::JobState;
use thumbsmith_core::options::{AspectRatio, ThumbnailStyle};
use thumbsmith_events::{NoticeBus, NoticeLevel};

// ---------------------------------------------------------------------------
// Fake service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create { is_public: bool },
    Fetch(String),
    SetVisibility(String, bool),
}

/// Scripted [`ThumbnailService`]: responses are queued per operation and
/// every call is recorded.
#[derive(Default)]
struct FakeService {
    calls: Mutex<Vec<Call>>,
    create_responses: Mutex<VecDeque<Result<ThumbnailRecord, ApiError>>>,
    fetch_responses: Mutex<VecDeque<Result<ThumbnailRecord, ApiError>>>,
    /// Per-call artificial latency in milliseconds, paired with the result.
    visibility_responses: Mutex<VecDeque<(u64, Result<(), ApiError>)>>,
}

fn exhausted() -> ApiError {
    ApiError::Api {
        status: 599,
        body: "fake service exhausted".to_string(),
    }
}

#[async_trait]
impl ThumbnailService for FakeService {
    async fn create(&self, draft: &ThumbnailDraft) -> Result<ThumbnailRecord, ApiError> {
        self.calls.lock().unwrap().push(Call::Create {
            is_public: draft.is_public,
        });
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()))
    }

    async fn fetch(&self, id: &str) -> Result<ThumbnailRecord, ApiError> {
        self.calls.lock().unwrap().push(Call::Fetch(id.to_string()));
        self.fetch_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()))
    }

    async fn set_visibility(&self, id: &str, is_public: bool) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::SetVisibility(id.to_string(), is_public));
        let (delay_ms, result) = self
            .visibility_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((0, Ok(())));
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        result
    }
}

impl FakeService {
    fn fetch_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    fn visibility_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::SetVisibility(..)))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pending_record(id: &str) -> ThumbnailRecord {
    ThumbnailRecord {
        id: id.to_string(),
        title: "My video".to_string(),
        user_prompt: Some(String::new()),
        style: Some("Bold & Graphic".to_string()),
        color_scheme: Some("vibrant".to_string()),
        aspect_ratio: Some("16:9".to_string()),
        is_public: true,
        image_url: None,
        reference_images: vec![],
        created_at: None,
    }
}

fn complete_record(id: &str, url: &str) -> ThumbnailRecord {
    ThumbnailRecord {
        image_url: Some(url.to_string()),
        ..pending_record(id)
    }
}

fn png(name: &str) -> ReferenceImage {
    ReferenceImage {
        file_name: name.to_string(),
        media_type: "image/png".to_string(),
        bytes: vec![0; 16],
    }
}

fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(30),
    }
}

fn fresh_controller(service: Arc<FakeService>) -> JobController<FakeService> {
    let controller = JobController::new(
        service,
        Arc::new(NoticeBus::default()),
        fast_poll(),
        AttachmentLimits::default(),
    );
    controller.set_logged_in(true);
    controller
}

async fn open_controller(
    service: Arc<FakeService>,
    id: &str,
) -> JobController<FakeService> {
    let controller = JobController::open(
        service,
        Arc::new(NoticeBus::default()),
        fast_poll(),
        AttachmentLimits::default(),
        id,
    )
    .await
    .unwrap();
    controller.set_logged_in(true);
    controller
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("thumbsmith=debug")
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Submission guards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_without_a_session_makes_no_network_call() {
    let service = Arc::new(FakeService::default());
    let controller = fresh_controller(Arc::clone(&service));
    controller.set_logged_in(false);
    let mut notices = controller.notices().subscribe();

    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();
    let err = controller.submit().await.unwrap_err();

    assert_matches!(err, ControllerError::Core(CoreError::Unauthorized(_)));
    assert!(service.calls.lock().unwrap().is_empty());
    assert_eq!(controller.state().await, JobState::Draft);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "You must be logged in to generate a thumbnail");
}

#[tokio::test]
async fn submit_with_a_blank_title_makes_no_network_call() {
    let service = Arc::new(FakeService::default());
    let controller = fresh_controller(Arc::clone(&service));
    let mut notices = controller.notices().subscribe();

    let err = controller.submit().await.unwrap_err();

    assert_matches!(err, ControllerError::Core(CoreError::Validation(_)));
    assert!(service.calls.lock().unwrap().is_empty());
    assert_eq!(controller.state().await, JobState::Draft);
    assert_eq!(notices.try_recv().unwrap().message, "Title is required");
}

// ---------------------------------------------------------------------------
// Submission and polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_polls_until_the_result_arrives() {
    init_tracing();
    let service = Arc::new(FakeService::default());
    service
        .create_responses
        .lock()
        .unwrap()
        .push_back(Ok(pending_record("abc123")));
    {
        let mut fetches = service.fetch_responses.lock().unwrap();
        fetches.push_back(Ok(pending_record("abc123")));
        fetches.push_back(Ok(complete_record("abc123", "https://x/y.png")));
    }

    let controller = fresh_controller(Arc::clone(&service));
    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();

    let id = controller.submit().await.unwrap();
    assert_eq!(id, "abc123");
    assert_eq!(controller.state().await, JobState::Pending);
    assert_eq!(controller.result_url().await, None);

    // Two poll ticks: still-pending, then complete.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(controller.state().await, JobState::Complete);
    assert_eq!(
        controller.result_url().await.as_deref(),
        Some("https://x/y.png")
    );

    // Polling stopped with the result.
    let fetches_at_completion = service.fetch_count();
    assert_eq!(fetches_at_completion, 2);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(service.fetch_count(), fetches_at_completion);
}

#[tokio::test]
async fn poll_errors_are_retried_without_a_notice() {
    let service = Arc::new(FakeService::default());
    service
        .create_responses
        .lock()
        .unwrap()
        .push_back(Ok(pending_record("abc123")));
    {
        let mut fetches = service.fetch_responses.lock().unwrap();
        fetches.push_back(Err(ApiError::Api {
            status: 502,
            body: "Bad Gateway".to_string(),
        }));
        fetches.push_back(Ok(complete_record("abc123", "https://x/y.png")));
    }

    let controller = fresh_controller(Arc::clone(&service));
    let mut notices = controller.notices().subscribe();
    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();
    controller.submit().await.unwrap();

    // Drain the submit success notice; the poll failure must not add one.
    let first = notices.try_recv().unwrap();
    assert_eq!(first.level, NoticeLevel::Success);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(controller.state().await, JobState::Complete);
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn failed_create_preserves_the_draft() {
    let service = Arc::new(FakeService::default());
    service.create_responses.lock().unwrap().push_back(Err(ApiError::Api {
        status: 503,
        body: r#"{ "message": "Generation backend unavailable" }"#.to_string(),
    }));

    let controller = fresh_controller(Arc::clone(&service));
    let mut notices = controller.notices().subscribe();
    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();
    controller
        .update(DraftUpdate::Style(ThumbnailStyle::Retro))
        .await
        .unwrap();

    let err = controller.submit().await.unwrap_err();
    assert_matches!(err, ControllerError::Api(ApiError::Api { status: 503, .. }));

    // Back in draft, everything still editable and intact.
    assert_eq!(controller.state().await, JobState::Draft);
    let draft = controller.draft().await;
    assert_eq!(draft.title, "My video");
    assert_eq!(draft.style, ThumbnailStyle::Retro);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.message, "Generation backend unavailable");

    // A retry is allowed.
    service
        .create_responses
        .lock()
        .unwrap()
        .push_back(Ok(pending_record("abc123")));
    controller.submit().await.unwrap();
    assert_eq!(controller.state().await, JobState::Pending);
    controller.teardown().await;
}

#[tokio::test]
async fn the_draft_freezes_once_submitted() {
    let service = Arc::new(FakeService::default());
    service
        .create_responses
        .lock()
        .unwrap()
        .push_back(Ok(pending_record("abc123")));

    let controller = fresh_controller(Arc::clone(&service));
    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();
    controller.submit().await.unwrap();

    let err = controller
        .update(DraftUpdate::Title("Renamed".to_string()))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(controller.draft().await.title, "My video");

    assert_matches!(
        controller.add_reference_images(vec![png("late.png")]).await,
        Err(CoreError::Conflict(_))
    );
    controller.teardown().await;
}

#[tokio::test]
async fn teardown_stops_the_poll_and_discards_late_responses() {
    let service = Arc::new(FakeService::default());
    service
        .create_responses
        .lock()
        .unwrap()
        .push_back(Ok(pending_record("abc123")));
    {
        let mut fetches = service.fetch_responses.lock().unwrap();
        for _ in 0..20 {
            fetches.push_back(Ok(pending_record("abc123")));
        }
    }

    let controller = fresh_controller(Arc::clone(&service));
    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();
    controller.submit().await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;
    controller.teardown().await;

    let fetches_at_teardown = service.fetch_count();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(service.fetch_count(), fetches_at_teardown);
    assert_eq!(controller.state().await, JobState::Pending);
}

// ---------------------------------------------------------------------------
// Rehydration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn opening_a_job_rehydrates_the_stored_fields() {
    let service = Arc::new(FakeService::default());
    let stored = ThumbnailRecord {
        title: "Stored title".to_string(),
        user_prompt: Some("city at night".to_string()),
        style: Some("Minimalist".to_string()),
        color_scheme: Some("ocean".to_string()),
        aspect_ratio: Some("9:16".to_string()),
        ..complete_record("abc123", "https://x/y.png")
    };
    service.fetch_responses.lock().unwrap().push_back(Ok(stored));

    let controller = open_controller(Arc::clone(&service), "abc123").await;

    assert_eq!(controller.state().await, JobState::Complete);
    let draft = controller.draft().await;
    assert_eq!(draft.title, "Stored title");
    assert_eq!(draft.prompt, "city at night");
    assert_eq!(draft.style, ThumbnailStyle::Minimalist);
    assert_eq!(draft.color_scheme, "ocean");
    assert_eq!(draft.aspect_ratio, AspectRatio::Vertical);

    // Complete jobs do not poll.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(service.fetch_count(), 1);
}

#[tokio::test]
async fn opening_a_pending_job_starts_the_poll() {
    let service = Arc::new(FakeService::default());
    {
        let mut fetches = service.fetch_responses.lock().unwrap();
        fetches.push_back(Ok(pending_record("abc123")));
        fetches.push_back(Ok(complete_record("abc123", "https://x/y.png")));
    }

    let controller = open_controller(Arc::clone(&service), "abc123").await;
    assert_eq!(controller.state().await, JobState::Pending);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(controller.state().await, JobState::Complete);
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visibility_before_submit_is_local_and_carried_on_create() {
    let service = Arc::new(FakeService::default());
    service
        .create_responses
        .lock()
        .unwrap()
        .push_back(Ok(ThumbnailRecord {
            is_public: false,
            ..pending_record("abc123")
        }));

    let controller = fresh_controller(Arc::clone(&service));
    controller.set_visibility(false).await.unwrap();

    assert_eq!(service.visibility_calls(), 0);
    assert!(!controller.is_public().await);

    controller
        .update(DraftUpdate::Title("My video".to_string()))
        .await
        .unwrap();
    controller.submit().await.unwrap();

    assert!(service
        .calls
        .lock()
        .unwrap()
        .contains(&Call::Create { is_public: false }));
    controller.teardown().await;
}

#[tokio::test]
async fn failed_patch_rolls_the_flip_back() {
    let service = Arc::new(FakeService::default());
    service
        .fetch_responses
        .lock()
        .unwrap()
        .push_back(Ok(complete_record("abc123", "https://x/y.png")));
    service.visibility_responses.lock().unwrap().push_back((
        0,
        Err(ApiError::Api {
            status: 500,
            body: r#"{ "message": "Could not update visibility" }"#.to_string(),
        }),
    ));

    let controller = open_controller(Arc::clone(&service), "abc123").await;
    let mut notices = controller.notices().subscribe();
    assert!(controller.is_public().await);

    let err = controller.set_visibility(false).await.unwrap_err();
    assert_matches!(err, ControllerError::Api(_));

    // Rolled back to the last known-good value, with an error notice.
    assert!(controller.is_public().await);
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Could not update visibility");
}

#[tokio::test]
async fn repeating_the_current_visibility_issues_no_patch() {
    let service = Arc::new(FakeService::default());
    service
        .fetch_responses
        .lock()
        .unwrap()
        .push_back(Ok(complete_record("abc123", "https://x/y.png")));

    let controller = open_controller(Arc::clone(&service), "abc123").await;
    controller.set_visibility(true).await.unwrap();
    controller.set_visibility(true).await.unwrap();

    assert_eq!(service.visibility_calls(), 0);
    assert!(controller.is_public().await);
}

#[tokio::test]
async fn a_stale_patch_response_cannot_clobber_a_newer_toggle() {
    let service = Arc::new(FakeService::default());
    service
        .fetch_responses
        .lock()
        .unwrap()
        .push_back(Ok(complete_record("abc123", "https://x/y.png")));
    {
        let mut patches = service.visibility_responses.lock().unwrap();
        // The first patch is slow and resolves after the second.
        patches.push_back((120, Ok(())));
        patches.push_back((0, Ok(())));
    }

    let controller = Arc::new(open_controller(Arc::clone(&service), "abc123").await);

    let slow = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.set_visibility(false).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let fast = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.set_visibility(true).await })
    };

    fast.await.unwrap().unwrap();
    slow.await.unwrap().unwrap();

    // The newer toggle (public) wins even though its response came first.
    assert!(controller.is_public().await);
    assert_eq!(service.visibility_calls(), 2);
}

// ---------------------------------------------------------------------------
// Attachments through the controller
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overflowing_attachment_batch_reports_too_many_once() {
    let service = Arc::new(FakeService::default());
    let controller = fresh_controller(service);
    let mut notices = controller.notices().subscribe();

    controller
        .add_reference_images(vec![png("a.png"), png("b.png")])
        .await
        .unwrap();
    let rejections = controller
        .add_reference_images(vec![png("c.png")])
        .await
        .unwrap();

    assert_matches!(
        rejections.as_slice(),
        [AttachmentRejection::TooMany { max_images: 2 }]
    );
    assert_eq!(controller.draft().await.references.len(), 2);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("At most 2"));
}

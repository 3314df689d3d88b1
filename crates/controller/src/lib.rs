//! Generation-job lifecycle controller.
//!
//! Wires the domain model to the REST client: draft editing with the
//! submitted-job freeze, multipart submission, optimistic visibility with
//! sequenced rollback, and the background completion poll. One
//! [`JobController`] manages exactly one job; navigating to a new job
//! means constructing a new controller.

pub mod poller;
pub mod service;
pub mod session;

pub use poller::PollConfig;
pub use service::ThumbnailService;
pub use session::{ControllerError, JobController};

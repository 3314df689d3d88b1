//! Thumbsmith notice infrastructure.
//!
//! User-facing notices (the toast stack of the web client) are decoupled
//! from the code that produces them via [`NoticeBus`], an in-process
//! publish/subscribe hub backed by `tokio::sync::broadcast`.

pub mod bus;

pub use bus::{Notice, NoticeBus, NoticeLevel};

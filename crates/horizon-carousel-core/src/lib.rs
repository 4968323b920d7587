//! Core plumbing for Horizon Carousel.
//!
//! This crate provides the UI-thread building blocks the carousel widget is
//! assembled from:
//!
//! - **Signal/Slot System**: Type-safe notifications with single-slot replay
//! - **Deferred Queue**: "After layout" work posted now and applied later
//! - **Logging**: Tracing targets, span names and convenience macros
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_carousel_core::Signal;
//!
//! let page_selected = Signal::<usize>::new();
//!
//! let conn_id = page_selected.connect(|page| {
//!     println!("Selected page: {}", page);
//! });
//!
//! page_selected.emit(1);
//!
//! // Replay the current page to the late subscriber only.
//! page_selected.emit_to(conn_id, 1);
//! ```
//!
//! # Deferred Queue Example
//!
//! ```
//! use horizon_carousel_core::DeferredQueue;
//!
//! let mut queue = DeferredQueue::new();
//! queue.post_unique("refresh");
//! queue.post_unique("refresh");
//!
//! assert_eq!(queue.take_all(), vec!["refresh"]);
//! ```

pub mod logging;
pub mod signal;
pub mod task;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use task::{DeferredQueue, TaskId};

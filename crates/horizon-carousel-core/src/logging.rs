//! Logging facilities for Horizon Carousel.
//!
//! Horizon Carousel uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_carousel=debug")
//!         .init();
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`], so a filter can
//! isolate, say, image loading from indicator animation.

/// Span names used throughout Horizon Carousel for tracing.
pub mod span_names {
    /// Layout pass span.
    pub const LAYOUT: &str = "horizon_carousel::layout";
    /// Container bind span.
    pub const BIND: &str = "horizon_carousel::bind";
    /// Deferred task processing span.
    pub const TASK: &str = "horizon_carousel::task";
}

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_carousel_core::signal";
    /// Adapter and recycling target.
    pub const ADAPTER: &str = "horizon_carousel::adapter";
    /// Image loading target.
    pub const IMAGE: &str = "horizon_carousel::image";
    /// Indicator state machine target.
    pub const INDICATOR: &str = "horizon_carousel::indicator";
    /// Constraint engine target.
    pub const LAYOUT: &str = "horizon_carousel::layout";
    /// Configuration target.
    pub const CONFIG: &str = "horizon_carousel::config";
    /// Composition root target.
    pub const CAROUSEL: &str = "horizon_carousel::carousel";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for timing a pass with a subscriber that records span durations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_carousel::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

/// Debug event under the crate-wide `horizon_carousel` target.
#[macro_export]
macro_rules! carousel_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_carousel", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_under_subscriber() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new(span_names::LAYOUT);
            carousel_debug!(pages = 3, "inside span");
        });
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::ADAPTER,
            targets::IMAGE,
            targets::INDICATOR,
            targets::LAYOUT,
            targets::CONFIG,
            targets::CAROUSEL,
        ] {
            assert!(target.starts_with("horizon_carousel::"));
        }
    }
}

//! Animation primitives for the indicator strip.
//!
//! Animations here are clock-driven rather than wall-clock driven: the owner
//! advances them by an explicit `dt`, which keeps indicator state fully
//! deterministic under test.

mod easing;
mod indicator_animation;

pub use easing::{Easing, ease, lerp_eased};
pub use indicator_animation::{
    ACTIVE_ALPHA, DEFAULT_DURATION, Direction, INACTIVE_ALPHA, IndicatorAnimation,
    IndicatorVisual, PropertyCurve,
};

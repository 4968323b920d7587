//! Activation animation for a single indicator.
//!
//! An indicator activates by fading from half to full opacity while scaling
//! up to the configured active factor. Deactivation plays the same curves
//! backwards in time rather than using separately authored curves, so both
//! directions always meet at the same rest values.

use std::time::Duration;

use super::easing::{Easing, lerp_eased};

/// Opacity of an inactive indicator.
pub const INACTIVE_ALPHA: f32 = 0.5;
/// Opacity of the active indicator.
pub const ACTIVE_ALPHA: f32 = 1.0;
/// Default animation length (the platform "short" duration).
pub const DEFAULT_DURATION: Duration = Duration::from_millis(200);

/// Playback direction of an [`IndicatorAnimation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Inactive to active.
    Forward,
    /// Active to inactive; the forward curve with time reversed.
    Reverse,
}

impl Direction {
    /// Map a time fraction to a curve fraction.
    ///
    /// Reverse playback uses `|t - 1|`.
    #[inline]
    pub fn fraction(self, t: f32) -> f32 {
        match self {
            Direction::Forward => t,
            Direction::Reverse => (t - 1.0).abs(),
        }
    }
}

/// A single animated property: the value at curve fraction 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyCurve {
    pub from: f32,
    pub to: f32,
}

impl PropertyCurve {
    /// Create a new curve.
    #[inline]
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    /// Value of the property at curve fraction `fraction`.
    #[inline]
    pub fn sample(&self, easing: Easing, fraction: f32) -> f32 {
        lerp_eased(easing, self.from, self.to, fraction)
    }
}

/// The animated properties of an indicator at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorVisual {
    pub alpha: f32,
    /// Uniform scale applied to both axes.
    pub scale: f32,
}

impl IndicatorVisual {
    /// Resting look of an inactive indicator.
    pub const INACTIVE: Self = Self {
        alpha: INACTIVE_ALPHA,
        scale: 1.0,
    };

    /// Resting look of the active indicator.
    pub fn active(active_scale_factor: f32) -> Self {
        Self {
            alpha: ACTIVE_ALPHA,
            scale: active_scale_factor,
        }
    }
}

/// A running alpha/scale animation for one indicator.
#[derive(Debug, Clone)]
pub struct IndicatorAnimation {
    alpha: PropertyCurve,
    scale: PropertyCurve,
    direction: Direction,
    easing: Easing,
    duration: Duration,
    elapsed: Duration,
}

impl IndicatorAnimation {
    /// Create an animation towards the state implied by `direction`.
    pub fn new(
        direction: Direction,
        active_scale_factor: f32,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            alpha: PropertyCurve::new(INACTIVE_ALPHA, ACTIVE_ALPHA),
            scale: PropertyCurve::new(1.0, active_scale_factor),
            direction,
            easing,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear time progress in `0.0..=1.0`. Zero-length animations are
    /// complete from the start.
    pub fn time_fraction(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }

    /// Whether the animation has reached its end.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.time_fraction() >= 1.0
    }

    /// Advance the clock by `dt`. Returns `true` once finished.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    /// Current property values.
    pub fn visual(&self) -> IndicatorVisual {
        let fraction = self.direction.fraction(self.time_fraction());
        IndicatorVisual {
            alpha: self.alpha.sample(self.easing, fraction),
            scale: self.scale.sample(self.easing, fraction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_forward_runs_inactive_to_active() {
        let mut anim =
            IndicatorAnimation::new(Direction::Forward, 1.8, Duration::from_millis(200), Easing::Linear);
        assert_eq!(anim.visual(), IndicatorVisual::INACTIVE);

        assert!(!anim.advance(Duration::from_millis(100)));
        let mid = anim.visual();
        assert!(approx(mid.alpha, 0.75));
        assert!(approx(mid.scale, 1.4));

        assert!(anim.advance(Duration::from_millis(150)));
        assert_eq!(anim.visual(), IndicatorVisual::active(1.8));
    }

    #[test]
    fn test_reverse_is_time_reversed_forward() {
        let duration = Duration::from_millis(200);
        let mut forward = IndicatorAnimation::new(Direction::Forward, 2.0, duration, Easing::EaseIn);
        let mut reverse = IndicatorAnimation::new(Direction::Reverse, 2.0, duration, Easing::EaseIn);

        forward.advance(Duration::from_millis(150));
        reverse.advance(Duration::from_millis(50));

        let f = forward.visual();
        let r = reverse.visual();
        assert!(approx(f.alpha, r.alpha));
        assert!(approx(f.scale, r.scale));
    }

    #[test]
    fn test_reverse_ends_inactive() {
        let mut anim =
            IndicatorAnimation::new(Direction::Reverse, 1.8, Duration::from_millis(200), Easing::Linear);
        assert_eq!(anim.visual(), IndicatorVisual::active(1.8));

        anim.advance(Duration::from_secs(1));
        assert!(anim.is_finished());
        assert_eq!(anim.visual(), IndicatorVisual::INACTIVE);
    }

    #[test]
    fn test_zero_duration_is_immediately_finished() {
        let anim = IndicatorAnimation::new(Direction::Forward, 1.8, Duration::ZERO, Easing::Linear);
        assert!(anim.is_finished());
        assert_eq!(anim.visual(), IndicatorVisual::active(1.8));
    }
}

//! Page indicators.
//!
//! The [`IndicatorController`] keeps one [`IndicatorHandle`] per page when
//! there is more than one page, and drives the activate/deactivate animation
//! pair whenever the selected page changes.
//!
//! # State Machine
//!
//! A single "currently active index" is tracked for the whole strip rather
//! than a flag per handle, so at most one handle is ever active:
//!
//! - `rebuild(count)` discards every handle. With fewer than two pages (or
//!   indicators hidden) the strip stays empty; otherwise `count` inactive
//!   handles are created and handle 0 is activated with a zero-length
//!   animation.
//! - `on_page_selected(i)` is ignored when `i` is already active, when there
//!   are no handles, or when `i` is out of range. Otherwise the previously
//!   active handle plays the activation curve in reverse while handle `i`
//!   plays it forward, concurrently.
//! - Tapping a handle only requests a page jump; the page-selected event that
//!   follows is what moves the active index.

use std::time::Duration;

use crate::animation::{DEFAULT_DURATION, Direction, Easing, IndicatorAnimation, IndicatorVisual};
use crate::config::CarouselConfig;
use crate::geometry::{Color, Orientation, Point, Rect};
use horizon_carousel_core::logging::targets;

/// Selection state of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndicatorState {
    #[default]
    Inactive,
    Active,
}

/// Visual parameters shared by every indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorStyle {
    pub color: Color,
    /// Side length of one (inactive) indicator.
    pub size: f32,
    /// Distance between neighbouring indicators.
    pub spacing: f32,
    pub active_scale_factor: f32,
}

impl IndicatorStyle {
    /// Extract the indicator style from a carousel configuration.
    pub fn from_config(config: &CarouselConfig) -> Self {
        Self {
            color: config.indicator_color,
            size: config.indicator_size,
            spacing: config.indicator_spacing,
            active_scale_factor: config.indicator_active_scale_factor,
        }
    }
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self::from_config(&CarouselConfig::default())
    }
}

/// One page indicator.
#[derive(Debug, Clone)]
pub struct IndicatorHandle {
    position: usize,
    state: IndicatorState,
    visual: IndicatorVisual,
    animation: Option<IndicatorAnimation>,
}

impl IndicatorHandle {
    fn new(position: usize) -> Self {
        Self {
            position,
            state: IndicatorState::Inactive,
            visual: IndicatorVisual::INACTIVE,
            animation: None,
        }
    }

    /// Page this indicator stands for.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn state(&self) -> IndicatorState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == IndicatorState::Active
    }

    /// Current opacity.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.visual.alpha
    }

    /// Current uniform scale.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.visual.scale
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Start animating towards the state implied by `direction`.
    ///
    /// A running animation is replaced.
    fn animate(&mut self, direction: Direction, style: &IndicatorStyle, duration: Duration, easing: Easing) {
        self.state = match direction {
            Direction::Forward => IndicatorState::Active,
            Direction::Reverse => IndicatorState::Inactive,
        };

        let animation = IndicatorAnimation::new(direction, style.active_scale_factor, duration, easing);
        self.visual = animation.visual();
        self.animation = if animation.is_finished() {
            None
        } else {
            Some(animation)
        };
    }

    /// Returns `true` while still animating.
    fn advance(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let finished = animation.advance(dt);
        self.visual = animation.visual();
        if finished {
            self.animation = None;
        }
        !finished
    }

    /// Snap to the resting look of the current state.
    fn settle(&mut self, style: &IndicatorStyle) {
        self.animation = None;
        self.visual = match self.state {
            IndicatorState::Active => IndicatorVisual::active(style.active_scale_factor),
            IndicatorState::Inactive => IndicatorVisual::INACTIVE,
        };
    }
}

/// Owns the indicator handles and their selection state machine.
#[derive(Debug, Clone)]
pub struct IndicatorController {
    handles: Vec<IndicatorHandle>,
    active: Option<usize>,
    style: IndicatorStyle,
    show: bool,
    duration: Duration,
    easing: Easing,
    frame: Rect,
    orientation: Orientation,
}

impl Default for IndicatorController {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorController {
    /// Create an empty controller with the default style.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            active: None,
            style: IndicatorStyle::default(),
            show: true,
            duration: DEFAULT_DURATION,
            easing: Easing::Linear,
            frame: Rect::ZERO,
            orientation: Orientation::Horizontal,
        }
    }

    /// Create a controller styled from `config`.
    pub fn from_config(config: &CarouselConfig) -> Self {
        let mut controller = Self::new();
        controller.style = IndicatorStyle::from_config(config);
        controller.show = config.show_indicators;
        controller
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn handles(&self) -> &[IndicatorHandle] {
        &self.handles
    }

    pub fn handle(&self, index: usize) -> Option<&IndicatorHandle> {
        self.handles.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the strip is absent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Index of the active handle.
    #[inline]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[inline]
    pub fn style(&self) -> &IndicatorStyle {
        &self.style
    }

    #[inline]
    pub fn is_shown(&self) -> bool {
        self.show
    }

    /// Whether any handle is mid-animation.
    pub fn is_animating(&self) -> bool {
        self.handles.iter().any(IndicatorHandle::is_animating)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set whether indicators are built. Takes effect on the next rebuild.
    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    /// Set the duration and easing of page-change animations.
    pub fn set_animation(&mut self, duration: Duration, easing: Easing) {
        self.duration = duration;
        self.easing = easing;
    }

    /// Restyle the existing handles without rebuilding them.
    ///
    /// Handle states are kept; handles at rest take the new look at once.
    pub fn restyle(&mut self, style: IndicatorStyle) {
        self.style = style;
        for handle in &mut self.handles {
            if !handle.is_animating() {
                handle.settle(&self.style);
            }
        }
        tracing::trace!(target: targets::INDICATOR, count = self.handles.len(), "indicators restyled");
    }

    // =========================================================================
    // State machine
    // =========================================================================

    /// Discard every handle and build `count` new ones.
    pub fn rebuild(&mut self, count: usize) {
        self.handles.clear();
        self.active = None;

        if count <= 1 || !self.show {
            tracing::debug!(
                target: targets::INDICATOR,
                count,
                show = self.show,
                "indicator strip left empty"
            );
            return;
        }

        self.handles = (0..count).map(IndicatorHandle::new).collect();
        self.handles[0].animate(Direction::Forward, &self.style, Duration::ZERO, self.easing);
        self.active = Some(0);

        tracing::debug!(target: targets::INDICATOR, count, "indicators rebuilt");
    }

    /// React to a page-selected event. Returns `true` if anything animated.
    pub fn on_page_selected(&mut self, index: usize) -> bool {
        self.select(index, self.duration)
    }

    /// Jump to `index` without animating.
    pub fn snap_to(&mut self, index: usize) -> bool {
        self.select(index, Duration::ZERO)
    }

    fn select(&mut self, index: usize, duration: Duration) -> bool {
        if self.handles.is_empty() {
            tracing::trace!(target: targets::INDICATOR, index, "no indicators, ignoring selection");
            return false;
        }
        if self.active == Some(index) {
            return false;
        }
        if index >= self.handles.len() {
            tracing::debug!(
                target: targets::INDICATOR,
                index,
                count = self.handles.len(),
                "selection out of range"
            );
            return false;
        }

        if let Some(previous) = self.active {
            self.handles[previous].animate(Direction::Reverse, &self.style, duration, self.easing);
        }
        self.handles[index].animate(Direction::Forward, &self.style, duration, self.easing);
        self.active = Some(index);
        true
    }

    /// Advance running animations. Returns `true` while any is still running.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let mut running = false;
        for handle in &mut self.handles {
            running |= handle.advance(dt);
        }
        running
    }

    /// Map a tap on indicator `index` to the page it requests.
    ///
    /// Indicator state is not touched; the resulting page-selected event
    /// drives the transition.
    pub fn tap(&self, index: usize) -> Option<usize> {
        self.handles.get(index).map(IndicatorHandle::position)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Record the strip frame and its main axis, for hit testing.
    pub fn set_frame(&mut self, frame: Rect, orientation: Orientation) {
        self.frame = frame;
        self.orientation = orientation;
    }

    /// The strip frame recorded by the last layout pass.
    #[inline]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Lay out one rest-size rect per handle inside `strip`.
    ///
    /// Indicators are separated by the spacing (half on each inner side, none
    /// on the outer ends) and centred along the strip's main axis, which runs
    /// horizontally when paging horizontally.
    pub fn layout(&self, strip: Rect, orientation: Orientation) -> Vec<Rect> {
        let n = self.handles.len();
        if n == 0 {
            return Vec::new();
        }

        let size = self.style.size;
        let spacing = self.style.spacing;
        let run = n as f32 * size + (n - 1) as f32 * spacing;

        (0..n)
            .map(|i| {
                let along = i as f32 * (size + spacing);
                if orientation.is_horizontal() {
                    let x = strip.left() + (strip.width() - run) / 2.0 + along;
                    let y = strip.top() + (strip.height() - size) / 2.0;
                    Rect::new(x, y, size, size)
                } else {
                    let x = strip.left() + (strip.width() - size) / 2.0;
                    let y = strip.top() + (strip.height() - run) / 2.0 + along;
                    Rect::new(x, y, size, size)
                }
            })
            .collect()
    }

    /// Index of the indicator under `point`, using the recorded frame.
    ///
    /// Each indicator's hit area extends halfway into the spacing around it.
    pub fn indicator_at(&self, point: Point) -> Option<usize> {
        let half = self.style.spacing / 2.0;
        self.layout(self.frame, self.orientation)
            .iter()
            .position(|r| {
                let hit = if self.orientation.is_horizontal() {
                    Rect::new(r.left() - half, self.frame.top(), r.width() + 2.0 * half, self.frame.height())
                } else {
                    Rect::new(self.frame.left(), r.top() - half, self.frame.width(), r.height() + 2.0 * half)
                };
                hit.contains(point)
            })
    }
}

static_assertions::assert_impl_all!(IndicatorController: Send, Sync);

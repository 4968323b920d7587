//! The carousel widget.
//!
//! [`Carousel`] ties the adapter, the paging surface model, the indicator
//! controller and the constraint engine together. The host drives it with:
//!
//! - [`Carousel::layout`] whenever the widget's bounds are (re)assigned;
//! - [`Carousel::process_events`] once per tick, to apply load results and
//!   run work that was waiting for a layout;
//! - [`Carousel::advance`] once per frame, for indicator animations;
//! - the `on_page_*` methods, which mirror the platform pager's callbacks.
//!
//! # Deferred Work
//!
//! Attaching an adapter, changing the item count and jumping to a page all
//! depend on measured bounds. They are queued and run during the first
//! layout pass, or on the next tick once a layout has happened.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_carousel::prelude::*;
//!
//! let loader = Arc::new(FileImageLoader::new(2)?);
//! let mut carousel = Carousel::new(CarouselConfig::default());
//! carousel.set_adapter(CarouselAdapter::with_items(
//!     ImageBinder::new(loader),
//!     vec![ImageItem::resource(1), ImageItem::uri("file:///tmp/a.png")?],
//! ));
//! carousel.set_item_click_listener(|_container, position| {
//!     println!("clicked page {position}");
//! });
//! carousel.layout(Rect::new(0.0, 0.0, 360.0, 240.0));
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::{CarouselAdapter, ItemBinder};
use crate::animation::Easing;
use crate::config::{CarouselConfig, IndicatorPosition, Recompute};
use crate::constraints::{ConstraintEngine, ConstraintSet, LayoutFrames};
use crate::container::{ContainerId, PageContainer};
use crate::error::CarouselResult;
use crate::geometry::{Color, Insets, Orientation, Point, Rect};
use crate::indicator::{IndicatorController, IndicatorStyle};
use crate::pager::{PageSurface, ScrollState};
use horizon_carousel_core::logging::{span_names, targets};
use horizon_carousel_core::{ConnectionId, DeferredQueue, PerfSpan, Signal};

/// Receives paging events.
///
/// Every method has an empty default, so implementors only override what
/// they need.
pub trait PageChangeListener: Send + Sync {
    /// The surface scrolled; `offset` is the fraction of the way from
    /// `position` to the next page, `offset_px` the same in pixels.
    fn on_page_scrolled(&self, position: usize, offset: f32, offset_px: f32) {
        let _ = (position, offset, offset_px);
    }

    /// A page became the current page.
    fn on_page_selected(&self, position: usize) {
        let _ = position;
    }

    fn on_page_scroll_state_changed(&self, state: ScrollState) {
        let _ = state;
    }
}

/// Receives clicks on page containers.
pub trait ItemClickListener: Send + Sync {
    /// `position` is the index occupying `container` when it was clicked.
    fn on_item_click(&self, container: ContainerId, position: usize);
}

impl<F> ItemClickListener for F
where
    F: Fn(ContainerId, usize) + Send + Sync,
{
    fn on_item_click(&self, container: ContainerId, position: usize) {
        self(container, position)
    }
}

/// A paging event as delivered to page-change listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    Scrolled {
        position: usize,
        offset: f32,
        offset_px: f32,
    },
    Selected(usize),
    ScrollStateChanged(ScrollState),
}

impl PageEvent {
    fn dispatch(&self, listener: &dyn PageChangeListener) {
        match *self {
            PageEvent::Scrolled {
                position,
                offset,
                offset_px,
            } => listener.on_page_scrolled(position, offset, offset_px),
            PageEvent::Selected(position) => listener.on_page_selected(position),
            PageEvent::ScrollStateChanged(state) => listener.on_page_scroll_state_changed(state),
        }
    }
}

/// The current page and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrentPageState {
    current: usize,
    previous: Option<usize>,
}

impl CurrentPageState {
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// The page that was current before the last change.
    #[inline]
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    fn select(&mut self, index: usize) {
        if index != self.current {
            self.previous = Some(self.current);
            self.current = index;
        }
    }
}

/// Work that waits for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CarouselTask {
    Refresh(Recompute),
    GoTo(usize),
}

/// A paged carousel over items of type `T`, bound by `B`.
pub struct Carousel<T, B> {
    config: CarouselConfig,
    adapter: Option<CarouselAdapter<T, B>>,
    surface: PageSurface,
    page: CurrentPageState,
    indicators: IndicatorController,
    constraints: ConstraintSet,
    padding: Insets,
    frames: LayoutFrames,
    bounds: Option<Rect>,
    laid_out: bool,
    tasks: DeferredQueue<CarouselTask>,
    page_events: Signal<PageEvent>,
    page_listener: Option<ConnectionId>,
    item_clicked: Signal<(ContainerId, usize)>,
    click_listener: Option<ConnectionId>,
}

impl<T, B: ItemBinder<T>> Carousel<T, B> {
    /// Create a carousel with no adapter.
    pub fn new(config: CarouselConfig) -> Self {
        let constraints = ConstraintEngine::compute(&config, false);
        let mut surface = PageSurface::new();
        surface.set_orientation(constraints.orientation);

        Self {
            indicators: IndicatorController::from_config(&config),
            config,
            adapter: None,
            surface,
            page: CurrentPageState::default(),
            constraints,
            padding: Insets::ZERO,
            frames: LayoutFrames::default(),
            bounds: None,
            laid_out: false,
            tasks: DeferredQueue::new(),
            page_events: Signal::new(),
            page_listener: None,
            item_clicked: Signal::new(),
            click_listener: None,
        }
    }

    /// Create a carousel configured from a TOML document.
    pub fn from_toml_str(source: &str) -> CarouselResult<Self> {
        Ok(Self::new(CarouselConfig::from_toml_str(source)?))
    }

    // =========================================================================
    // Adapter and items
    // =========================================================================

    /// Attach `adapter`, replacing (and dropping) any previous one.
    ///
    /// Pages are bound right away; indicators, constraints and padding are
    /// refreshed on the next layout pass.
    pub fn set_adapter(&mut self, adapter: CarouselAdapter<T, B>) {
        if let Some(mut old) = self.adapter.take() {
            // Destroying the containers cancels their outstanding loads.
            old.pool_mut().clear();
        }
        self.surface.reset();
        self.page = CurrentPageState::default();

        horizon_carousel_core::carousel_debug!(items = adapter.item_count(), "adapter attached");
        self.adapter = Some(adapter);
        self.sync_pages();
        self.tasks.post_unique(CarouselTask::Refresh(Recompute::STRUCTURE));
    }

    pub fn adapter(&self) -> Option<&CarouselAdapter<T, B>> {
        self.adapter.as_ref()
    }

    /// Mutable access to the adapter.
    ///
    /// Replacing the item list through this skips page bookkeeping; use
    /// [`set_items`](Self::set_items) for that.
    pub fn adapter_mut(&mut self) -> Option<&mut CarouselAdapter<T, B>> {
        self.adapter.as_mut()
    }

    /// Replace the adapter's items.
    ///
    /// Returns `false` if no adapter is attached.
    pub fn set_items(&mut self, items: Vec<T>) -> bool {
        let Some(adapter) = self.adapter.as_mut() else {
            tracing::debug!(target: targets::CAROUSEL, "set_items without an adapter");
            return false;
        };

        let old_count = adapter.item_count();
        adapter.set_items(items);
        let new_count = adapter.item_count();

        self.sync_pages();
        if old_count != new_count {
            tracing::debug!(target: targets::CAROUSEL, old_count, new_count, "item count changed");
            self.tasks.post_unique(CarouselTask::Refresh(Recompute::STRUCTURE));
        }
        true
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.surface.count()
    }

    /// Bring realised pages in line with the item count and current page,
    /// binding every page that entered.
    fn sync_pages(&mut self) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        self.surface.set_count(adapter.item_count());
        let entered = self.surface.realign(adapter.pool_mut());

        let page_size = self.laid_out.then_some(self.frames.pager.size);
        for (page, id) in entered {
            adapter.bind_container(id, page);
            if let (Some(size), Some(container)) = (page_size, adapter.container_mut(id)) {
                container.set_size(size);
            }
        }
        self.page.select(self.surface.current());
    }

    // =========================================================================
    // Host drive
    // =========================================================================

    /// Lay the carousel out inside `bounds`.
    ///
    /// Work waiting for a layout runs afterwards, including image loads that
    /// are sized to their containers.
    pub fn layout(&mut self, bounds: Rect) {
        let _perf = PerfSpan::new(span_names::LAYOUT);

        self.bounds = Some(bounds);
        self.resolve_frames();
        self.laid_out = true;
        self.run_tasks();

        if let Some(adapter) = self.adapter.as_mut() {
            adapter.run_container_jobs();
        }
    }

    /// The "next tick": apply finished loads and run pending work.
    ///
    /// Returns the number of load results applied.
    pub fn process_events(&mut self) -> usize {
        let Some(adapter) = self.adapter.as_mut() else {
            return 0;
        };
        let applied = adapter.process_completions();

        if self.laid_out {
            self.run_tasks();
            if let Some(adapter) = self.adapter.as_mut() {
                adapter.run_container_jobs();
            }
        }
        applied
    }

    /// Advance indicator animations. Returns `true` while any is running.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.indicators.advance(dt)
    }

    /// Set the duration and easing of indicator transitions.
    pub fn set_indicator_animation(&mut self, duration: Duration, easing: Easing) {
        self.indicators.set_animation(duration, easing);
    }

    fn run_tasks(&mut self) {
        let tasks = self.tasks.take_all();
        if tasks.is_empty() {
            return;
        }
        let _span = tracing::debug_span!(span_names::TASK, count = tasks.len()).entered();
        for task in tasks {
            match task {
                CarouselTask::Refresh(work) => self.apply_recompute(work),
                CarouselTask::GoTo(index) => self.go_to(index),
            }
        }
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// The platform pager selected page `index`.
    ///
    /// The listener is always notified. Pages and indicators only move for an
    /// index that exists.
    pub fn on_page_selected(&mut self, index: usize) {
        if index < self.surface.count() && self.surface.set_current(index) {
            self.sync_pages();
        }
        self.indicators.on_page_selected(index);
        self.page_events.emit(PageEvent::Selected(index));
    }

    /// The platform pager scrolled.
    pub fn on_page_scrolled(&mut self, position: usize, offset: f32, offset_px: f32) {
        self.page_events.emit(PageEvent::Scrolled {
            position,
            offset,
            offset_px,
        });
    }

    /// The platform pager changed scroll state.
    pub fn on_page_scroll_state_changed(&mut self, state: ScrollState) {
        self.surface.set_scroll_state(state);
        self.page_events.emit(PageEvent::ScrollStateChanged(state));
    }

    /// Scroll smoothly to page `index`.
    ///
    /// Before the first layout the jump is deferred; a later call replaces an
    /// earlier pending one.
    pub fn go_to(&mut self, index: usize) {
        if !self.laid_out {
            self.tasks.cancel_where(|task| matches!(task, CarouselTask::GoTo(_)));
            self.tasks.post(CarouselTask::GoTo(index));
            tracing::trace!(target: targets::CAROUSEL, index, "go_to deferred until layout");
            return;
        }

        let count = self.surface.count();
        if count == 0 {
            return;
        }
        let target = index.min(count - 1);
        if target == self.surface.current() {
            return;
        }

        self.on_page_scroll_state_changed(ScrollState::Settling);
        self.on_page_selected(target);
        self.on_page_scroll_state_changed(ScrollState::Idle);
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.surface.current()
    }

    #[inline]
    pub fn page_state(&self) -> CurrentPageState {
        self.page
    }

    #[inline]
    pub fn scroll_state(&self) -> ScrollState {
        self.surface.scroll_state()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Install the page-change listener, replacing any previous one.
    ///
    /// The new listener is told the current page straight away.
    pub fn set_page_change_listener(&mut self, listener: Arc<dyn PageChangeListener>) {
        self.clear_page_change_listener();
        let id = self
            .page_events
            .connect(move |event: &PageEvent| event.dispatch(listener.as_ref()));
        self.page_listener = Some(id);
        self.page_events
            .emit_to(id, PageEvent::Selected(self.surface.current()));
    }

    pub fn clear_page_change_listener(&mut self) {
        if let Some(id) = self.page_listener.take() {
            self.page_events.disconnect(id);
        }
    }

    /// Install the item click listener, replacing any previous one.
    pub fn set_item_click_listener<L>(&mut self, listener: L)
    where
        L: ItemClickListener + 'static,
    {
        self.clear_item_click_listener();
        let id = self
            .item_clicked
            .connect(move |&(container, position): &(ContainerId, usize)| {
                listener.on_item_click(container, position)
            });
        self.click_listener = Some(id);
    }

    pub fn clear_item_click_listener(&mut self) {
        if let Some(id) = self.click_listener.take() {
            self.item_clicked.disconnect(id);
        }
    }

    /// The platform reported a click on `container`.
    ///
    /// Returns the index occupying the container now, if any.
    pub fn click_container(&mut self, container: ContainerId) -> Option<usize> {
        let position = self.adapter.as_ref()?.index_for_container(container)?;
        self.item_clicked.emit((container, position));
        Some(position)
    }

    /// Indicator `index` was tapped; scrolls to its page.
    pub fn tap_indicator(&mut self, index: usize) -> Option<usize> {
        let page = self.indicators.tap(index)?;
        self.go_to(page);
        Some(page)
    }

    /// A tap landed at `point`; scrolls to the page of the indicator under it.
    pub fn tap_at(&mut self, point: Point) -> Option<usize> {
        let index = self.indicators.indicator_at(point)?;
        self.tap_indicator(index)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    #[inline]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Replace the configuration, doing only the work the change requires.
    pub fn set_config(&mut self, config: CarouselConfig) -> Recompute {
        let work = CarouselConfig::diff(&self.config, &config);
        self.config = config;
        if !work.is_empty() {
            self.apply_recompute(work);
        }
        work
    }

    fn update_config(&mut self, update: impl FnOnce(CarouselConfig) -> CarouselConfig) -> Recompute {
        let config = update(self.config.clone());
        self.set_config(config)
    }

    pub fn set_indicator_position(&mut self, position: IndicatorPosition) -> Recompute {
        self.update_config(|c| c.with_indicator_position(position))
    }

    pub fn set_inset_indicators(&mut self, inset: bool) -> Recompute {
        self.update_config(|c| c.with_inset_indicators(inset))
    }

    pub fn set_indicator_offset(&mut self, offset: f32) -> Recompute {
        self.update_config(|c| c.with_indicator_offset(offset))
    }

    pub fn set_show_indicators(&mut self, show: bool) -> Recompute {
        self.update_config(|c| c.with_show_indicators(show))
    }

    pub fn set_indicator_color(&mut self, color: Color) -> Recompute {
        self.update_config(|c| c.with_indicator_color(color))
    }

    pub fn set_indicator_size(&mut self, size: f32) -> Recompute {
        self.update_config(|c| c.with_indicator_size(size))
    }

    pub fn set_indicator_spacing(&mut self, spacing: f32) -> Recompute {
        self.update_config(|c| c.with_indicator_spacing(spacing))
    }

    pub fn set_indicator_active_scale_factor(&mut self, factor: f32) -> Recompute {
        self.update_config(|c| c.with_indicator_active_scale_factor(factor))
    }

    pub fn set_background_color(&mut self, color: Color) -> Recompute {
        self.update_config(|c| c.with_background_color(color))
    }

    /// Apply exactly the recompute steps in `work`.
    fn apply_recompute(&mut self, mut work: Recompute) {
        let mut relayout = work.affects_layout();

        if work.contains(Recompute::BACKGROUND) {
            tracing::trace!(
                target: targets::CAROUSEL,
                color = %self.config.background_color,
                "pager background changed"
            );
        }

        if work.contains(Recompute::INDICATORS) {
            let had_indicators = !self.indicators.is_empty();
            self.indicators.set_show(self.config.show_indicators);
            self.indicators.restyle(IndicatorStyle::from_config(&self.config));
            self.indicators.rebuild(self.surface.count());
            if self.surface.current() != 0 {
                self.indicators.snap_to(self.surface.current());
            }
            // Padding and attachments depend on whether a strip exists.
            if had_indicators != !self.indicators.is_empty() {
                work |= Recompute::ORIENTATION | Recompute::CONSTRAINTS | Recompute::PADDING;
            }
        } else if work.contains(Recompute::INDICATOR_STYLE) {
            let style = IndicatorStyle::from_config(&self.config);
            // The strip is as thick as one indicator, and padding follows the size.
            if style.size != self.indicators.style().size {
                work |= Recompute::PADDING;
                relayout = true;
            }
            self.indicators.restyle(style);
        }

        let has_indicators = !self.indicators.is_empty();
        if work.intersects(Recompute::CONSTRAINTS | Recompute::ORIENTATION) {
            self.constraints = ConstraintEngine::compute(&self.config, has_indicators);
            self.surface.set_orientation(self.constraints.orientation);
        }
        if work.contains(Recompute::PADDING) {
            self.padding = ConstraintEngine::padding(&self.config, has_indicators);
        }

        tracing::debug!(target: targets::CAROUSEL, ?work, relayout, "configuration applied");
        if relayout {
            self.resolve_frames();
        }
    }

    /// Resolve frames for the current bounds and size every realised page.
    fn resolve_frames(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };

        let content = bounds.inset(self.padding);
        self.frames = ConstraintEngine::resolve(&self.constraints, content, self.indicators.style().size);
        self.surface.set_frame(self.frames.pager);
        self.indicators
            .set_frame(self.frames.strip.unwrap_or(Rect::ZERO), self.constraints.orientation);

        tracing::trace!(target: targets::LAYOUT, ?bounds, frames = ?self.frames, "carousel laid out");

        let page_size = self.frames.pager.size;
        if let Some(adapter) = self.adapter.as_mut() {
            let realised: Vec<ContainerId> = self.surface.realised().map(|(_, id)| id).collect();
            for id in realised {
                if let Some(container) = adapter.container_mut(id) {
                    container.set_size(page_size);
                }
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Frames from the last layout pass.
    #[inline]
    pub fn frames(&self) -> LayoutFrames {
        self.frames
    }

    /// Padding compensating for scaled-up indicators.
    #[inline]
    pub fn padding(&self) -> Insets {
        self.padding
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.surface.orientation()
    }

    #[inline]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    #[inline]
    pub fn indicators(&self) -> &IndicatorController {
        &self.indicators
    }

    #[inline]
    pub fn surface(&self) -> &PageSurface {
        &self.surface
    }

    /// Background of the paging surface.
    #[inline]
    pub fn pager_background(&self) -> Color {
        self.config.background_color
    }

    pub fn container(&self, id: ContainerId) -> Option<&PageContainer> {
        self.adapter.as_ref()?.container(id)
    }

    /// Container currently showing page `index`.
    pub fn container_for_page(&self, index: usize) -> Option<&PageContainer> {
        self.container(self.surface.container_for(index)?)
    }

    /// Check whether a layout pass has happened.
    #[inline]
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// Check whether work is waiting for a layout pass or the next tick.
    pub fn has_pending_work(&self) -> bool {
        self.tasks.has_pending()
    }
}

impl<T, B: ItemBinder<T>> Default for Carousel<T, B> {
    fn default() -> Self {
        Self::new(CarouselConfig::default())
    }
}

impl<T, B: std::fmt::Debug> std::fmt::Debug for Carousel<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("config", &self.config)
            .field("adapter", &self.adapter)
            .field("current", &self.page)
            .field("indicators", &self.indicators.len())
            .field("frames", &self.frames)
            .field("laid_out", &self.laid_out)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(
    Carousel<crate::adapter::images::ImageItem, crate::adapter::images::ImageBinder>: Send
);

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use std::collections::HashMap;

    use super::*;
    use crate::adapter::{BindContext, DataChange};

    #[derive(Debug, Default)]
    struct LabelBinder;

    impl ItemBinder<&'static str> for LabelBinder {
        fn bind_item(&self, _item: &&'static str, container: &mut PageContainer, _ctx: &BindContext<'_>) {
            container.set_loading_visible(false);
        }
    }

    /// Remembers which label each container shows and reconciles list
    /// replacements by rebinding only the indices whose label changed.
    #[derive(Default)]
    struct DiffingBinder {
        shown: Arc<Mutex<HashMap<ContainerId, &'static str>>>,
    }

    impl ItemBinder<&'static str> for DiffingBinder {
        fn bind_item(&self, item: &&'static str, container: &mut PageContainer, _ctx: &BindContext<'_>) {
            self.shown.lock().insert(container.id(), *item);
            container.set_loading_visible(false);
        }

        fn handle_data_change(
            &mut self,
            old: &[&'static str],
            new: &[&'static str],
            changes: &mut DataChange,
        ) -> bool {
            for (index, item) in new.iter().enumerate() {
                if old.get(index) != Some(item) {
                    changes.rebind(index);
                }
            }
            true
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<PageEvent>>,
    }

    impl PageChangeListener for RecordingListener {
        fn on_page_scrolled(&self, position: usize, offset: f32, offset_px: f32) {
            self.events.lock().push(PageEvent::Scrolled {
                position,
                offset,
                offset_px,
            });
        }

        fn on_page_selected(&self, position: usize) {
            self.events.lock().push(PageEvent::Selected(position));
        }

        fn on_page_scroll_state_changed(&self, state: ScrollState) {
            self.events.lock().push(PageEvent::ScrollStateChanged(state));
        }
    }

    const BOUNDS: Rect = Rect::new(0.0, 0.0, 300.0, 200.0);

    fn setup(items: Vec<&'static str>) -> Carousel<&'static str, LabelBinder> {
        let mut carousel = Carousel::new(CarouselConfig::default());
        carousel.set_adapter(CarouselAdapter::with_items(LabelBinder, items));
        carousel
    }

    #[test]
    fn test_refresh_waits_for_layout() {
        let mut carousel = setup(vec!["a", "b", "c"]);
        assert!(carousel.indicators().is_empty());
        assert!(carousel.has_pending_work());

        carousel.layout(BOUNDS);
        assert_eq!(carousel.indicators().len(), 3);
        assert_eq!(carousel.indicators().active_index(), Some(0));
        assert!(!carousel.has_pending_work());
    }

    #[test]
    fn test_handled_data_change_updates_shown_page() {
        let binder = DiffingBinder::default();
        let shown = binder.shown.clone();
        let mut carousel = Carousel::new(CarouselConfig::default());
        carousel.set_adapter(CarouselAdapter::with_items(binder, vec!["old0", "old1"]));
        carousel.layout(BOUNDS);

        let page0 = carousel.container_for_page(0).unwrap().id();
        let page1 = carousel.container_for_page(1).unwrap().id();
        assert_eq!(shown.lock().get(&page0), Some(&"old0"));

        carousel.set_items(vec!["new0", "new1"]);
        assert_eq!(shown.lock().get(&page0), Some(&"new0"));
        assert_eq!(shown.lock().get(&page1), Some(&"new1"));
        assert_eq!(carousel.container_for_page(0).unwrap().bound_index(), Some(0));
    }

    #[test]
    fn test_pages_bound_and_sized() {
        let mut carousel = setup(vec!["a", "b", "c"]);
        carousel.layout(BOUNDS);

        let page = carousel.container_for_page(0).unwrap();
        assert_eq!(page.bound_index(), Some(0));
        assert!(!page.is_loading_visible());
        assert_eq!(page.size(), carousel.frames().pager.size);
        assert!(carousel.container_for_page(2).is_none());
    }

    #[test]
    fn test_page_selected_moves_window_and_indicator() {
        let mut carousel = setup(vec!["a", "b", "c", "d"]);
        carousel.layout(BOUNDS);
        carousel.on_page_selected(2);

        assert_eq!(carousel.current_page(), 2);
        assert_eq!(carousel.page_state().previous(), Some(0));
        assert_eq!(carousel.indicators().active_index(), Some(2));
        assert_eq!(carousel.container_for_page(3).unwrap().bound_index(), Some(3));
        assert_eq!(
            carousel.container_for_page(3).unwrap().size(),
            carousel.frames().pager.size
        );
    }

    #[test]
    fn test_go_to_scrolls_with_settling() {
        let mut carousel = setup(vec!["a", "b", "c"]);
        carousel.layout(BOUNDS);
        let listener = Arc::new(RecordingListener::default());
        carousel.set_page_change_listener(listener.clone());
        listener.events.lock().clear();

        carousel.go_to(7);
        assert_eq!(
            *listener.events.lock(),
            vec![
                PageEvent::ScrollStateChanged(ScrollState::Settling),
                PageEvent::Selected(2),
                PageEvent::ScrollStateChanged(ScrollState::Idle),
            ]
        );
        assert_eq!(carousel.scroll_state(), ScrollState::Idle);
    }

    #[test]
    fn test_single_page_selection_still_notifies() {
        let mut carousel = setup(vec!["only"]);
        carousel.layout(BOUNDS);
        let listener = Arc::new(RecordingListener::default());
        carousel.set_page_change_listener(listener.clone());

        carousel.on_page_selected(0);
        assert!(carousel.indicators().is_empty());
        assert_eq!(
            *listener.events.lock(),
            vec![PageEvent::Selected(0), PageEvent::Selected(0)]
        );
    }

    #[test]
    fn test_replacing_listener_disconnects_old() {
        let mut carousel = setup(vec!["a", "b"]);
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());
        carousel.set_page_change_listener(first.clone());
        carousel.set_page_change_listener(second.clone());

        carousel.on_page_scrolled(0, 0.5, 150.0);
        assert_eq!(first.events.lock().len(), 1);
        assert_eq!(second.events.lock().len(), 2);
    }

    #[test]
    fn test_click_listener() {
        let mut carousel = setup(vec!["a", "b"]);
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let sink = clicks.clone();
        carousel.set_item_click_listener(move |_: ContainerId, position: usize| sink.lock().push(position));

        let id = carousel.surface().container_for(1).unwrap();
        assert_eq!(carousel.click_container(id), Some(1));
        assert_eq!(*clicks.lock(), vec![1]);

        carousel.clear_item_click_listener();
        carousel.click_container(id);
        assert_eq!(clicks.lock().len(), 1);
    }

    #[test]
    fn test_show_indicators_toggle() {
        let mut carousel = setup(vec!["a", "b"]);
        carousel.set_inset_indicators(false);
        carousel.layout(BOUNDS);
        assert!(carousel.frames().strip.is_some());
        assert_eq!(carousel.padding().bottom, 4.0);

        let work = carousel.set_show_indicators(false);
        assert!(work.contains(Recompute::INDICATORS));
        assert!(carousel.indicators().is_empty());
        assert_eq!(carousel.frames().strip, None);
        assert_eq!(carousel.padding(), Insets::ZERO);
        assert_eq!(carousel.frames().pager, BOUNDS);
    }

    #[test]
    fn test_position_change_keeps_current_page() {
        let mut carousel = setup(vec!["a", "b", "c"]);
        carousel.layout(BOUNDS);
        carousel.on_page_selected(1);

        carousel.set_indicator_position(IndicatorPosition::End);
        assert_eq!(carousel.orientation(), Orientation::Vertical);
        assert_eq!(carousel.indicators().active_index(), Some(1));
        assert!(!carousel.indicators().is_animating());
    }

    #[test]
    fn test_size_change_relayouts_strip() {
        let mut carousel = setup(vec!["a", "b"]);
        carousel.layout(BOUNDS);
        assert_eq!(carousel.frames().strip.unwrap().height(), 5.0);

        let work = carousel.set_indicator_size(8.0);
        assert_eq!(work, Recompute::INDICATOR_STYLE);
        assert_eq!(carousel.frames().strip.unwrap().height(), 8.0);
        assert_eq!(carousel.indicators().len(), 2);
    }

    #[test]
    fn test_from_toml() {
        let carousel: Carousel<&'static str, LabelBinder> =
            Carousel::from_toml_str("indicator_position = \"start\"\ninset_indicators = false\n").unwrap();
        assert_eq!(carousel.config().indicator_position, IndicatorPosition::Start);
        assert!(!carousel.config().inset_indicators);

        assert!(Carousel::<&'static str, LabelBinder>::from_toml_str("indicator_size = -1.0").is_err());
    }
}

//! A deterministic model of the paging surface.
//!
//! The platform pager is external; [`PageSurface`] mirrors what it does to
//! the container pool. It keeps the pages within one of the current page
//! realised, each in its own container, and reports which pages entered the
//! window so the caller can bind them.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::container::{ContainerId, ContainerPool};
use crate::geometry::{Orientation, Rect};
use horizon_carousel_core::logging::targets;

/// Scroll state reported by the paging surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollState {
    /// Not scrolling.
    #[default]
    Idle,
    /// The user is dragging.
    Dragging,
    /// Animating towards a final page.
    Settling,
}

/// Paging surface state: page count, current page and realised containers.
#[derive(Debug, Default)]
pub struct PageSurface {
    count: usize,
    current: usize,
    orientation: Orientation,
    frame: Rect,
    realised: BTreeMap<usize, ContainerId>,
    scroll_state: ScrollState,
}

impl PageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Set the page count, clamping the current page into range.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.current = self.current.min(count.saturating_sub(1));
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Move to `index`, clamped to the last page.
    ///
    /// Returns `true` if the current page changed.
    pub fn set_current(&mut self, index: usize) -> bool {
        let index = index.min(self.count.saturating_sub(1));
        if index == self.current {
            return false;
        }
        tracing::trace!(target: targets::CAROUSEL, from = self.current, to = index, "current page changed");
        self.current = index;
        true
    }

    /// Pages that should be realised around the current page.
    pub fn window(&self) -> Option<RangeInclusive<usize>> {
        if self.count == 0 {
            return None;
        }
        let start = self.current.saturating_sub(1);
        let end = (self.current + 1).min(self.count - 1);
        Some(start..=end)
    }

    /// Bring the realised pages in line with the window.
    ///
    /// Pages leaving the window release their containers first so an
    /// entering page can pick one up. Returns the pages that entered, with
    /// their containers, in page order.
    pub fn realign(&mut self, pool: &mut ContainerPool) -> Vec<(usize, ContainerId)> {
        let window = self.window();
        let in_window = |page: &usize| window.as_ref().is_some_and(|w| w.contains(page));

        let leaving: Vec<usize> = self.realised.keys().copied().filter(|p| !in_window(p)).collect();
        for page in leaving {
            if let Some(id) = self.realised.remove(&page) {
                pool.release(id);
            }
        }

        let mut entered = Vec::new();
        for page in window.into_iter().flatten() {
            if self.realised.contains_key(&page) {
                continue;
            }
            let (id, recycled) = pool.obtain();
            tracing::trace!(target: targets::ADAPTER, page, ?id, recycled, "page realised");
            self.realised.insert(page, id);
            entered.push((page, id));
        }
        entered
    }

    /// Forget every realised page and return to page 0.
    ///
    /// The containers themselves belong to the pool.
    pub fn reset(&mut self) {
        self.realised.clear();
        self.current = 0;
        self.count = 0;
        self.scroll_state = ScrollState::Idle;
    }

    /// Container showing `page`, if it is realised.
    pub fn container_for(&self, page: usize) -> Option<ContainerId> {
        self.realised.get(&page).copied()
    }

    /// Page shown by `container`, if any.
    pub fn page_for(&self, container: ContainerId) -> Option<usize> {
        self.realised
            .iter()
            .find_map(|(&page, &id)| (id == container).then_some(page))
    }

    /// Realised pages and their containers, in page order.
    pub fn realised(&self) -> impl Iterator<Item = (usize, ContainerId)> + '_ {
        self.realised.iter().map(|(&page, &id)| (page, id))
    }

    #[inline]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    #[inline]
    pub fn scroll_state(&self) -> ScrollState {
        self.scroll_state
    }

    /// Returns `true` if the state changed.
    pub fn set_scroll_state(&mut self, state: ScrollState) -> bool {
        if self.scroll_state == state {
            return false;
        }
        self.scroll_state = state;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(count: usize) -> (PageSurface, ContainerPool) {
        let mut surface = PageSurface::new();
        let mut pool = ContainerPool::new();
        surface.set_count(count);
        surface.realign(&mut pool);
        (surface, pool)
    }

    fn pages(surface: &PageSurface) -> Vec<usize> {
        surface.realised().map(|(page, _)| page).collect()
    }

    #[test]
    fn test_window_clamps() {
        let (surface, _) = setup(0);
        assert_eq!(surface.window(), None);

        let (mut surface, _) = setup(5);
        assert_eq!(surface.window(), Some(0..=1));
        surface.set_current(4);
        assert_eq!(surface.window(), Some(3..=4));
        surface.set_current(2);
        assert_eq!(surface.window(), Some(1..=3));
    }

    #[test]
    fn test_set_current_clamps_and_reports_change() {
        let (mut surface, _) = setup(3);
        assert!(!surface.set_current(0));
        assert!(surface.set_current(9));
        assert_eq!(surface.current(), 2);
        assert!(!surface.set_current(2));

        surface.set_count(1);
        assert_eq!(surface.current(), 0);
    }

    #[test]
    fn test_realign_recycles_leaving_container() {
        let (mut surface, mut pool) = setup(5);
        assert_eq!(pages(&surface), vec![0, 1]);
        surface.set_current(1);
        assert_eq!(surface.realign(&mut pool).len(), 1);
        assert_eq!(pages(&surface), vec![0, 1, 2]);
        assert_eq!(pool.len(), 3);

        let page_zero = surface.container_for(0).unwrap();
        surface.set_current(2);
        let entered = surface.realign(&mut pool);

        assert_eq!(entered, vec![(3, page_zero)]);
        assert_eq!(pages(&surface), vec![1, 2, 3]);
        assert_eq!(pool.len(), 3);
        assert_eq!(surface.page_for(page_zero), Some(3));
    }

    #[test]
    fn test_long_jump_destroys_excess() {
        let (mut surface, mut pool) = setup(10);
        surface.set_current(1);
        surface.realign(&mut pool);
        assert_eq!(pool.len(), 3);

        surface.set_current(8);
        let entered = surface.realign(&mut pool);
        assert_eq!(entered.len(), 3);
        assert_eq!(pages(&surface), vec![7, 8, 9]);
        // One released container was recycled, the other two destroyed
        // and replaced.
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_shrinking_count_releases_pages() {
        let (mut surface, mut pool) = setup(3);
        surface.set_current(2);
        surface.realign(&mut pool);
        assert_eq!(pages(&surface), vec![1, 2]);

        surface.set_count(0);
        assert!(surface.realign(&mut pool).is_empty());
        assert_eq!(surface.realised().count(), 0);
        assert_eq!(pool.len(), 1);
        assert!(pool.free_container().is_some());
    }

    #[test]
    fn test_scroll_state_change() {
        let mut surface = PageSurface::new();
        assert!(!surface.set_scroll_state(ScrollState::Idle));
        assert!(surface.set_scroll_state(ScrollState::Dragging));
        assert_eq!(surface.scroll_state(), ScrollState::Dragging);
    }
}

//! The generic adapter and recycling contract.
//!
//! A [`CarouselAdapter`] owns the item list, the container pool and an
//! [`ItemBinder`] that knows how to draw one item into one container. The
//! adapter enforces the parts of binding every item type shares:
//!
//! - every bind starts from a reset container (loading shown, error hidden,
//!   previous load cancelled), so state never leaks between occupants;
//! - clicks resolve to whatever index occupies a container at click time;
//! - load results arrive through a channel and are applied on the UI thread
//!   only if the container has not been rebound since.
//!
//! Two binders ship with the crate: [`images::ImageBinder`] for
//! [`images::ImageItem`]s and [`views::ViewBinder`] for pre-rendered
//! [`views::ViewHandle`]s.

pub mod images;
pub mod views;

use std::collections::BTreeSet;
use std::ops::Range;

use crossbeam_channel::{Receiver, Sender};

use crate::container::{ContainerId, ContainerPool, PageContainer};
use crate::loader::LoadCompletion;
use horizon_carousel_core::logging::{span_names, targets};

/// Per-bind information handed to an [`ItemBinder`].
#[derive(Debug)]
pub struct BindContext<'a> {
    index: usize,
    completions: &'a Sender<LoadCompletion>,
}

impl<'a> BindContext<'a> {
    /// Index of the item being bound.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// A sender for delivering load results back to the UI thread.
    pub fn completion_sender(&self) -> Sender<LoadCompletion> {
        self.completions.clone()
    }
}

/// Item indices a binder wants rebound after reconciling a list replacement.
///
/// Only indices currently shown by a container and still in range of the
/// new list are rebound; the rest are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DataChange {
    rebind: BTreeSet<usize>,
}

impl DataChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a rebind of whatever container shows item `index`.
    pub fn rebind(&mut self, index: usize) {
        self.rebind.insert(index);
    }

    pub fn rebind_range(&mut self, range: Range<usize>) {
        self.rebind.extend(range);
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.rebind.contains(&index)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rebind.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rebind.iter().copied()
    }
}

/// Draws items of type `T` into page containers.
pub trait ItemBinder<T>: Send {
    /// Bind `item` into `container`.
    ///
    /// The container has already been reset for this bind. Implementations
    /// must be idempotent: binding the same item twice yields the same
    /// visible state as binding it once.
    fn bind_item(&self, item: &T, container: &mut PageContainer, ctx: &BindContext<'_>);

    /// Reconcile a list replacement.
    ///
    /// Return `true` to take over reconciliation: the adapter then rebinds
    /// only the indices recorded in `changes`. Returning `false` (the
    /// default) makes the adapter rebind every shown container.
    fn handle_data_change(&mut self, old: &[T], new: &[T], changes: &mut DataChange) -> bool {
        let _ = (old, new, changes);
        false
    }
}

/// Owns items, containers and a binder.
pub struct CarouselAdapter<T, B> {
    items: Vec<T>,
    binder: B,
    pool: ContainerPool,
    completion_tx: Sender<LoadCompletion>,
    completion_rx: Receiver<LoadCompletion>,
}

impl<T, B: ItemBinder<T>> CarouselAdapter<T, B> {
    /// Create an empty adapter.
    pub fn new(binder: B) -> Self {
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();
        Self {
            items: Vec::new(),
            binder,
            pool: ContainerPool::new(),
            completion_tx,
            completion_rx,
        }
    }

    /// Create an adapter with an initial item list.
    pub fn with_items(binder: B, items: Vec<T>) -> Self {
        let mut adapter = Self::new(binder);
        adapter.items = items;
        adapter
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Replace the item list.
    ///
    /// Returns whether the binder reconciled the change itself. When it did,
    /// only the containers it asked for are rebound; otherwise every bound
    /// container still within range is.
    pub fn set_items(&mut self, items: Vec<T>) -> bool {
        let old = std::mem::replace(&mut self.items, items);
        let mut changes = DataChange::new();
        let handled = self.binder.handle_data_change(&old, &self.items, &mut changes);

        tracing::debug!(
            target: targets::ADAPTER,
            old_count = old.len(),
            new_count = self.items.len(),
            handled,
            requested = changes.rebind.len(),
            "items replaced"
        );

        if handled {
            self.rebind_where(|index| changes.contains(index));
        } else {
            self.rebind_all();
        }
        handled
    }

    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn binder(&self) -> &B {
        &self.binder
    }

    #[inline]
    pub fn binder_mut(&mut self) -> &mut B {
        &mut self.binder
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Create a fresh container from the template.
    pub fn create_container(&mut self) -> ContainerId {
        self.pool.create()
    }

    #[inline]
    pub fn container(&self, id: ContainerId) -> Option<&PageContainer> {
        self.pool.get(id)
    }

    #[inline]
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut PageContainer> {
        self.pool.get_mut(id)
    }

    #[inline]
    pub fn pool(&self) -> &ContainerPool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut ContainerPool {
        &mut self.pool
    }

    /// Bind item `index` into container `id`.
    ///
    /// Returns `false` if either does not exist.
    pub fn bind_container(&mut self, id: ContainerId, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            tracing::debug!(target: targets::ADAPTER, index, count = self.items.len(), "bind index out of range");
            return false;
        };
        let Some(container) = self.pool.get_mut(id) else {
            return false;
        };

        let _span = tracing::trace_span!(span_names::BIND, index).entered();
        container.reset_for_bind(index);
        let ctx = BindContext {
            index,
            completions: &self.completion_tx,
        };
        self.binder.bind_item(item, container, &ctx);
        true
    }

    /// Rebind every container whose item index is still in range.
    pub fn rebind_all(&mut self) -> usize {
        self.rebind_where(|_| true)
    }

    fn rebind_where(&mut self, wanted: impl Fn(usize) -> bool) -> usize {
        let bound: Vec<(ContainerId, usize)> = self
            .pool
            .iter()
            .filter_map(|c| c.bound_index().map(|index| (c.id(), index)))
            .filter(|&(_, index)| index < self.items.len() && wanted(index))
            .collect();

        bound
            .into_iter()
            .filter(|&(id, index)| self.bind_container(id, index))
            .count()
    }

    /// Item index currently shown by container `id`, resolved now.
    pub fn index_for_container(&self, id: ContainerId) -> Option<usize> {
        self.pool.get(id).and_then(|c| c.bound_index())
    }

    // =========================================================================
    // Deferred work
    // =========================================================================

    /// Run layout-dependent jobs on every measured container.
    pub fn run_container_jobs(&mut self) -> usize {
        self.pool.iter_mut().map(|c| c.run_jobs()).sum()
    }

    /// Apply load results that have arrived since the last call.
    ///
    /// Returns the number applied; stale results are dropped.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            let Some(container) = self.pool.get_mut(completion.container) else {
                tracing::trace!(target: targets::IMAGE, "load finished for a destroyed container");
                continue;
            };
            if container.apply_load(completion.generation, completion.outcome, completion.error_style)
            {
                applied += 1;
            }
        }
        applied
    }
}

impl<T, B: std::fmt::Debug> std::fmt::Debug for CarouselAdapter<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselAdapter")
            .field("item_count", &self.items.len())
            .field("binder", &self.binder)
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Records every bind it performs.
    #[derive(Default)]
    struct RecordingBinder {
        binds: Arc<Mutex<Vec<(usize, &'static str)>>>,
        reconcile: Option<Vec<usize>>,
    }

    impl ItemBinder<&'static str> for RecordingBinder {
        fn bind_item(&self, item: &&'static str, container: &mut PageContainer, ctx: &BindContext<'_>) {
            self.binds.lock().push((ctx.index(), *item));
            container.set_loading_visible(false);
        }

        fn handle_data_change(
            &mut self,
            _old: &[&'static str],
            _new: &[&'static str],
            changes: &mut DataChange,
        ) -> bool {
            let Some(indices) = &self.reconcile else {
                return false;
            };
            for &index in indices {
                changes.rebind(index);
            }
            true
        }
    }

    fn setup(reconcile: Option<Vec<usize>>) -> (CarouselAdapter<&'static str, RecordingBinder>, Arc<Mutex<Vec<(usize, &'static str)>>>) {
        let binds = Arc::new(Mutex::new(Vec::new()));
        let binder = RecordingBinder {
            binds: binds.clone(),
            reconcile,
        };
        (CarouselAdapter::with_items(binder, vec!["a", "b", "c"]), binds)
    }

    #[test]
    fn test_bind_out_of_range() {
        let (mut adapter, binds) = setup(None);
        let id = adapter.create_container();
        assert!(!adapter.bind_container(id, 3));
        assert!(binds.lock().is_empty());
        assert_eq!(adapter.container(id).unwrap().bound_index(), None);
    }

    #[test]
    fn test_click_resolves_current_occupant() {
        let (mut adapter, _) = setup(None);
        let id = adapter.create_container();
        adapter.bind_container(id, 0);
        assert_eq!(adapter.index_for_container(id), Some(0));

        adapter.bind_container(id, 2);
        assert_eq!(adapter.index_for_container(id), Some(2));
    }

    #[test]
    fn test_set_items_rebinds_unless_handled() {
        let (mut adapter, binds) = setup(None);
        let a = adapter.create_container();
        let b = adapter.create_container();
        adapter.bind_container(a, 0);
        adapter.bind_container(b, 2);
        binds.lock().clear();

        // Index 2 falls out of range and is left for the pager to release.
        assert!(!adapter.set_items(vec!["x", "y"]));
        assert_eq!(*binds.lock(), vec![(0, "x")]);

        let (mut adapter, binds) = setup(Some(Vec::new()));
        let a = adapter.create_container();
        adapter.bind_container(a, 0);
        binds.lock().clear();

        assert!(adapter.set_items(vec!["x"]));
        assert!(binds.lock().is_empty());
    }

    #[test]
    fn test_handled_change_rebinds_requested_indices() {
        let (mut adapter, binds) = setup(Some(vec![1, 5]));
        let a = adapter.create_container();
        let b = adapter.create_container();
        adapter.bind_container(a, 0);
        adapter.bind_container(b, 1);
        binds.lock().clear();

        // 5 is shown by no container and is skipped.
        assert!(adapter.set_items(vec!["x", "y", "z"]));
        assert_eq!(*binds.lock(), vec![(1, "y")]);
        assert_eq!(adapter.index_for_container(b), Some(1));
    }

    #[test]
    fn test_bind_resets_container_first() {
        let (mut adapter, _) = setup(None);
        let id = adapter.create_container();
        let c = adapter.container_mut(id).unwrap();
        c.set_error_visible(true);
        c.set_content_visible(false);

        adapter.bind_container(id, 1);
        let c = adapter.container(id).unwrap();
        assert!(!c.is_error_visible());
        assert!(c.is_content_visible());
        assert_eq!(c.bound_index(), Some(1));
    }
}

//! Page containers and the recycling pool.
//!
//! A [`PageContainer`] is the reusable slot one page is drawn into. It holds
//! the page's nested content plus two independently toggled overlays, a
//! loading indicator and an error indicator. Containers are owned by the
//! [`ContainerPool`] and addressed by [`ContainerId`]; binders borrow them
//! for the duration of a bind.
//!
//! Every bind starts with [`PageContainer::reset_for_bind`], which bumps the
//! container's generation, cancels any outstanding load and drops deferred
//! jobs, so nothing from a previous occupant survives into the next one.

use std::fmt;

use slotmap::{SlotMap, new_key_type};

use crate::adapter::views::ViewHandle;
use crate::error::LoadError;
use crate::geometry::{Color, Size};
use crate::loader::{ErrorStyle, ImageContent, LoadReceipt};
use horizon_carousel_core::DeferredQueue;
use horizon_carousel_core::logging::targets;

new_key_type! {
    /// Identifier of a container in a [`ContainerPool`].
    pub struct ContainerId;
}

/// A job that must wait until the container has been measured.
pub type ContainerJob = Box<dyn FnOnce(&mut PageContainer) + Send>;

/// How an image is fitted into its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Scale to fit, keeping aspect ratio; may scale up.
    #[default]
    FitCenter,
    /// Like `FitCenter`, but never scale up.
    CenterInside,
}

/// The image element placed inside a container by image binders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSurface {
    content: Option<ImageContent>,
    scale_mode: ScaleMode,
}

impl ImageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn content(&self) -> Option<&ImageContent> {
        self.content.as_ref()
    }

    pub fn set_content(&mut self, content: ImageContent) {
        self.content = Some(content);
    }

    pub fn clear(&mut self) {
        self.content = None;
    }

    #[inline]
    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.scale_mode = mode;
    }
}

/// A nested element inside a container.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerContent {
    Image(ImageSurface),
    View(ViewHandle),
}

impl ContainerContent {
    /// Turn this element into an image surface, keeping an existing one.
    fn make_image(&mut self) -> &mut ImageSurface {
        match self {
            ContainerContent::Image(surface) => surface,
            ContainerContent::View(_) => {
                *self = ContainerContent::Image(ImageSurface::new());
                self.make_image()
            }
        }
    }
}

/// The reusable visual slot a page is drawn into.
pub struct PageContainer {
    id: ContainerId,
    size: Size,
    child: Option<ContainerContent>,
    content_visible: bool,
    loading_visible: bool,
    error_visible: bool,
    error_style: Option<ErrorStyle>,
    bound_index: Option<usize>,
    generation: u64,
    in_flight: Option<LoadReceipt>,
    jobs: DeferredQueue<ContainerJob>,
}

impl PageContainer {
    /// Create a container from the canonical template: empty, loading shown.
    fn new(id: ContainerId) -> Self {
        Self {
            id,
            size: Size::ZERO,
            child: None,
            content_visible: true,
            loading_visible: true,
            error_visible: false,
            error_style: None,
            bound_index: None,
            generation: 0,
            in_flight: None,
            jobs: DeferredQueue::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Size assigned by the last layout pass. Zero until measured.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn is_measured(&self) -> bool {
        !self.size.is_empty()
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Index of the item currently bound here.
    #[inline]
    pub fn bound_index(&self) -> Option<usize> {
        self.bound_index
    }

    /// Bind generation; bumped on every bind and detach.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    #[inline]
    pub fn is_content_visible(&self) -> bool {
        self.content_visible
    }

    pub fn set_content_visible(&mut self, visible: bool) {
        self.content_visible = visible;
    }

    #[inline]
    pub fn is_loading_visible(&self) -> bool {
        self.loading_visible
    }

    pub fn set_loading_visible(&mut self, visible: bool) {
        self.loading_visible = visible;
    }

    #[inline]
    pub fn is_error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn set_error_visible(&mut self, visible: bool) {
        self.error_visible = visible;
    }

    /// Tint and icon size of the error indicator, once a load has failed.
    #[inline]
    pub fn error_style(&self) -> Option<ErrorStyle> {
        self.error_style
    }

    /// Error indicator tint, if one has been applied.
    pub fn error_tint(&self) -> Option<Color> {
        self.error_style.map(|s| s.tint)
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// The nested element, as a slice of at most one.
    pub fn children(&self) -> &[ContainerContent] {
        self.child.as_slice()
    }

    /// Attach `child`, replacing the current nested element.
    pub fn attach(&mut self, child: ContainerContent) {
        self.child = Some(child);
    }

    pub fn detach_all(&mut self) {
        self.child = None;
    }

    /// The nested element, if it is an image surface.
    pub fn image_surface(&self) -> Option<&ImageSurface> {
        match &self.child {
            Some(ContainerContent::Image(surface)) => Some(surface),
            _ => None,
        }
    }

    pub fn image_surface_mut(&mut self) -> Option<&mut ImageSurface> {
        match &mut self.child {
            Some(ContainerContent::Image(surface)) => Some(surface),
            _ => None,
        }
    }

    /// Reuse the nested image surface, or replace the nested element with a
    /// new one.
    pub fn ensure_image_surface(&mut self) -> &mut ImageSurface {
        self.child
            .get_or_insert_with(|| ContainerContent::Image(ImageSurface::new()))
            .make_image()
    }

    /// The attached view, if the nested element is one.
    pub fn view(&self) -> Option<&ViewHandle> {
        match &self.child {
            Some(ContainerContent::View(view)) => Some(view),
            _ => None,
        }
    }

    // =========================================================================
    // Bind lifecycle
    // =========================================================================

    /// Prepare for binding item `index`: invalidate the previous occupant's
    /// load and jobs, then show content and loading with the error hidden.
    pub fn reset_for_bind(&mut self, index: usize) {
        self.invalidate();
        self.bound_index = Some(index);
        self.content_visible = true;
        self.loading_visible = true;
        self.error_visible = false;
        self.error_style = None;
    }

    /// Release the container from its item without touching what is drawn.
    pub fn detach(&mut self) {
        self.invalidate();
        self.bound_index = None;
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        // Dropping the receipt cancels the outstanding request.
        self.in_flight = None;
        self.jobs.clear();
    }

    /// Record an outstanding load issued for the current generation.
    pub fn track_load(&mut self, receipt: LoadReceipt) {
        self.in_flight = Some(receipt);
    }

    pub fn has_load_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Queue a job for after the next layout pass.
    pub fn post_after_layout(&mut self, job: ContainerJob) {
        self.jobs.post(job);
    }

    pub fn has_pending_jobs(&self) -> bool {
        self.jobs.has_pending()
    }

    /// Run deferred jobs once the container has a size. Returns how many ran.
    pub fn run_jobs(&mut self) -> usize {
        if !self.is_measured() || !self.jobs.has_pending() {
            return 0;
        }
        let jobs = self.jobs.take_all();
        let count = jobs.len();
        for job in jobs {
            job(self);
        }
        count
    }

    /// Apply a load result issued at `generation`.
    ///
    /// Returns `false`, leaving the container untouched, when the result is
    /// stale (the container was rebound or detached since).
    pub fn apply_load(
        &mut self,
        generation: u64,
        outcome: Result<ImageContent, LoadError>,
        error_style: ErrorStyle,
    ) -> bool {
        if generation != self.generation {
            tracing::trace!(
                target: targets::IMAGE,
                expected = self.generation,
                got = generation,
                "dropping stale load result"
            );
            return false;
        }

        if let Some(receipt) = self.in_flight.take() {
            receipt.complete();
        }

        match outcome {
            Ok(content) => {
                self.loading_visible = false;
                self.error_visible = false;
                self.ensure_image_surface().set_content(content);
            }
            Err(err) => {
                tracing::warn!(
                    target: targets::IMAGE,
                    index = ?self.bound_index,
                    error = %err,
                    "failed to load image"
                );
                self.loading_visible = false;
                self.content_visible = false;
                self.error_visible = true;
                self.error_style = Some(error_style);
            }
        }
        true
    }
}

impl fmt::Debug for PageContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContainer")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("bound_index", &self.bound_index)
            .field("generation", &self.generation)
            .field("content_visible", &self.content_visible)
            .field("loading_visible", &self.loading_visible)
            .field("error_visible", &self.error_visible)
            .field("child", &self.child.is_some())
            .field("pending_jobs", &self.jobs.pending_count())
            .finish()
    }
}

/// Owner of every page container.
///
/// Containers released by the pager go to a one-deep free list; a second
/// release while the free slot is occupied destroys the container.
#[derive(Debug, Default)]
pub struct ContainerPool {
    containers: SlotMap<ContainerId, PageContainer>,
    free: Option<ContainerId>,
}

impl ContainerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh container from the template.
    pub fn create(&mut self) -> ContainerId {
        let id = self.containers.insert_with_key(PageContainer::new);
        tracing::trace!(target: targets::ADAPTER, ?id, "created container");
        id
    }

    /// Take the free container if there is one, else create a new one.
    ///
    /// Returns the id and whether it was recycled.
    pub fn obtain(&mut self) -> (ContainerId, bool) {
        match self.free.take() {
            Some(id) if self.containers.contains_key(id) => (id, true),
            _ => (self.create(), false),
        }
    }

    /// Return a container the pager no longer shows.
    pub fn release(&mut self, id: ContainerId) {
        let Some(container) = self.containers.get_mut(id) else {
            return;
        };
        container.detach();

        if self.free.is_none() {
            self.free = Some(id);
        } else {
            self.destroy(id);
        }
    }

    /// Destroy a container, cancelling its outstanding load.
    pub fn destroy(&mut self, id: ContainerId) -> bool {
        if self.free == Some(id) {
            self.free = None;
        }
        let removed = self.containers.remove(id).is_some();
        if removed {
            tracing::trace!(target: targets::ADAPTER, ?id, "destroyed container");
        }
        removed
    }

    /// Destroy every container.
    pub fn clear(&mut self) {
        self.free = None;
        self.containers.clear();
    }

    #[inline]
    pub fn get(&self, id: ContainerId) -> Option<&PageContainer> {
        self.containers.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut PageContainer> {
        self.containers.get_mut(id)
    }

    /// Id of the container waiting in the free list.
    pub fn free_container(&self) -> Option<ContainerId> {
        self.free
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageContainer> {
        self.containers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PageContainer> {
        self.containers.values_mut()
    }
}

static_assertions::assert_impl_all!(PageContainer: Send);
static_assertions::assert_impl_all!(ContainerPool: Send);

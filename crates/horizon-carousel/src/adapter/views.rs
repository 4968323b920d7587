//! Binder for pre-rendered host views.
//!
//! Items are opaque [`ViewHandle`]s. Binding detaches whatever the container
//! held and attaches the item's view; nothing is loaded, so the loading
//! indicator is hidden immediately.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{BindContext, ItemBinder};
use crate::container::{ContainerContent, PageContainer};

/// A shared reference to host-owned visual content.
///
/// Two handles are equal when they point at the same view.
#[derive(Clone)]
pub struct ViewHandle(Arc<dyn Any + Send + Sync>);

impl ViewHandle {
    /// Wrap a host view.
    pub fn new<V: Any + Send + Sync>(view: V) -> Self {
        Self(Arc::new(view))
    }

    /// Borrow the view as its concrete type.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.0.downcast_ref::<V>()
    }

    /// Check whether both handles refer to the same view.
    pub fn ptr_eq(&self, other: &ViewHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ViewHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewHandle")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Binds [`ViewHandle`] items by attaching them directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewBinder;

impl ViewBinder {
    pub fn new() -> Self {
        Self
    }
}

impl ItemBinder<ViewHandle> for ViewBinder {
    fn bind_item(&self, item: &ViewHandle, container: &mut PageContainer, _ctx: &BindContext<'_>) {
        container.set_loading_visible(false);
        // A view may only live in one container at a time.
        container.detach_all();
        container.attach(ContainerContent::View(item.clone()));
    }
}

static_assertions::assert_impl_all!(ViewHandle: Send, Sync);

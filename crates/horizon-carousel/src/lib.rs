//! Horizon Carousel - a paged content carousel widget.
//!
//! The carousel shows a sequence of items one page at a time and keeps a row
//! of position indicators in step with the current page. It is built from:
//!
//! - [`adapter`]: the generic binding/recycling contract, with image and
//!   view binders;
//! - [`indicator`]: the indicator state machine and its animations;
//! - [`constraints`]: where the indicator strip sits relative to the pager;
//! - [`carousel`]: the widget that wires the three together.
//!
//! The crate does no drawing and owns no event loop. The host forwards
//! layout, tick and paging events in and reads frames, container state and
//! indicator visuals back out.
//!
//! # Example
//!
//! ```
//! use horizon_carousel::prelude::*;
//!
//! let mut carousel = Carousel::new(CarouselConfig::default());
//! carousel.set_adapter(CarouselAdapter::with_items(
//!     ViewBinder::new(),
//!     vec![ViewHandle::new("first"), ViewHandle::new("second")],
//! ));
//! carousel.layout(Rect::new(0.0, 0.0, 320.0, 240.0));
//!
//! assert_eq!(carousel.indicators().len(), 2);
//! carousel.on_page_selected(1);
//! assert_eq!(carousel.indicators().active_index(), Some(1));
//! ```

pub use horizon_carousel_core::*;

pub mod adapter;
pub mod animation;
pub mod carousel;
pub mod config;
pub mod constraints;
pub mod container;
pub mod error;
pub mod geometry;
pub mod indicator;
pub mod loader;
pub mod pager;

pub use adapter::images::{ImageBinder, ImageItem, ResourceImage, UriImage};
pub use adapter::views::{ViewBinder, ViewHandle};
pub use adapter::{BindContext, CarouselAdapter, DataChange, ItemBinder};
pub use carousel::{Carousel, CurrentPageState, ItemClickListener, PageChangeListener, PageEvent};
pub use config::{CarouselConfig, IndicatorPosition, Recompute};
pub use constraints::{ConstraintEngine, ConstraintSet, LayoutFrames};
pub use container::{ContainerId, PageContainer};
pub use error::{CarouselError, CarouselResult, ConfigError, LoadError};
pub use geometry::{Color, Insets, Orientation, Point, Rect, Size};
pub use indicator::{IndicatorController, IndicatorState};
pub use loader::{FileImageLoader, ImageLoader, ImageSource, ManualImageLoader};
pub use pager::ScrollState;

/// Commonly used types.
pub mod prelude {
    pub use crate::adapter::images::{ImageBinder, ImageItem};
    pub use crate::adapter::views::{ViewBinder, ViewHandle};
    pub use crate::adapter::{CarouselAdapter, DataChange, ItemBinder};
    pub use crate::carousel::{Carousel, ItemClickListener, PageChangeListener};
    pub use crate::config::{CarouselConfig, IndicatorPosition};
    pub use crate::container::ContainerId;
    pub use crate::geometry::{Color, Rect};
    pub use crate::loader::{FileImageLoader, ImageLoader};
    pub use crate::pager::ScrollState;
}

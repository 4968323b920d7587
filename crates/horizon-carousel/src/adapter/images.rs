//! Image items and their binder.
//!
//! [`ImageItem`] is either a bundled [`ResourceImage`], shown synchronously,
//! or a [`UriImage`], fetched through the binder's [`ImageLoader`]. A URI
//! load is sized to its container, so it is queued on the container and only
//! issued once the layout pass has given the container a size.

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::{BindContext, ItemBinder};
use crate::container::{PageContainer, ScaleMode};
use crate::geometry::Color;
use crate::loader::{
    ErrorStyle, ImageContent, ImageLoader, ImageSource, LoadCallback, LoadCompletion, LoadReceipt,
    ResourceId,
};
use horizon_carousel_core::logging::targets;

/// An image bundled with the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceImage {
    id: ResourceId,
}

impl ResourceImage {
    pub fn new(id: ResourceId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Show the resource immediately; this cannot fail.
    fn load_into(&self, container: &mut PageContainer) {
        container.set_loading_visible(false);
        container.set_error_visible(false);

        let surface = container.ensure_image_surface();
        surface.set_scale_mode(ScaleMode::FitCenter);
        surface.set_content(ImageContent::Resource(self.id));
    }
}

/// An image fetched from a URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UriImage {
    uri: Url,
}

impl UriImage {
    pub fn new(uri: Url) -> Self {
        Self { uri }
    }

    /// Parse `uri` into an image item.
    pub fn parse(uri: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(uri)?))
    }

    #[inline]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Queue a load sized to the container for after layout.
    fn load_into(&self, binder: &ImageBinder, container: &mut PageContainer, ctx: &BindContext<'_>) {
        let surface = container.ensure_image_surface();
        surface.set_scale_mode(ScaleMode::CenterInside);
        surface.clear();

        let loader = Arc::clone(&binder.loader);
        let completions = ctx.completion_sender();
        let source = ImageSource::Uri(self.uri.clone());
        let error_style = binder.error_style();

        container.post_after_layout(Box::new(move |container: &mut PageContainer| {
            let size = container.size();
            let (id, generation) = (container.id(), container.generation());
            let (width, height) = (size.width.round() as u32, size.height.round() as u32);

            tracing::debug!(
                target: targets::IMAGE,
                %source,
                width,
                height,
                "requesting image"
            );

            let on_done: LoadCallback = Box::new(move |outcome| {
                // The carousel may already be gone; nothing to do then.
                let _ = completions.send(LoadCompletion {
                    container: id,
                    generation,
                    outcome,
                    error_style,
                });
            });
            let token = loader.load(&source, width, height, on_done);
            container.track_load(LoadReceipt::new(token, loader));
        }));
    }
}

/// An item shown by [`ImageBinder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageItem {
    Resource(ResourceImage),
    Uri(UriImage),
}

impl ImageItem {
    /// A bundled image.
    pub fn resource(id: u32) -> Self {
        ImageItem::Resource(ResourceImage::new(ResourceId(id)))
    }

    /// A remote or file image.
    pub fn uri(uri: &str) -> Result<Self, url::ParseError> {
        Ok(ImageItem::Uri(UriImage::parse(uri)?))
    }

    /// Where this image comes from.
    pub fn source(&self) -> ImageSource {
        match self {
            ImageItem::Resource(image) => ImageSource::Resource(image.id()),
            ImageItem::Uri(image) => ImageSource::Uri(image.uri().clone()),
        }
    }

    /// Load this image into `container`'s image surface.
    pub fn load_into(&self, binder: &ImageBinder, container: &mut PageContainer, ctx: &BindContext<'_>) {
        match self {
            ImageItem::Resource(image) => image.load_into(container),
            ImageItem::Uri(image) => image.load_into(binder, container, ctx),
        }
    }
}

impl From<ResourceImage> for ImageItem {
    fn from(image: ResourceImage) -> Self {
        ImageItem::Resource(image)
    }
}

impl From<UriImage> for ImageItem {
    fn from(image: UriImage) -> Self {
        ImageItem::Uri(image)
    }
}

impl From<Url> for ImageItem {
    fn from(uri: Url) -> Self {
        ImageItem::Uri(UriImage::new(uri))
    }
}

/// Binds [`ImageItem`]s into a single reused image surface per container.
#[derive(Clone)]
pub struct ImageBinder {
    loader: Arc<dyn ImageLoader>,
    error_tint: Color,
    error_icon_size: f32,
}

impl ImageBinder {
    /// Create a binder that fetches URI images through `loader`.
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        let style = ErrorStyle::default();
        Self {
            loader,
            error_tint: style.tint,
            error_icon_size: style.icon_size,
        }
    }

    /// Set the error indicator tint using builder pattern.
    #[inline]
    pub fn with_error_tint(mut self, tint: Color) -> Self {
        self.error_tint = tint;
        self
    }

    /// Set the error icon size using builder pattern.
    #[inline]
    pub fn with_error_icon_size(mut self, size: f32) -> Self {
        self.error_icon_size = size;
        self
    }

    #[inline]
    pub fn error_tint(&self) -> Color {
        self.error_tint
    }

    /// Change the tint applied to future load failures.
    pub fn set_error_tint(&mut self, tint: Color) {
        self.error_tint = tint;
    }

    #[inline]
    pub fn error_icon_size(&self) -> f32 {
        self.error_icon_size
    }

    pub fn set_error_icon_size(&mut self, size: f32) {
        self.error_icon_size = size;
    }

    /// Error indicator style applied on load failure.
    pub fn error_style(&self) -> ErrorStyle {
        ErrorStyle {
            tint: self.error_tint,
            icon_size: self.error_icon_size,
        }
    }

    /// The loader URI images are fetched with.
    pub fn loader(&self) -> &Arc<dyn ImageLoader> {
        &self.loader
    }
}

impl ItemBinder<ImageItem> for ImageBinder {
    fn bind_item(&self, item: &ImageItem, container: &mut PageContainer, ctx: &BindContext<'_>) {
        item.load_into(self, container, ctx);
    }
}

impl fmt::Debug for ImageBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBinder")
            .field("error_tint", &self.error_tint)
            .field("error_icon_size", &self.error_icon_size)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ImageBinder: Send, Sync);
static_assertions::assert_impl_all!(ImageItem: Send, Sync);

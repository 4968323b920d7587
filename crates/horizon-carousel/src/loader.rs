//! The image-loading boundary.
//!
//! Image fetching is an external capability described by [`ImageLoader`]: a
//! request is issued with a target size and a one-shot callback, and may be
//! cancelled through the returned [`LoadToken`]. Loaders call back on
//! whatever thread they like; the carousel marshals every result onto the UI
//! thread as a [`LoadCompletion`] sent through a channel, and applies it only
//! if the container's bind generation still matches.
//!
//! Two loaders ship with the crate:
//!
//! - [`FileImageLoader`] decodes `file://` URIs on a small worker pool.
//! - [`ManualImageLoader`] records requests and lets the host resolve them,
//!   for hosts that already own a fetch pipeline (and for tests).

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;
use image::imageops::FilterType;
use parking_lot::Mutex;
use url::Url;

use crate::container::ContainerId;
use crate::error::{CarouselResult, LoadError};
use crate::geometry::Color;
use horizon_carousel_core::logging::targets;

/// Identifier of a bundled image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Resource(ResourceId),
    Uri(Url),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Resource(id) => write!(f, "resource:{}", id.0),
            ImageSource::Uri(url) => f.write_str(url.as_str()),
        }
    }
}

/// Decoded or referenced image content shown by a container.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageContent {
    /// A bundled resource, drawn by the host.
    Resource(ResourceId),
    /// Decoded pixels.
    Bitmap(Arc<RgbaImage>),
}

/// Handle to an issued load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadToken(u64);

/// Global counter for generating unique load tokens.
static NEXT_LOAD_TOKEN: AtomicU64 = AtomicU64::new(1);

impl LoadToken {
    /// Allocate a fresh token. Loader implementations call this per request.
    pub fn next() -> Self {
        Self(NEXT_LOAD_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value of this token.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// One-shot result callback handed to a loader.
pub type LoadCallback = Box<dyn FnOnce(Result<ImageContent, LoadError>) + Send>;

/// An asynchronous image fetching capability.
///
/// Implementations must be callable from the UI thread without blocking.
/// `cancel` is advisory: a loader may still invoke the callback of a
/// cancelled request, and the carousel drops such results itself.
pub trait ImageLoader: Send + Sync {
    /// Start loading `source`, sized to fit `width` x `height`.
    fn load(&self, source: &ImageSource, width: u32, height: u32, on_done: LoadCallback)
    -> LoadToken;

    /// Stop caring about an outstanding request.
    fn cancel(&self, token: LoadToken);
}

/// How the error indicator of a container is drawn after a failed load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStyle {
    pub tint: Color,
    /// Side length of the error icon.
    pub icon_size: f32,
}

impl Default for ErrorStyle {
    fn default() -> Self {
        Self {
            tint: Color::MATERIAL_RED,
            icon_size: 48.0,
        }
    }
}

/// A load result on its way back to the UI thread.
#[derive(Debug)]
pub struct LoadCompletion {
    /// Container the load was issued for.
    pub container: ContainerId,
    /// Bind generation of the container when the load was issued.
    pub generation: u64,
    pub outcome: Result<ImageContent, LoadError>,
    pub error_style: ErrorStyle,
}

/// Proof of an outstanding load held by a container.
///
/// Dropping an armed receipt cancels the request, so a container that is
/// rebound or destroyed never leaves a load running on its behalf.
pub struct LoadReceipt {
    token: LoadToken,
    loader: Arc<dyn ImageLoader>,
    armed: bool,
}

impl LoadReceipt {
    pub fn new(token: LoadToken, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            token,
            loader,
            armed: true,
        }
    }

    #[inline]
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Mark the request as completed; dropping the receipt no longer cancels.
    pub fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadReceipt {
    fn drop(&mut self) {
        if self.armed {
            tracing::trace!(target: targets::IMAGE, token = self.token.0, "cancelling load");
            self.loader.cancel(self.token);
        }
    }
}

impl fmt::Debug for LoadReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadReceipt")
            .field("token", &self.token)
            .field("armed", &self.armed)
            .finish()
    }
}

// ============================================================================
// FileImageLoader
// ============================================================================

/// Internal message sent to worker threads.
enum WorkerRequest {
    Decode {
        token: LoadToken,
        path: PathBuf,
        width: u32,
        height: u32,
        on_done: LoadCallback,
    },
    Shutdown,
}

/// Decodes `file://` images on background threads.
///
/// Images larger than the requested size are scaled down to fit inside it
/// with their aspect ratio kept (center-inside); smaller images are never
/// scaled up. Callbacks of cancelled requests are dropped without being
/// invoked.
pub struct FileImageLoader {
    request_tx: Sender<WorkerRequest>,
    requests: Arc<Mutex<RequestSet>>,
    workers: Vec<JoinHandle<()>>,
}

/// Tokens of queued or decoding requests, and the subset cancelled.
///
/// A token leaves both sets once its worker is done with it, so cancelling
/// a finished request records nothing.
#[derive(Debug, Default)]
struct RequestSet {
    in_flight: HashSet<LoadToken>,
    cancelled: HashSet<LoadToken>,
}

impl RequestSet {
    /// Finish `token` if it was cancelled.
    fn take_cancelled(&mut self, token: LoadToken) -> bool {
        if self.cancelled.remove(&token) {
            self.in_flight.remove(&token);
            true
        } else {
            false
        }
    }

    /// Drop `token` from both sets; returns whether it had been cancelled.
    fn finish(&mut self, token: LoadToken) -> bool {
        self.in_flight.remove(&token);
        self.cancelled.remove(&token)
    }
}

impl FileImageLoader {
    /// Spawn a loader with `worker_threads` decoding threads (at least one).
    pub fn new(worker_threads: usize) -> CarouselResult<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<WorkerRequest>();
        let requests = Arc::new(Mutex::new(RequestSet::default()));

        let count = worker_threads.max(1);
        let mut workers = Vec::with_capacity(count);
        for i in 0..count {
            let rx = request_rx.clone();
            let requests = Arc::clone(&requests);
            let handle = thread::Builder::new()
                .name(format!("carousel-image-worker-{i}"))
                .spawn(move || Self::worker_thread(rx, requests))?;
            workers.push(handle);
        }

        tracing::debug!(target: targets::IMAGE, workers = count, "file image loader started");

        Ok(Self {
            request_tx,
            requests,
            workers,
        })
    }

    fn worker_thread(request_rx: Receiver<WorkerRequest>, requests: Arc<Mutex<RequestSet>>) {
        while let Ok(request) = request_rx.recv() {
            match request {
                WorkerRequest::Decode {
                    token,
                    path,
                    width,
                    height,
                    on_done,
                } => {
                    if requests.lock().take_cancelled(token) {
                        continue;
                    }
                    let result = Self::decode_file(&path, width, height);
                    if requests.lock().finish(token) {
                        continue;
                    }
                    on_done(result);
                }
                WorkerRequest::Shutdown => break,
            }
        }
    }

    fn decode_file(path: &std::path::Path, width: u32, height: u32) -> Result<ImageContent, LoadError> {
        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                LoadError::NotFound(path.display().to_string())
            }
            other => LoadError::Decode(other.to_string()),
        })?;

        let rgba = img.to_rgba8();
        let (w, h) = fit_inside(rgba.width(), rgba.height(), width, height);
        let rgba = if (w, h) == rgba.dimensions() {
            rgba
        } else {
            image::imageops::resize(&rgba, w, h, FilterType::Triangle)
        };

        Ok(ImageContent::Bitmap(Arc::new(rgba)))
    }
}

impl ImageLoader for FileImageLoader {
    fn load(
        &self,
        source: &ImageSource,
        width: u32,
        height: u32,
        on_done: LoadCallback,
    ) -> LoadToken {
        let token = LoadToken::next();

        let path = match source {
            ImageSource::Resource(id) => {
                on_done(Err(LoadError::Other(format!(
                    "resource {} is not loadable from files",
                    id.0
                ))));
                return token;
            }
            ImageSource::Uri(url) if url.scheme() != "file" => {
                on_done(Err(LoadError::Other(format!(
                    "unsupported uri scheme: {}",
                    url.scheme()
                ))));
                return token;
            }
            ImageSource::Uri(url) => match url.to_file_path() {
                Ok(path) => path,
                Err(()) => {
                    on_done(Err(LoadError::NotFound(url.to_string())));
                    return token;
                }
            },
        };

        let request = WorkerRequest::Decode {
            token,
            path,
            width,
            height,
            on_done,
        };
        self.requests.lock().in_flight.insert(token);
        if let Err(err) = self.request_tx.send(request) {
            self.requests.lock().finish(token);
            // Workers are gone; report the failure through the callback.
            if let WorkerRequest::Decode { on_done, .. } = err.into_inner() {
                on_done(Err(LoadError::Other("image workers have shut down".into())));
            }
        }
        token
    }

    fn cancel(&self, token: LoadToken) {
        let mut requests = self.requests.lock();
        if requests.in_flight.contains(&token) {
            requests.cancelled.insert(token);
        }
    }
}

impl Drop for FileImageLoader {
    fn drop(&mut self) {
        for _ in 0..self.workers.len() {
            let _ = self.request_tx.send(WorkerRequest::Shutdown);
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl fmt::Debug for FileImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileImageLoader")
            .field("workers", &self.workers.len())
            .finish()
    }
}

/// Largest size with the source aspect ratio that fits in the target box,
/// never larger than the source. A zero target dimension is unconstrained.
fn fit_inside(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (src_w, src_h);
    }
    let max_w = if max_w == 0 { src_w } else { max_w };
    let max_h = if max_h == 0 { src_h } else { max_h };

    let scale = (max_w as f64 / src_w as f64)
        .min(max_h as f64 / src_h as f64)
        .min(1.0);
    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

// ============================================================================
// ManualImageLoader
// ============================================================================

/// A request recorded by [`ManualImageLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub token: LoadToken,
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
}

struct Pending {
    request: RecordedRequest,
    on_done: LoadCallback,
}

/// A loader whose requests are resolved explicitly by the host.
///
/// Requests are recorded and stay pending until [`resolve`](Self::resolve)
/// is called, from any thread. Cancellation is recorded but does not drop
/// the request, so a host may still deliver a result the carousel no longer
/// wants.
#[derive(Default)]
pub struct ManualImageLoader {
    pending: Mutex<Vec<Pending>>,
    history: Mutex<Vec<RecordedRequest>>,
    cancelled: Mutex<Vec<LoadToken>>,
}

impl ManualImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request ever issued, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.history.lock().clone()
    }

    /// Requests that have not been resolved yet.
    pub fn pending(&self) -> Vec<RecordedRequest> {
        self.pending.lock().iter().map(|p| p.request.clone()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Tokens passed to [`ImageLoader::cancel`], in order.
    pub fn cancelled(&self) -> Vec<LoadToken> {
        self.cancelled.lock().clone()
    }

    pub fn is_cancelled(&self, token: LoadToken) -> bool {
        self.cancelled.lock().contains(&token)
    }

    /// Deliver a result for `token`. Returns `false` if no such request is pending.
    pub fn resolve(&self, token: LoadToken, result: Result<ImageContent, LoadError>) -> bool {
        let pending = {
            let mut pending = self.pending.lock();
            pending
                .iter()
                .position(|p| p.request.token == token)
                .map(|pos| pending.remove(pos))
        };
        match pending {
            Some(p) => {
                (p.on_done)(result);
                true
            }
            None => false,
        }
    }
}

impl ImageLoader for ManualImageLoader {
    fn load(
        &self,
        source: &ImageSource,
        width: u32,
        height: u32,
        on_done: LoadCallback,
    ) -> LoadToken {
        let request = RecordedRequest {
            token: LoadToken::next(),
            source: source.clone(),
            width,
            height,
        };
        let token = request.token;
        self.history.lock().push(request.clone());
        self.pending.lock().push(Pending { request, on_done });
        token
    }

    fn cancel(&self, token: LoadToken) {
        self.cancelled.lock().push(token);
    }
}

impl fmt::Debug for ManualImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualImageLoader")
            .field("pending", &self.pending_count())
            .field("cancelled", &self.cancelled.lock().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(FileImageLoader: Send, Sync);
static_assertions::assert_impl_all!(ManualImageLoader: Send, Sync);
static_assertions::assert_impl_all!(LoadCompletion: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn capture() -> (LoadCallback, Receiver<Result<ImageContent, LoadError>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let callback: LoadCallback = Box::new(move |result| {
            let _ = tx.send(result);
        });
        (callback, rx)
    }

    #[test]
    fn test_fit_inside() {
        assert_eq!(fit_inside(400, 200, 100, 100), (100, 50));
        assert_eq!(fit_inside(50, 20, 100, 100), (50, 20));
        assert_eq!(fit_inside(400, 200, 0, 100), (200, 100));
    }

    #[test]
    fn test_manual_loader_resolve() {
        let loader = ManualImageLoader::new();
        let (callback, rx) = capture();
        let source = ImageSource::Resource(ResourceId(7));

        let token = loader.load(&source, 10, 20, callback);
        assert_eq!(loader.pending_count(), 1);
        assert_eq!(loader.requests()[0].width, 10);

        assert!(loader.resolve(token, Ok(ImageContent::Resource(ResourceId(7)))));
        assert!(!loader.resolve(token, Err(LoadError::Cancelled)));
        assert_eq!(rx.try_recv().unwrap(), Ok(ImageContent::Resource(ResourceId(7))));
    }

    #[test]
    fn test_receipt_drop_cancels() {
        let loader = Arc::new(ManualImageLoader::new());
        let (callback, _rx) = capture();
        let token = loader.load(&ImageSource::Resource(ResourceId(1)), 1, 1, callback);

        let receipt = LoadReceipt::new(token, loader.clone());
        drop(receipt);
        assert!(loader.is_cancelled(token));

        let (callback, _rx) = capture();
        let token = loader.load(&ImageSource::Resource(ResourceId(2)), 1, 1, callback);
        LoadReceipt::new(token, loader.clone()).complete();
        assert!(!loader.is_cancelled(token));
    }

    #[test]
    fn test_file_loader_decodes_and_fits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbaImage::from_pixel(40, 20, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let loader = FileImageLoader::new(1).unwrap();
        let (callback, rx) = capture();
        let url = Url::from_file_path(&path).unwrap();
        loader.load(&ImageSource::Uri(url), 10, 10, callback);

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Ok(ImageContent::Bitmap(bitmap)) => assert_eq!(bitmap.dimensions(), (10, 5)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_file_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.png")).unwrap();

        let loader = FileImageLoader::new(1).unwrap();
        let (callback, rx) = capture();
        loader.load(&ImageSource::Uri(url), 10, 10, callback);

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_file_loader_forgets_finished_requests() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.png")).unwrap();
        let loader = Arc::new(FileImageLoader::new(2).unwrap());

        for _ in 0..50 {
            let (callback, rx) = capture();
            let token = loader.load(&ImageSource::Uri(url.clone()), 10, 10, callback);
            rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap_err();
            // Recycling the container after the result arrived.
            drop(LoadReceipt::new(token, loader.clone()));
        }

        let (callback, _rx) = capture();
        let remote = Url::parse("https://example.com/a.png").unwrap();
        let token = loader.load(&ImageSource::Uri(remote), 10, 10, callback);
        loader.cancel(token);

        let requests = loader.requests.lock();
        assert!(requests.cancelled.is_empty());
        assert!(requests.in_flight.is_empty());
    }

    #[test]
    fn test_request_set_cancel_only_in_flight() {
        let mut requests = RequestSet::default();
        let token = LoadToken::next();
        requests.in_flight.insert(token);
        requests.cancelled.insert(token);

        assert!(requests.take_cancelled(token));
        assert!(requests.in_flight.is_empty());
        assert!(!requests.take_cancelled(token));
        assert!(!requests.finish(token));
    }

    #[test]
    fn test_file_loader_rejects_remote_scheme() {
        let loader = FileImageLoader::new(1).unwrap();
        let (callback, rx) = capture();
        let url = Url::parse("https://example.com/a.png").unwrap();
        loader.load(&ImageSource::Uri(url), 10, 10, callback);

        assert!(matches!(rx.try_recv().unwrap(), Err(LoadError::Other(_))));
    }
}

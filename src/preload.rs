//! Image preloading.
//!
//! Stage 2 of the build pipeline. Every image the site references is loaded
//! once from the content directory, decoded just far enough to read its
//! dimensions. Loaded images get `width`/`height` attributes in the output;
//! failed ones are reported as warnings and rendered in their "image
//! unavailable" state. A failed image never stops the build.
//!
//! ## Preloader semantics
//!
//! [`Preloader`] is the coordinator; the browser-side twin in `site.js`
//! follows the same rules:
//!
//! - **Deduplication**: a URL that is already loaded resolves immediately;
//!   a URL that is currently loading joins the in-flight load, so the
//!   [`AssetLoader`] runs at most once per URL at a time.
//! - **Fan-out / fan-in**: [`Preloader::preload_all`] starts every request in
//!   priority order (high, medium, low; stable within a priority) and waits
//!   for all of them to settle. Failures are collected, not propagated.
//! - **Observers**: each completed item (loaded or failed) is announced to
//!   every subscriber. Dropping the [`Subscription`] unsubscribes.
//! - **No retries**: a failed URL is not remembered as loaded; asking again
//!   starts a fresh load.
//!
//! ## Priorities in the build
//!
//! | Asset | Priority |
//! |-------|----------|
//! | Category card images (homepage preloader) | high |
//! | Service images, portraits, office photos | medium |
//! | Gallery images | low |

use crate::scan::Manifest;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Weak};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unreadable image {url}: {reason}")]
    Unreadable { url: String, reason: String },
    #[error("load of {0} was interrupted")]
    Interrupted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Load order. Sorting ascending puts `High` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadRequest {
    pub url: String,
    pub priority: Priority,
}

impl PreloadRequest {
    pub fn new(url: impl Into<String>, priority: Priority) -> Self {
        Self {
            url: url.into(),
            priority,
        }
    }
}

/// A completed item, as announced to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum PreloadEvent {
    Loaded { url: String, dimensions: Dimensions },
    Failed { url: String, error: LoadError },
}

impl PreloadEvent {
    pub fn url(&self) -> &str {
        match self {
            Self::Loaded { url, .. } | Self::Failed { url, .. } => url,
        }
    }
}

/// Outcome of [`Preloader::preload_all`], in load order.
#[derive(Debug, Clone, Default)]
pub struct PreloadReport {
    pub loaded: Vec<(String, Dimensions)>,
    pub failed: Vec<(String, LoadError)>,
}

impl PreloadReport {
    pub fn total(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }
}

/// Fetches one asset and reports its dimensions.
#[async_trait]
pub trait AssetLoader: Send + Sync + 'static {
    async fn load(&self, url: &str) -> Result<Dimensions, LoadError>;
}

/// Loads site URLs from the content directory.
///
/// URLs registered with [`FsLoader::route`] map to their source file; any
/// other URL is resolved against the content root (`assets/about_us.jpg`).
pub struct FsLoader {
    root: PathBuf,
    routes: HashMap<String, PathBuf>,
}

impl FsLoader {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            routes: HashMap::new(),
        }
    }

    pub fn route(&mut self, url: &str, source_path: &str) {
        self.routes
            .insert(url.to_string(), self.root.join(source_path));
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.root.join(url.trim_start_matches('/')))
    }
}

#[async_trait]
impl AssetLoader for FsLoader {
    async fn load(&self, url: &str) -> Result<Dimensions, LoadError> {
        let path = self.resolve(url);
        let owned = url.to_string();
        tokio::task::spawn_blocking(move || read_dimensions(&path, &owned))
            .await
            .map_err(|_| LoadError::Interrupted(url.to_string()))?
    }
}

fn read_dimensions(path: &Path, url: &str) -> Result<Dimensions, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(url.to_string()));
    }
    let unreadable = |reason: String| LoadError::Unreadable {
        url: url.to_string(),
        reason,
    };
    let (width, height) = image::ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .into_dimensions()
        .map_err(|e| unreadable(e.to_string()))?;
    Ok(Dimensions { width, height })
}

type Observer = Arc<dyn Fn(&PreloadEvent) + Send + Sync>;
type SharedLoad = Shared<BoxFuture<'static, Result<Dimensions, LoadError>>>;

#[derive(Default)]
struct State {
    loaded: HashMap<String, Dimensions>,
    in_flight: HashMap<String, SharedLoad>,
    observers: Vec<(u64, Observer)>,
    next_observer: u64,
}

/// Keeps an observer registered. Dropping it unsubscribes.
pub struct Subscription {
    state: Weak<Mutex<State>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.lock().observers.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Deduplicating preload coordinator. See the [module docs](self).
pub struct Preloader<L> {
    loader: Arc<L>,
    state: Arc<Mutex<State>>,
}

impl<L: AssetLoader> Preloader<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Load one URL, joining an in-flight load of the same URL if any.
    pub async fn preload(&self, url: &str) -> Result<Dimensions, LoadError> {
        let load = {
            let mut state = self.state.lock();
            if let Some(dimensions) = state.loaded.get(url) {
                return Ok(*dimensions);
            }
            state
                .in_flight
                .entry(url.to_string())
                .or_insert_with(|| self.start_load(url))
                .clone()
        };
        load.await
    }

    fn start_load(&self, url: &str) -> SharedLoad {
        let loader = Arc::clone(&self.loader);
        let state = Arc::clone(&self.state);
        let url = url.to_string();
        async move {
            let result = loader.load(&url).await;
            let observers: Vec<Observer> = {
                let mut state = state.lock();
                state.in_flight.remove(&url);
                if let Ok(dimensions) = &result {
                    state.loaded.insert(url.clone(), *dimensions);
                }
                state.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
            };
            let event = match &result {
                Ok(dimensions) => PreloadEvent::Loaded {
                    url,
                    dimensions: *dimensions,
                },
                Err(error) => PreloadEvent::Failed {
                    url,
                    error: error.clone(),
                },
            };
            for observer in observers {
                observer(&event);
            }
            result
        }
        .boxed()
        .shared()
    }

    /// Load every request, highest priority first, and wait for all of them.
    ///
    /// Repeated URLs are loaded once, at their highest requested priority.
    pub async fn preload_all(&self, mut requests: Vec<PreloadRequest>) -> PreloadReport {
        requests.sort_by_key(|r| r.priority);
        let mut seen = HashSet::new();
        requests.retain(|r| seen.insert(r.url.clone()));

        let results = join_all(requests.iter().map(|r| self.preload(&r.url))).await;

        let mut report = PreloadReport::default();
        for (request, result) in requests.into_iter().zip(results) {
            match result {
                Ok(dimensions) => report.loaded.push((request.url, dimensions)),
                Err(error) => report.failed.push((request.url, error)),
            }
        }
        report
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.state.lock().loaded.contains_key(url)
    }

    /// Percentage (0–100) of `urls` already loaded. An empty list is complete.
    pub fn progress<S: AsRef<str>>(&self, urls: &[S]) -> f64 {
        if urls.is_empty() {
            return 100.0;
        }
        let state = self.state.lock();
        let loaded = urls
            .iter()
            .filter(|u| state.loaded.contains_key(u.as_ref()))
            .count();
        loaded as f64 / urls.len() as f64 * 100.0
    }

    /// Register an observer for per-item completion.
    pub fn subscribe(&self, observer: impl Fn(&PreloadEvent) + Send + Sync + 'static) -> Subscription {
        let mut state = self.state.lock();
        let id = state.next_observer;
        state.next_observer += 1;
        state.observers.push((id, Arc::new(observer)));
        Subscription {
            state: Arc::downgrade(&self.state),
            id,
        }
    }
}

// =============================================================================
// Build stage
// =============================================================================

/// What the preload stage learned about one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssetState {
    Loaded { width: u32, height: u32 },
    Failed { error: String },
}

/// Output manifest of the preload stage: the scan manifest plus one
/// [`AssetState`] per referenced URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadedManifest {
    pub manifest: Manifest,
    pub assets: BTreeMap<String, AssetState>,
}

impl PreloadedManifest {
    pub fn dimensions(&self, url: &str) -> Option<Dimensions> {
        match self.assets.get(url) {
            Some(AssetState::Loaded { width, height }) => Some(Dimensions {
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }

    /// An asset renders only if it loaded.
    pub fn is_available(&self, url: &str) -> bool {
        self.dimensions(url).is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().filter_map(|(url, state)| match state {
            AssetState::Failed { error } => Some((url.as_str(), error.as_str())),
            AssetState::Loaded { .. } => None,
        })
    }
}

/// Every image the generated site references, with its load priority.
pub fn requests_for(manifest: &Manifest) -> Vec<PreloadRequest> {
    let mut requests: Vec<PreloadRequest> = manifest
        .categories
        .iter()
        .map(|c| PreloadRequest::new(&c.cover.url, Priority::High))
        .collect();

    requests.extend(
        manifest
            .services
            .iter()
            .map(|s| PreloadRequest::new(&s.image.url, Priority::Medium)),
    );

    let config = &manifest.config;
    let config_images = std::iter::once(&config.about.image)
        .chain(config.team.iter().filter_map(|m| m.photo.as_ref()))
        .chain(config.offices.iter().filter_map(|o| o.image.as_ref()));
    requests.extend(config_images.map(|url| PreloadRequest::new(url, Priority::Medium)));

    requests.extend(manifest.categories.iter().flat_map(|c| {
        c.galleries.iter().flat_map(|g| {
            g.images
                .iter()
                .map(|i| PreloadRequest::new(&i.asset.url, Priority::Low))
        })
    }));

    requests
}

/// Build a loader that knows where every scanned asset lives.
pub fn loader_for(manifest: &Manifest, root: &Path) -> FsLoader {
    let mut loader = FsLoader::new(root);
    for category in &manifest.categories {
        loader.route(&category.cover.url, &category.cover.source_path);
        for image in category.galleries.iter().flat_map(|g| &g.images) {
            loader.route(&image.asset.url, &image.asset.source_path);
        }
    }
    for service in &manifest.services {
        loader.route(&service.image.url, &service.image.source_path);
    }
    loader
}

/// Run the preload stage over a scan manifest.
///
/// Completion events are forwarded to `events` as they happen so the CLI
/// can print progress while loads are still running.
pub async fn preload_manifest(
    manifest: Manifest,
    root: &Path,
    events: Option<Sender<PreloadEvent>>,
) -> PreloadedManifest {
    let preloader = Preloader::new(loader_for(&manifest, root));
    let _subscription = events.map(|tx| {
        preloader.subscribe(move |event| {
            tx.send(event.clone()).ok();
        })
    });

    let report = preloader.preload_all(requests_for(&manifest)).await;

    let mut assets = BTreeMap::new();
    for (url, d) in report.loaded {
        assets.insert(
            url,
            AssetState::Loaded {
                width: d.width,
                height: d.height,
            },
        );
    }
    for (url, error) in report.failed {
        assets.insert(
            url,
            AssetState::Failed {
                error: error.to_string(),
            },
        );
    }

    PreloadedManifest { manifest, assets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::test_helpers::*;
    use std::time::Duration;

    /// Records every load call; URLs in `failing` fail, everything else is 4x5.
    #[derive(Default)]
    struct FakeLoader {
        calls: Arc<Mutex<Vec<String>>>,
        failing: HashSet<String>,
        delay: Duration,
    }

    impl FakeLoader {
        fn failing(urls: &[&str]) -> Self {
            Self {
                failing: urls.iter().map(|u| u.to_string()).collect(),
                ..Self::default()
            }
        }

        fn slow() -> Self {
            Self {
                delay: Duration::from_millis(20),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl AssetLoader for FakeLoader {
        async fn load(&self, url: &str) -> Result<Dimensions, LoadError> {
            self.calls.lock().push(url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.failing.contains(url) {
                Err(LoadError::NotFound(url.to_string()))
            } else {
                Ok(Dimensions {
                    width: 4,
                    height: 5,
                })
            }
        }
    }

    fn recorded(preloader: &Preloader<FakeLoader>) -> Vec<String> {
        preloader.loader.calls.lock().clone()
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_load() {
        let preloader = Preloader::new(FakeLoader::slow());
        let (a, b) = tokio::join!(preloader.preload("x.jpg"), preloader.preload("x.jpg"));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(recorded(&preloader), vec!["x.jpg"]);
    }

    #[tokio::test]
    async fn loaded_url_resolves_without_loading_again() {
        let preloader = Preloader::new(FakeLoader::default());
        preloader.preload("x.jpg").await.unwrap();
        preloader.preload("x.jpg").await.unwrap();
        assert!(preloader.is_loaded("x.jpg"));
        assert_eq!(recorded(&preloader).len(), 1);
    }

    #[tokio::test]
    async fn failed_url_is_not_remembered() {
        let preloader = Preloader::new(FakeLoader::failing(&["bad.jpg"]));
        assert!(preloader.preload("bad.jpg").await.is_err());
        assert!(!preloader.is_loaded("bad.jpg"));
        assert!(preloader.preload("bad.jpg").await.is_err());
        assert_eq!(recorded(&preloader).len(), 2);
    }

    #[tokio::test]
    async fn failure_does_not_block_completion() {
        let preloader = Preloader::new(FakeLoader::failing(&["b.jpg"]));
        let report = preloader
            .preload_all(vec![
                PreloadRequest::new("a.jpg", Priority::High),
                PreloadRequest::new("b.jpg", Priority::High),
                PreloadRequest::new("c.jpg", Priority::Low),
            ])
            .await;
        assert_eq!(report.total(), 3);
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.failed[0].0, "b.jpg");
    }

    #[tokio::test]
    async fn loads_start_in_priority_order() {
        let preloader = Preloader::new(FakeLoader::default());
        preloader
            .preload_all(vec![
                PreloadRequest::new("low.jpg", Priority::Low),
                PreloadRequest::new("med-1.jpg", Priority::Medium),
                PreloadRequest::new("high.jpg", Priority::High),
                PreloadRequest::new("med-2.jpg", Priority::Medium),
            ])
            .await;
        assert_eq!(
            recorded(&preloader),
            vec!["high.jpg", "med-1.jpg", "med-2.jpg", "low.jpg"]
        );
    }

    #[tokio::test]
    async fn repeated_urls_load_once() {
        let preloader = Preloader::new(FakeLoader::default());
        let report = preloader
            .preload_all(vec![
                PreloadRequest::new("a.jpg", Priority::Low),
                PreloadRequest::new("a.jpg", Priority::High),
            ])
            .await;
        assert_eq!(report.total(), 1);
        assert_eq!(recorded(&preloader), vec!["a.jpg"]);
    }

    #[tokio::test]
    async fn progress_counts_loaded_urls() {
        let preloader = Preloader::new(FakeLoader::failing(&["b.jpg"]));
        let urls = ["a.jpg", "b.jpg", "c.jpg", "d.jpg"];
        assert_eq!(preloader.progress(&urls), 0.0);
        preloader.preload("a.jpg").await.unwrap();
        preloader.preload("b.jpg").await.ok();
        assert_eq!(preloader.progress(&urls), 25.0);
        preloader.preload("c.jpg").await.unwrap();
        assert_eq!(preloader.progress(&urls), 50.0);
    }

    #[test]
    fn progress_of_nothing_is_complete() {
        let preloader = Preloader::new(FakeLoader::default());
        let none: [&str; 0] = [];
        assert_eq!(preloader.progress(&none), 100.0);
    }

    #[tokio::test]
    async fn observers_see_each_completion_until_unsubscribed() {
        let preloader = Preloader::new(FakeLoader::failing(&["b.jpg"]));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let subscription = preloader.subscribe(move |event| {
            let tag = match event {
                PreloadEvent::Loaded { .. } => "ok",
                PreloadEvent::Failed { .. } => "failed",
            };
            sink.lock().push(format!("{} {tag}", event.url()));
        });

        preloader.preload("a.jpg").await.unwrap();
        preloader.preload("b.jpg").await.ok();
        // Already loaded: no new completion
        preloader.preload("a.jpg").await.unwrap();

        drop(subscription);
        preloader.preload("c.jpg").await.unwrap();

        assert_eq!(*seen.lock(), vec!["a.jpg ok", "b.jpg failed"]);
    }

    #[tokio::test]
    async fn shared_load_notifies_once() {
        let preloader = Preloader::new(FakeLoader::slow());
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let _subscription = preloader.subscribe(move |_| *sink.lock() += 1);

        let _ = tokio::join!(
            preloader.preload("x.jpg"),
            preloader.preload("x.jpg"),
            preloader.preload("x.jpg")
        );
        assert_eq!(*count.lock(), 1);
    }

    #[tokio::test]
    async fn fs_loader_reads_dimensions() {
        let tmp = setup_content();
        let mut loader = FsLoader::new(tmp.path());
        loader.route("assets/housing.jpg", "010-housing/main.jpg");

        assert_eq!(
            loader.load("assets/housing.jpg").await.unwrap(),
            Dimensions {
                width: 12,
                height: 8
            }
        );
        // Unrouted URLs resolve against the content root
        assert!(loader.load("assets/about_us.jpg").await.is_ok());
        assert_eq!(
            loader.load("assets/missing.jpg").await,
            Err(LoadError::NotFound("assets/missing.jpg".to_string()))
        );
    }

    #[tokio::test]
    async fn fs_loader_reports_undecodable_files() {
        let tmp = setup_content();
        std::fs::write(tmp.path().join("assets/broken.jpg"), "not an image").unwrap();
        let loader = FsLoader::new(tmp.path());
        assert!(matches!(
            loader.load("assets/broken.jpg").await,
            Err(LoadError::Unreadable { .. })
        ));
    }

    #[test]
    fn requests_put_category_cards_first() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let requests = requests_for(&manifest);

        assert_eq!(requests[0], PreloadRequest::new("assets/housing.jpg", Priority::High));
        assert_eq!(requests[1].url, "assets/comercial.png");
        assert!(requests.iter().any(|r| r.url == "assets/rc_profile.jpg"));
        assert_eq!(requests.last().map(|r| r.priority), Some(Priority::Low));
    }

    #[tokio::test]
    async fn stage_records_loaded_and_failed_assets() {
        let tmp = setup_content();
        std::fs::remove_file(tmp.path().join("assets/cn_profile.jpg")).unwrap();
        let manifest = scan(tmp.path()).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let preloaded = preload_manifest(manifest, tmp.path(), Some(tx)).await;

        assert_eq!(
            preloaded.dimensions("assets/gallery/housing/residential/1.jpg"),
            Some(Dimensions {
                width: 8,
                height: 10
            })
        );
        assert!(!preloaded.is_available("assets/cn_profile.jpg"));
        let failures: Vec<&str> = preloaded.failures().map(|(url, _)| url).collect();
        assert_eq!(failures, vec!["assets/cn_profile.jpg"]);

        // Every completion reached the channel, and the channel closed
        let events: Vec<PreloadEvent> = rx.iter().collect();
        assert_eq!(events.len(), preloaded.assets.len());
    }
}

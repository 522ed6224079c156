//! Note glyph images and the cache that loads them once.
//!
//! The renderer draws one of three glyphs (whole, half, quarter note). They
//! are loaded together the first time any of them is needed and reused for
//! every later render. The cache is an ordinary owned value, so each test can
//! start from an empty one.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::ResourceLoadError;
use crate::model::NoteDuration;

/// A decoded glyph: its natural size plus the encoded bytes for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphImage {
    pub natural_width: u32,
    pub natural_height: u32,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub type ImageHandle = Arc<GlyphImage>;

/// Asynchronously turns a resource identifier into a decoded image.
#[async_trait]
pub trait ImageLoader: Send + Sync + 'static {
    async fn load(&self, url: &str) -> Result<ImageHandle, ResourceLoadError>;
}

/// Loads PNG glyphs from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileImageLoader {
    root: PathBuf,
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageLoader for FileImageLoader {
    async fn load(&self, url: &str) -> Result<ImageHandle, ResourceLoadError> {
        let path = self.root.join(url);
        let bytes = tokio::fs::read(&path).await.map_err(|source| ResourceLoadError::Io {
            url: path.display().to_string(),
            source: Arc::new(source),
        })?;

        let decode_err = |reason: String| ResourceLoadError::Decode {
            url: path.display().to_string(),
            reason,
        };
        let (natural_width, natural_height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?
            .into_dimensions()
            .map_err(|e| decode_err(e.to_string()))?;
        if natural_width == 0 || natural_height == 0 {
            return Err(decode_err("image has no pixels".into()));
        }

        log::debug!("loaded glyph {} ({natural_width}x{natural_height})", path.display());
        Ok(Arc::new(GlyphImage {
            natural_width,
            natural_height,
            mime: "image/png",
            bytes,
        }))
    }
}

/// The three loaded glyphs, keyed by duration.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    glyphs: HashMap<NoteDuration, ImageHandle>,
}

impl GlyphSet {
    pub fn get(&self, duration: NoteDuration) -> &ImageHandle {
        // Constructed only by `NoteGlyphCache::load_all`, which fills every duration.
        &self.glyphs[&duration]
    }
}

/// Loads the note glyphs on first use and keeps them for the cache's lifetime.
///
/// Callers that arrive while a load is running await that same load instead
/// of starting their own, and all of them get its result. A failed load is
/// not kept: the cache goes back to empty once it settles, and only a request
/// made after that starts a new load.
pub struct NoteGlyphCache<L> {
    loader: Arc<L>,
    state: Mutex<CacheState>,
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<GlyphSet>, ResourceLoadError>>>;

enum CacheState {
    Empty,
    Loading(SharedLoad),
    Loaded(Arc<GlyphSet>),
}

impl<L: ImageLoader> NoteGlyphCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            state: Mutex::new(CacheState::Empty),
        }
    }

    pub async fn glyph_for(&self, duration: NoteDuration) -> Result<ImageHandle, ResourceLoadError> {
        Ok(self.glyphs().await?.get(duration).clone())
    }

    pub async fn glyphs(&self) -> Result<Arc<GlyphSet>, ResourceLoadError> {
        let load = {
            let mut state = self.lock_state();
            match &*state {
                CacheState::Loaded(glyphs) => return Ok(glyphs.clone()),
                CacheState::Loading(load) => load.clone(),
                CacheState::Empty => {
                    let load = load_all(self.loader.clone()).boxed().shared();
                    *state = CacheState::Loading(load.clone());
                    load
                }
            }
        };

        let result = load.clone().await;

        // The first caller to see the result settles the state; a newer load
        // started after a failure is left alone.
        let mut state = self.lock_state();
        if matches!(&*state, CacheState::Loading(current) if current.ptr_eq(&load)) {
            *state = match &result {
                Ok(glyphs) => CacheState::Loaded(glyphs.clone()),
                Err(_) => CacheState::Empty,
            };
        }
        result
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&*self.lock_state(), CacheState::Loaded(_))
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn load_all<L: ImageLoader>(loader: Arc<L>) -> Result<Arc<GlyphSet>, ResourceLoadError> {
    let (whole, half, quarter) = tokio::try_join!(
        loader.load(NoteDuration::Whole.glyph_file()),
        loader.load(NoteDuration::Half.glyph_file()),
        loader.load(NoteDuration::Quarter.glyph_file()),
    )
    .inspect_err(|e| log::warn!("note glyphs failed to load: {e}"))?;

    Ok(Arc::new(GlyphSet {
        glyphs: HashMap::from([
            (NoteDuration::Whole, whole),
            (NoteDuration::Half, half),
            (NoteDuration::Quarter, quarter),
        ]),
    }))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory loader that counts requests per resource. Every glyph is
    /// 10x20 and its bytes are the requested file name.
    #[derive(Default)]
    pub(crate) struct CountingLoader {
        pub(crate) calls: Mutex<HashMap<String, usize>>,
        pub(crate) total: AtomicUsize,
        pub(crate) fail: AtomicBool,
        pub(crate) delay_ms: u64,
    }

    impl CountingLoader {
        pub(crate) fn with_delay(delay_ms: u64) -> Self {
            Self {
                delay_ms,
                ..Self::default()
            }
        }

        pub(crate) fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl ImageLoader for CountingLoader {
        async fn load(&self, url: &str) -> Result<ImageHandle, ResourceLoadError> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
            self.total.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ResourceLoadError::Decode {
                    url: url.to_string(),
                    reason: "broken".into(),
                });
            }
            Ok(Arc::new(GlyphImage {
                natural_width: 10,
                natural_height: 20,
                mime: "image/png",
                bytes: url.as_bytes().to_vec(),
            }))
        }
    }
}

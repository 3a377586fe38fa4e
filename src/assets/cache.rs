use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::storage::AssetStorage;

/// Directory images are looked up in, relative to the storage root.
pub const IMAGE_DIR: &str = "gfx";

/// Extensions probed for an identifier, highest priority first.
pub const IMAGE_EXTENSIONS: [&str; 4] = [".webp", ".png", ".jpg", ".jpeg"];

/// Map of write-once slots. A slot is claimed under the map lock, then
/// filled outside it, so concurrent callers for one key share a single
/// computation while other keys proceed.
#[derive(Debug)]
struct OnceMap<V> {
    slots: Mutex<HashMap<String, Arc<OnceLock<V>>>>,
}

impl<V> Default for OnceMap<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> OnceMap<V> {
    fn slot(&self, key: &str) -> Arc<OnceLock<V>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(key) {
            return Arc::clone(slot);
        }
        let slot = Arc::new(OnceLock::new());
        slots.insert(key.to_owned(), Arc::clone(&slot));
        slot
    }

    fn get_or_init(&self, key: &str, init: impl FnOnce() -> V) -> V {
        self.slot(key).get_or_init(init).clone()
    }

    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Process-wide image lookup and decode cache.
///
/// Identifier to path resolution and path to decoded image are both
/// computed at most once per key, including failures, and never evicted.
/// Share one instance (behind an `Arc`) across every concurrent render.
#[derive(Debug, Default)]
pub struct AssetCache {
    paths: OnceMap<Option<String>>,
    images: OnceMap<Option<Arc<PreparedImage>>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage path for `identifier`, probing `gfx/<identifier><ext>` for
    /// each known extension in priority order.
    #[tracing::instrument(level = "debug", skip(self, storage))]
    pub fn resolve(&self, storage: &dyn AssetStorage, identifier: &str) -> Option<String> {
        self.paths.get_or_init(identifier, || {
            let found = IMAGE_EXTENSIONS
                .iter()
                .map(|ext| format!("{IMAGE_DIR}/{identifier}{ext}"))
                .find(|candidate| storage.file_exists(candidate));
            if found.is_none() {
                tracing::warn!(identifier, "image not found");
            }
            found
        })
    }

    /// Decoded image at `path`. Concurrent calls for one path wait on a
    /// single read and decode; a failure is remembered and not retried.
    #[tracing::instrument(level = "debug", skip(self, storage))]
    pub fn load(&self, storage: &dyn AssetStorage, path: &str) -> Option<Arc<PreparedImage>> {
        self.images.get_or_init(path, || {
            match storage.read(path).and_then(|bytes| decode_image(&bytes)) {
                Ok(img) => {
                    tracing::debug!(path, width = img.width, height = img.height, "decoded image");
                    Some(Arc::new(img))
                }
                Err(e) => {
                    tracing::warn!(path, error = %e, "image decode failed");
                    None
                }
            }
        })
    }

    /// Resolve then load.
    pub fn fetch(&self, storage: &dyn AssetStorage, identifier: &str) -> Option<Arc<PreparedImage>> {
        let path = self.resolve(storage, identifier)?;
        self.load(storage, &path)
    }

    /// Number of identifiers resolved so far, hits and misses.
    pub fn resolved_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of paths with a decode slot, finished or in flight.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;

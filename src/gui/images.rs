use crate::gui::wheel::Sector;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque image source: a path, a `file://` URI or a `data:` URI.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ImageId(String);

crate::impl_string_newtype!(ImageId);

/// Starts an asynchronous decode. The result comes back through [`ImageCache::complete`].
pub trait ImageLoader {
    fn load(&self, id: &ImageId);
}

#[derive(Debug, Clone)]
enum Entry<H> {
    Pending,
    Ready(H),
}

/// Decoded images keyed by source. Entries are never evicted, and a source whose decode failed
/// stays pending for good.
#[derive(Debug)]
pub struct ImageCache<H> {
    entries: HashMap<ImageId, Entry<H>>,
}

impl<H> Default for ImageCache<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H> ImageCache<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ImageId) -> Option<&H> {
        match self.entries.get(id) {
            Some(Entry::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn is_pending(&self, id: &ImageId) -> bool {
        matches!(self.entries.get(id), Some(Entry::Pending))
    }

    /// Returns the image on a hit. On a miss a pending entry is recorded and the loader is asked
    /// to decode it; later requests for the same source do not start another load.
    pub fn request(&mut self, id: &ImageId, loader: &impl ImageLoader) -> Option<&H> {
        if id.is_empty() {
            return None;
        }
        if !self.entries.contains_key(id) {
            log::debug!("Loading image {}", abbreviate(id));
            self.entries.insert(id.clone(), Entry::Pending);
            loader.load(id);
        }
        self.get(id)
    }

    pub fn preload(&mut self, sectors: &[Sector], loader: &impl ImageLoader) {
        for id in sectors.iter().filter_map(Sector::image_id) {
            self.request(id, loader);
        }
    }

    /// Stores a decoded image. Returns true when the entry went from pending to ready, which is
    /// when the wheel needs a redraw.
    pub fn complete(&mut self, id: ImageId, handle: H) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry @ Entry::Pending) => {
                *entry = Entry::Ready(handle);
                true
            }
            Some(Entry::Ready(_)) => false,
            None => {
                log::debug!("Dropping unrequested image {}", abbreviate(&id));
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Data URIs can be megabytes long; keep log lines readable.
pub fn abbreviate(id: &ImageId) -> String {
    const MAX: usize = 48;
    match id.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &id.as_str()[..cut]),
        None => id.to_string(),
    }
}

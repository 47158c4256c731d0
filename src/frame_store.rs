use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::frame::Frame;

/// Frames and the active index, always replaced and read together.
#[derive(Debug)]
struct Loaded {
    frames: Arc<[Arc<Frame>]>,
    active: usize,
}

impl Loaded {
    fn wrap(&self, index: isize) -> usize {
        // `frames` is never empty here and slice lengths fit in isize
        let count = self.frames.len() as isize;
        index.rem_euclid(count) as usize
    }
}

/// Ordered frame sequence of a study with circular navigation.
///
/// The store is safe to share between threads. [`FrameStore::load`] swaps the
/// frame sequence and the active index under one write lock, so readers never
/// pair frames from one load with an index from another.
#[derive(Debug, Default)]
pub struct FrameStore {
    state: RwLock<Option<Loaded>>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole frame sequence and reset the active index to 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if `frames` is empty. The previous
    /// contents stay untouched in that case; use [`FrameStore::clear`] to
    /// empty the store on purpose.
    pub fn load(&self, frames: impl IntoIterator<Item = Frame>) -> Result<()> {
        let frames: Arc<[Arc<Frame>]> = frames.into_iter().map(Arc::new).collect();
        if frames.is_empty() {
            return Err(Error::EmptyInput);
        }
        *self.write() = Some(Loaded { frames, active: 0 });
        Ok(())
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    /// Select a frame, wrapping circularly in both directions.
    ///
    /// `select(-1)` goes to the last frame and `select(len)` to the first.
    /// Returns the resulting active index.
    pub fn select(&self, index: isize) -> Result<usize> {
        self.navigate(|_| index)
    }

    pub fn next(&self) -> Result<usize> {
        self.navigate(|active| active + 1)
    }

    pub fn previous(&self) -> Result<usize> {
        self.navigate(|active| active - 1)
    }

    /// Get the active frame
    pub fn active(&self) -> Result<Arc<Frame>> {
        let state = self.read();
        let loaded = state.as_ref().ok_or(Error::EmptyStore)?;
        Ok(Arc::clone(&loaded.frames[loaded.active]))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.read().as_ref().map(|loaded| loaded.active)
    }

    pub fn len(&self) -> usize {
        self.read().as_ref().map_or(0, |loaded| loaded.frames.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_none()
    }

    /// Read `(active index, frame count, active frame)` under one lock
    /// acquisition.
    pub fn snapshot(&self) -> Option<(usize, usize, Arc<Frame>)> {
        self.read().as_ref().map(|loaded| {
            (
                loaded.active,
                loaded.frames.len(),
                Arc::clone(&loaded.frames[loaded.active]),
            )
        })
    }

    /// 1-based slice counter, e.g. `"3/120"`.
    pub fn position_label(&self) -> Option<String> {
        self.read()
            .as_ref()
            .map(|loaded| format!("{}/{}", loaded.active + 1, loaded.frames.len()))
    }

    fn navigate(&self, target: impl FnOnce(isize) -> isize) -> Result<usize> {
        let mut state = self.write();
        let loaded = state.as_mut().ok_or(Error::EmptyStore)?;
        loaded.active = loaded.wrap(target(loaded.active as isize));
        Ok(loaded.active)
    }

    // The state is always written whole, so a poisoned lock still holds a
    // consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Option<Loaded>> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Loaded>> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

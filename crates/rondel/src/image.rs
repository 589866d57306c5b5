use gdk_pixbuf::Pixbuf;
use std::path::{Path, PathBuf};

/// Decoded center image, keyed by path identity. The pixbuf is only swapped
/// in after a full successful decode, and a failed path is remembered so a
/// bad reference is not re-decoded (and re-logged) on every frame.
#[derive(Debug, Default)]
pub struct CenterImageCache {
    loaded: Option<(PathBuf, Pixbuf)>,
    failed: Option<PathBuf>,
}

impl CenterImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-keys the cache to `reference`. Returns true when a new image just
    /// finished decoding, in which case the host should schedule a settle
    /// redraw.
    pub fn sync(&mut self, reference: Option<&Path>) -> bool {
        let Some(path) = reference else {
            self.loaded = None;
            self.failed = None;
            return false;
        };

        if self.loaded.as_ref().is_some_and(|(p, _)| p == path)
            || self.failed.as_deref() == Some(path)
        {
            return false;
        }

        match Pixbuf::from_file(path) {
            Ok(pixbuf) => {
                log::debug!("Center image decoded: {}", path.display());
                self.loaded = Some((path.to_path_buf(), pixbuf));
                self.failed = None;
                true
            }
            Err(e) => {
                log::error!("Failed to load center image {}: {}", path.display(), e);
                self.loaded = None;
                self.failed = Some(path.to_path_buf());
                false
            }
        }
    }

    pub fn pixbuf(&self) -> Option<&Pixbuf> {
        self.loaded.as_ref().map(|(_, pixbuf)| pixbuf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reference_clears() {
        let mut cache = CenterImageCache::new();
        assert!(!cache.sync(None));
        assert!(cache.pixbuf().is_none());
    }

    #[test]
    fn test_decode_failure_is_non_fatal_and_not_retried() {
        let mut cache = CenterImageCache::new();
        let missing = Path::new("/nonexistent/center-image.png");

        assert!(!cache.sync(Some(missing)));
        assert!(cache.pixbuf().is_none());

        // same broken reference again: cached failure, no second decode
        assert!(!cache.sync(Some(missing)));
        assert_eq!(cache.failed.as_deref(), Some(missing));
    }

    #[test]
    fn test_failure_cleared_when_reference_removed() {
        let mut cache = CenterImageCache::new();
        cache.sync(Some(Path::new("/nonexistent/center-image.png")));
        cache.sync(None);
        assert!(cache.failed.is_none());
    }
}

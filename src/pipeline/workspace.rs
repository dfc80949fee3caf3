//! Request-scoped working files.
//!
//! Each in-flight request owns a unique working-file path so that two
//! concurrent requests sharing a working directory can never corrupt each
//! other. The workspace deletes its files on drop, which covers every exit
//! path: success, terminal failure, and caller abandonment after any
//! progress notification.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

/// Process-wide counter disambiguating requests created in the same nanosecond.
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A request-scoped working directory entry.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    request_id: String,
}

impl Workspace {
    /// Creates a workspace in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the directory cannot be created.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let request_id = format!("emote-{}-{nanos}-{counter}", std::process::id());
        debug!(request_id, dir = %dir.display(), "Workspace created");
        Ok(Self {
            dir: dir.to_path_buf(),
            request_id,
        })
    }

    /// The unique id of this request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Extension-less working-file path; the fetcher appends the extension.
    #[must_use]
    pub fn file_stem(&self) -> PathBuf {
        self.dir.join(&self.request_id)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Remove every file this request created, whatever extension the
        // fetcher picked.
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&self.request_id) {
                let _ = std::fs::remove_file(entry.path());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_workspaces_get_unique_stems() {
        let dir = tempfile::tempdir().unwrap();
        let a = Workspace::create(dir.path()).unwrap();
        let b = Workspace::create(dir.path()).unwrap();
        assert_ne!(a.file_stem(), b.file_stem());
    }

    #[test]
    fn test_drop_removes_working_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("unrelated.txt");
        std::fs::write(&kept, b"keep me").unwrap();

        let path = {
            let workspace = Workspace::create(dir.path()).unwrap();
            let path = workspace.file_stem().with_extension("png");
            std::fs::write(&path, b"working bytes").unwrap();
            path
        };

        assert!(!path.exists(), "working file should be deleted on drop");
        assert!(kept.exists(), "unrelated files must be untouched");
    }

    #[test]
    fn test_create_makes_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("work/sub");
        let workspace = Workspace::create(&nested).unwrap();
        assert!(nested.exists());
        assert!(workspace.file_stem().starts_with(&nested));
    }
}

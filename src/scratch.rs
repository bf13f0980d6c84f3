//! Request-scoped scratch files.
//!
//! The external tools only accept paths, so every request materializes its
//! payload on disk. A [`ScratchFile`] owns that file and removes it when
//! dropped, which covers early returns, errors and panics alike.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;

const PREFIX: &str = "textract-";

/// A uniquely named file holding one request's payload.
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    /// Create `<dir>/textract-XXXXXX.<extension>`, write `bytes` and close it.
    ///
    /// `dir = None` uses the OS temp directory.
    pub fn create(dir: Option<&Path>, extension: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let suffix = format!(".{}", extension);
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX).suffix(&suffix);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        // If the write fails, `file` is dropped here and the path removed.
        file.write_all(bytes)?;
        file.flush()?;

        // Closes the handle; the path is still deleted on drop.
        let path = file.into_temp_path();
        debug!("Scratch file created: {:?} ({} bytes)", path, bytes.len());
        Ok(Self { path })
    }

    /// [`ScratchFile::create`] on the blocking pool, so large payloads don't
    /// stall the async workers while they are written.
    pub async fn create_async(
        dir: Option<PathBuf>,
        extension: String,
        bytes: Vec<u8>,
    ) -> std::io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::create(dir.as_deref(), &extension, &bytes))
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete now and report failures instead of swallowing them in `Drop`.
    pub fn remove(self) -> std::io::Result<()> {
        let path: PathBuf = self.path.to_path_buf();
        self.path.close()?;
        debug!("Scratch file removed: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_bytes_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create(Some(dir.path()), "pdf", b"%PDF-1.4").unwrap();

        let path = scratch.path().to_path_buf();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .starts_with(PREFIX));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchFile::create(Some(dir.path()), "txt", b"Hello").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create(Some(dir.path()), "txt", b"Hello").unwrap();
        let path = scratch.path().to_path_buf();
        scratch.remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFile::create(Some(dir.path()), "txt", b"a").unwrap();
        let b = ScratchFile::create(Some(dir.path()), "txt", b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_create_async_writes_and_drops() {
        let dir = tempfile::tempdir().unwrap();
        let scratch =
            ScratchFile::create_async(Some(dir.path().to_path_buf()), "png".to_string(), vec![1, 2, 3])
                .await
                .unwrap();
        let path = scratch.path().to_path_buf();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_create_async_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(ScratchFile::create_async(Some(missing), "txt".to_string(), b"x".to_vec())
            .await
            .is_err());
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(ScratchFile::create(Some(&missing), "txt", b"x").is_err());
    }
}

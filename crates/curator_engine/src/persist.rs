use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    DownloadDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing.
pub fn ensure_download_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::DownloadDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file
/// then renaming, so an interrupted download never leaves a partial file
/// under the display name.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_download_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace an existing file of the same name.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AtomicFileWriter::new(dir.path().to_path_buf());

        let first = writer.write("cv.docx", b"one").unwrap();
        let second = writer.write("cv.docx", b"two").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn write_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("downloads");
        let writer = AtomicFileWriter::new(nested.clone());

        let path = writer.write("cv.docx", b"bytes").unwrap();
        assert!(path.starts_with(&nested));
        assert_eq!(fs::read(&path).unwrap(), b"bytes");
    }
}

//! Download targets for exported files.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Emits a finished file to the user.
pub trait DownloadSink {
    /// Deliver `bytes` under `suggested_name`. Returns where the file went.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file could not be delivered; nothing is
    /// left behind in that case.
    fn download_file(&self, bytes: &[u8], suggested_name: &str, mime_type: &str)
    -> io::Result<PathBuf>;
}

/// Writes downloads into a directory, replacing earlier files of the same name.
///
/// Data goes to a temporary file in the same directory first and is renamed
/// into place once complete; the temporary file is removed on any failure.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn download_file(
        &self,
        bytes: &[u8],
        suggested_name: &str,
        mime_type: &str,
    ) -> io::Result<PathBuf> {
        let file_name = Path::new(suggested_name)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty file name"))?;
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name);

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|err| err.error)?;

        tracing::debug!(path = %target.display(), mime_type, bytes = bytes.len(), "download written");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_sink_overwrites_previous_download() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        sink.download_file(b"first", "diagram.svg", "image/svg+xml")
            .unwrap();
        let path = sink
            .download_file(b"second", "diagram.svg", "image/svg+xml")
            .unwrap();

        assert_eq!(path, dir.path().join("diagram.svg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // Only the final file remains; no temporaries linger.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_directory_sink_strips_directories_from_name() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let path = sink.download_file(b"x", "../escape.png", "image/png").unwrap();
        assert_eq!(path, dir.path().join("escape.png"));
    }

    #[test]
    fn test_directory_sink_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("diagrams");
        let sink = DirectorySink::new(&nested);
        sink.download_file(b"x", "a.svg", "image/svg+xml").unwrap();
        assert!(nested.join("a.svg").exists());
    }
}

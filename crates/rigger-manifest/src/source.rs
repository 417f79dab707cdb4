use std::io;
use std::path::{Path, PathBuf};

/// Where manifest bytes come from.
pub trait ManifestSource {
    /// Human-readable identifier used in error messages.
    fn origin(&self) -> String;

    fn read(&self) -> io::Result<Vec<u8>>;
}

/// A manifest file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestSource for FileSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// Manifest content already in memory.
#[derive(Debug, Clone)]
pub struct BytesSource {
    label: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

impl ManifestSource for BytesSource {
    fn origin(&self) -> String {
        self.label.clone()
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

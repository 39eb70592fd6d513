use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::FetchError;

/// Image files on disk, one directory per property identifier.
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: &Path) -> ImageStore {
        ImageStore {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, identifier: &str) -> PathBuf {
        self.root.join(identifier_to_key(identifier))
    }

    /// Writes `bytes` to `<root>/<identifier>/<sha256>.jpg` and returns the path.
    ///
    /// The file appears by rename, so readers never see a partial image.
    /// If the write fails, the identifier's directory is removed again
    /// unless it already holds earlier images.
    pub fn save(&self, identifier: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
        if bytes.is_empty() {
            return Err(FetchError::EmptyImage);
        }
        let dir = self.dir_for(identifier);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.jpg", image_hash(bytes)));
        match write_atomic(&dir, &path, bytes) {
            Ok(()) => Ok(path),
            Err(e) => {
                // Only succeeds when empty
                let _ = fs::remove_dir(&dir);
                Err(e.into())
            }
        }
    }

    /// True when the identifier's directory holds at least one `.jpg` file.
    /// Leftover temporary files from an interrupted write do not count.
    pub fn has_images(&self, identifier: &str) -> bool {
        match fs::read_dir(self.dir_for(identifier)) {
            Ok(entries) => entries.flatten().any(|entry| {
                let path = entry.path();
                path.extension().map_or(false, |ext| ext == "jpg")
                    && entry.file_type().map(|t| t.is_file()).unwrap_or(false)
            }),
            Err(_) => false,
        }
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn image_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn identifier_to_key(identifier: &str) -> String {
    let key = identifier.replace("/", "__").replace("\\", "__");
    // "." and ".." would escape the per-identifier directory
    match key.as_str() {
        "" | "." | ".." => format!("_{}", key),
        _ => key,
    }
}

//! Filesystem-backed object store.
//!
//! One regular file per key inside a single root directory. The file name is
//! the percent-encoded key, so keys containing `/` or `..` never escape the
//! root. Writes land in a `~tmp` sibling first and are renamed into place.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::domain::StoreError;
use crate::ports::{ListPage, ObjectStore, ObjectSummary, PutOptions};

/// Marker for in-flight writes. `~` is always percent-encoded in file names,
/// so no encoded key can end with it.
const TEMP_SUFFIX: &str = "~tmp";

/// [`ObjectStore`] over a local (or shared network) directory.
#[derive(Debug, Clone)]
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    /// Use `root` as the store directory, creating it when missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| io_error(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(encode_key(key))
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        _continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let mut objects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            let Some(key) = decode_key(&name) else {
                trace!(%name, "ignoring foreign file");
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                // Removed between read_dir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(&entry.path(), e)),
            };
            objects.push(ObjectSummary::new(key, metadata.len()));
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(ListPage::last(objects))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key);
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                key: key.to_string(),
            },
            _ => io_error(&path, e),
        })
    }

    async fn put(&self, key: &str, body: Vec<u8>, _options: &PutOptions) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| io_error(&temp, e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        trace!(path = %path.display(), bytes = body.len(), "stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, error: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Percent-encode everything outside `[A-Za-z0-9._-]`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.as_bytes() {
        if byte.is_ascii_alphanumeric() || matches!(*byte, b'-' | b'_' | b'.') {
            encoded.push(char::from(*byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    // "." and ".." are not usable file names.
    if encoded.chars().all(|c| c == '.') {
        encoded = encoded.replace('.', "%2E");
    }
    encoded
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

use std::io;
use std::path::PathBuf;

use uuid::Uuid;

/// Attachment blobs on local disk under a flat, randomly keyed layout.
/// Keys are generated server-side and never contain client-supplied path
/// components.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
    base_url: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store a blob and return its generated key.
    pub async fn save(&self, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let key = Uuid::new_v4().simple().to_string();
        tokio::fs::write(self.root.join(&key), bytes).await?;
        Ok(key)
    }

    pub async fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.root.join(key)).await
    }

    /// Remove a stored blob. Removing a key that is already gone is fine.
    pub async fn delete(&self, key: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.root.join(key)).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Public URL for a stored key; None when there is no attachment.
    pub fn file_url(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            None
        } else {
            Some(format!("{}/v1/files/{}", self.base_url, key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url() {
        let storage = FileStorage::new("/tmp/attachments", "http://localhost:4000/");
        assert_eq!(
            storage.file_url("abc123"),
            Some("http://localhost:4000/v1/files/abc123".into())
        );
        assert_eq!(storage.file_url(""), None);
    }

    #[tokio::test]
    async fn test_save_read_delete_round_trip() {
        let dir = std::env::temp_dir().join(format!("galeria-storage-{}", Uuid::new_v4()));
        let storage = FileStorage::new(&dir, "http://localhost:4000");

        let key = storage.save(b"jpeg bytes").await.unwrap();
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(storage.read(&key).await.unwrap(), b"jpeg bytes");

        storage.delete(&key).await.unwrap();
        assert!(storage.read(&key).await.is_err());
        // deleting again is a no-op
        storage.delete(&key).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}

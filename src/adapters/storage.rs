use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// 以本機目錄為根的儲存；寫入時自動建立缺少的目錄
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("data_output");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage
            .write_file("raw_users.csv", b"gender\nfemale\n")
            .await
            .unwrap();

        let data = std::fs::read(base.join("raw_users.csv")).unwrap();
        assert_eq!(data, b"gender\nfemale\n");
    }

    #[tokio::test]
    async fn test_write_into_a_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();
        let storage = LocalStorage::new(blocker.to_str().unwrap().to_string());

        assert!(storage.write_file("clean_users.csv", b"x").await.is_err());
    }
}

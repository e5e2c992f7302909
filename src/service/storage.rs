use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

/// 本地文件存储：上传临时目录、账单目录、视频目录
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    bill_dir: PathBuf,
    video_dir: PathBuf,
}

impl FileStore {
    /// 创建存储并确保目录存在
    pub async fn open(config: &StorageConfig) -> AppResult<Self> {
        let store = Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            bill_dir: PathBuf::from(&config.bill_dir),
            video_dir: PathBuf::from(&config.video_dir),
        };
        for dir in [&store.upload_dir, &store.bill_dir, &store.video_dir] {
            fs::create_dir_all(dir).await?;
        }
        Ok(store)
    }

    /// 保存上传图片到临时目录，返回其路径
    pub async fn save_upload(&self, original_name: Option<&str>, bytes: &[u8]) -> AppResult<PathBuf> {
        let path = self.upload_dir.join(unique_name(original_name));
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    pub async fn remove_upload(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!("failed to remove upload {}: {}", path.display(), e);
        }
    }

    /// 保存账单文件，返回账单 ID
    pub async fn save_bill(&self, extension: &str, bytes: &[u8]) -> AppResult<String> {
        let bill_id = Uuid::new_v4().to_string();
        let path = self.bill_dir.join(format!("{}.{}", bill_id, extension));
        fs::write(&path, bytes).await?;
        tracing::info!("bill {} saved to {}", bill_id, path.display());
        Ok(bill_id)
    }

    pub async fn read_bill(&self, bill_id: &str) -> AppResult<Vec<u8>> {
        check_component(bill_id)?;
        let path = self.bill_dir.join(format!("{}.pdf", bill_id));
        read_existing(&path, "Bill").await
    }

    /// 保存视频，文件名为 `<uuid><原扩展名>`
    pub async fn save_video(&self, original_name: Option<&str>, bytes: &[u8]) -> AppResult<(String, PathBuf)> {
        let name = unique_name(original_name);
        let path = self.video_dir.join(&name);
        fs::write(&path, bytes).await?;
        Ok((name, path))
    }

    pub async fn read_video(&self, filename: &str) -> AppResult<Vec<u8>> {
        check_component(filename)?;
        read_existing(&self.video_dir.join(filename), "Video").await
    }

    pub async fn list_videos(&self) -> AppResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.video_dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn delete_video(&self, filename: &str) -> AppResult<()> {
        check_component(filename)?;
        match fs::remove_file(self.video_dir.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("Video".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_existing(path: &Path, what: &str) -> AppResult<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(what.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// 单个路径分量，禁止目录穿越
fn check_component(name: &str) -> AppResult<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::BadRequest(format!("invalid file name: {}", name)));
    }
    Ok(())
}

/// `<uuid>.<ext>`，扩展名取自原文件名
fn unique_name(original_name: Option<&str>) -> String {
    let id = Uuid::new_v4();
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

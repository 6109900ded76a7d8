//! 下载写入服务 - 业务能力层
//!
//! 只负责"把嵌入结果保存为下载文件"的能力，不关心流程

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// 嵌入结果的固定文件名，无论上传的原图是什么格式都保存为 PNG
pub const ARTIFACT_FILE_NAME: &str = "secure-image.png";

/// 已保存的下载产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub path: PathBuf,
    pub size: usize,
}

/// 下载产物的落地方式
///
/// 渲染层可以替换（例如浏览器中触发下载，测试中记录到内存）。
pub trait ArtifactSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> AppResult<DownloadedArtifact>;
}

/// 保存到本地目录
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> AppResult<DownloadedArtifact> {
        fs::create_dir_all(&self.dir).map_err(|e| AppError::download_failed(&self.dir, e))?;

        let path = self.dir.join(file_name);
        debug!("写入下载文件: {} ({} 字节)", path.display(), bytes.len());
        fs::write(&path, bytes).map_err(|e| AppError::download_failed(&path, e))?;

        Ok(DownloadedArtifact {
            path,
            size: bytes.len(),
        })
    }
}

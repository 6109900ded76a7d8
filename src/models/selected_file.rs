//! 用户选中的文件
//!
//! 浏览器的文件选择 / 拖放由外部提供，这里只关心名称、MIME 类型和字节内容。

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use phf::phf_map;
use regex::Regex;
use tokio::fs;

/// 未知扩展名时使用的 MIME 类型
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// 扩展名 → MIME 类型（替代浏览器提供的 `file.type`）
static EXTENSION_MIME: phf::Map<&'static str, &'static str> = phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "ico" => "image/x-icon",
    "svg" => "image/svg+xml",
    "avif" => "image/avif",
    "txt" => "text/plain",
    "json" => "application/json",
    "pdf" => "application/pdf",
    "zip" => "application/zip",
    "mp4" => "video/mp4",
};

static IMAGE_MIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^image/[\w.+-]+$").expect("image MIME pattern is valid"));

/// 选中的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// 文件名（用作 multipart 中的 filename）
    pub name: String,
    /// MIME 类型
    pub mime: String,
    /// 文件内容
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// 从磁盘读取文件，并根据扩展名推断 MIME 类型
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        Ok(Self::new(name, mime_for_path(path), bytes))
    }

    /// 是否属于图片类别
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 生成 `data:` URI 预览
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// 根据扩展名推断 MIME 类型（大小写不敏感）
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| EXTENSION_MIME.get(ext.to_ascii_lowercase().as_str()).copied())
        .unwrap_or(FALLBACK_MIME)
}

pub fn is_image_mime(mime: &str) -> bool {
    IMAGE_MIME.is_match(mime)
}

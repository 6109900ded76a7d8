use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 水印服务地址（不含 `/api` 前缀）
    pub api_base_url: String,
    /// 嵌入结果的下载目录
    pub download_dir: PathBuf,
    /// 通知自动消失的时长（毫秒）
    pub notification_ttl_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            download_dir: PathBuf::from("."),
            notification_ttl_ms: 3000,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("PIXELPROOF_API_URL").unwrap_or(default.api_base_url),
            download_dir: std::env::var("PIXELPROOF_DOWNLOAD_DIR").map(PathBuf::from).unwrap_or(default.download_dir),
            notification_ttl_ms: std::env::var("PIXELPROOF_NOTIFICATION_TTL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.notification_ttl_ms),
            verbose_logging: std::env::var("PIXELPROOF_VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(config)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

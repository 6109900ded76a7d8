use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::WorkflowKind;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 本地校验失败（不会触达网络）
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 请求水印服务失败
    #[error(transparent)]
    Request(#[from] RequestError),
    /// 写入下载产物失败
    #[error("Failed to save download ({}): {source}", .path.display())]
    Download {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// 本地校验错误
///
/// 文案与界面提示保持一致，直接作为通知内容展示。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 文件不是图片
    #[error("Only image files are allowed.")]
    NotAnImage { mime: String },
    /// 尚未选择文件
    #[error("{}", no_file_message(.0))]
    NoFileSelected(WorkflowKind),
    /// 密文为空（去除首尾空白后）
    #[error("Please enter a secret signature.")]
    EmptySecret,
}

fn no_file_message(kind: &WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::Embed => "Please select an image first.",
        WorkflowKind::Verify => "Please upload an image to scan.",
    }
}

/// 请求错误
///
/// `Display` 输出即为展示给用户的最具体信息。
#[derive(Debug, Error)]
pub enum RequestError {
    /// 服务返回非 2xx 状态
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 响应体无法解析
    #[error("{message}")]
    MalformedBody { message: String },
    /// 传输层失败（连接、读取响应体等）
    #[error("{source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    /// HTTP 状态码（仅状态错误有）
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建下载写入错误
    pub fn download_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Download {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

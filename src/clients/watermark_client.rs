/// 水印服务 API 客户端
///
/// 只负责发送 HTTP 请求，不解释响应状态
use anyhow::{Context, Result};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;

/// 健康检查响应
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

/// 水印服务 API 客户端
///
/// 内部的 `reqwest::Client` 基于 Arc，clone 后两个工作流共用连接池，互不共享状态。
/// 不设置请求超时：请求总会等到结算。
#[derive(Clone, Debug)]
pub struct WatermarkClient {
    client: Client,
    base_url: String,
}

impl WatermarkClient {
    /// 创建新的水印服务客户端
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 以 multipart 表单 POST，返回原始响应
    pub async fn post_multipart(&self, path: &str, form: Form) -> reqwest::Result<Response> {
        let url = self.build_url(path);
        debug!("POST {}", url);
        self.client.post(&url).multipart(form).send().await
    }

    /// 检查服务健康状态
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.build_url("/health");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("无法连接水印服务: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("健康检查失败，状态码: {}", status);
        }

        response
            .json::<HealthStatus>()
            .await
            .context("无法解析健康检查响应")
    }
}

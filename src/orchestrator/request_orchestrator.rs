//! 请求编排器 - 编排层
//!
//! ## 职责
//!
//! 负责单个工作流的请求生命周期：构造 multipart 请求、提交、等待唯一的响应、
//! 将非 2xx 响应解释为错误。
//!
//! ## 状态约束
//!
//! - 每个工作流实例同一时刻最多一个请求（`begin` 在请求中时返回 `None`）
//! - 每条退出路径都恰好离开 InFlight 一次（`InFlightGuard` 未结算即被丢弃时记为失败）
//! - 不校验内容，只负责传输；前置条件由工作流检查

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clients::WatermarkClient;
use crate::error::RequestError;
use crate::models::{RequestState, SelectedFile};
use crate::utils::truncate_text;
use crate::workflow::WorkflowKind;

/// multipart 中图片字段的固定名称
pub const IMAGE_FIELD: &str = "image";

/// 水印服务接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Embed,
    Extract,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Embed => "/api/embed",
            Endpoint::Extract => "/api/extract",
        }
    }

    /// 服务没有给出错误信息时使用的通用文案
    pub fn fallback_message(self) -> &'static str {
        match self {
            Endpoint::Embed => "Failed to embed text",
            Endpoint::Extract => "Failed to extract watermark",
        }
    }
}

/// 请求内容：图片 + 工作流特有的文本字段
#[derive(Debug, Clone)]
pub struct RequestParts {
    image: SelectedFile,
    fields: Vec<(&'static str, String)>,
}

impl RequestParts {
    pub fn new(image: SelectedFile) -> Self {
        Self {
            image,
            fields: Vec::new(),
        }
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    fn into_form(self) -> reqwest::Result<Form> {
        let image = Part::bytes(self.image.bytes)
            .file_name(self.image.name)
            .mime_str(&self.image.mime)?;

        let form = self
            .fields
            .into_iter()
            .fold(Form::new().part(IMAGE_FIELD, image), |form, (name, value)| {
                form.text(name, value)
            });

        Ok(form)
    }
}

/// 成功（2xx）的原始响应，由工作流自行解释
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    /// 将响应体解析为 JSON；失败时视为响应异常，使用接口的通用文案
    pub fn json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, RequestError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            warn!("响应体无法解析 ({}): {}", endpoint.path(), e);
            RequestError::MalformedBody {
                message: endpoint.fallback_message().to_string(),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// 从错误响应中取出服务给出的信息，取不到时使用通用文案
pub fn error_message(body: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// 请求编排器
///
/// 每个工作流持有一个实例；状态通过 watch 通道发布，渲染层可订阅。
#[derive(Debug)]
pub struct RequestOrchestrator {
    client: WatermarkClient,
    kind: WorkflowKind,
    state: Arc<watch::Sender<RequestState>>,
}

impl RequestOrchestrator {
    pub fn new(client: WatermarkClient, kind: WorkflowKind) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            client,
            kind,
            state: Arc::new(state),
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    pub fn state(&self) -> RequestState {
        *self.state.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_in_flight()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// 进入 InFlight
    ///
    /// 已有请求在途时返回 `None`（提交按钮处于禁用状态，再次提交无效）。
    pub fn begin(&self) -> Option<InFlightGuard> {
        let acquired = self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                false
            } else {
                *state = RequestState::InFlight;
                true
            }
        });

        if !acquired {
            debug!("{} 请求进行中，忽略重复提交", self.kind);
            return None;
        }

        Some(InFlightGuard {
            state: Arc::clone(&self.state),
            kind: self.kind,
            settled: false,
        })
    }

    /// 用户重置后回到 Idle；请求在途时不做任何事
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_settled() {
                *state = RequestState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// 提交请求并等待结算
    ///
    /// 非 2xx 响应一律返回 `RequestError::Status`，信息优先取响应体中的 `error` 字段。
    pub async fn submit(
        &self,
        endpoint: Endpoint,
        parts: RequestParts,
    ) -> Result<ServiceResponse, RequestError> {
        let path = endpoint.path();
        let transport = |source: reqwest::Error| RequestError::Transport {
            endpoint: path.to_string(),
            source,
        };

        info!("{} 📤 正在提交请求: {}", self.kind, path);

        let form = parts.into_form().map_err(transport)?;
        let response = self
            .client
            .post_multipart(path, form)
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?.to_vec();

        if !status.is_success() {
            let message = error_message(&body, endpoint.fallback_message());
            warn!(
                "{} ⚠️ 服务返回 {}: {}",
                self.kind,
                status,
                truncate_text(&message, 120)
            );
            return Err(RequestError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!("{} 响应 {} ({} 字节)", self.kind, status, body.len());

        Ok(ServiceResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// 在途请求的凭据
///
/// `settle` 结算为成功或失败；未结算就被丢弃（例如任务被取消）时记为失败。
#[derive(Debug)]
pub struct InFlightGuard {
    state: Arc<watch::Sender<RequestState>>,
    kind: WorkflowKind,
    settled: bool,
}

impl InFlightGuard {
    pub fn settle(mut self, succeeded: bool) {
        self.finish(succeeded);
    }

    fn finish(&mut self, succeeded: bool) {
        if self.settled {
            return;
        }
        self.settled = true;

        let next = if succeeded {
            RequestState::Succeeded
        } else {
            RequestState::Failed
        };
        debug!("{} 请求结算: {}", self.kind, next);
        self.state.send_replace(next);
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.finish(false);
    }
}

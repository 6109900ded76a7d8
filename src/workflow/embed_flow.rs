//! 嵌入流程 - 流程层
//!
//! 核心职责：定义"把密文嵌入一张图片"的完整流程
//!
//! 流程顺序：
//! 1. 检查文件和密文（任何网络请求之前）
//! 2. 提交到 `/api/embed`
//! 3. 成功：保存为 `secure-image.png`，清空密文
//! 4. 失败：提示错误，保留文件和密文以便重试

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info};

use crate::clients::WatermarkClient;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{RequestState, SelectedFile};
use crate::orchestrator::request_orchestrator::{Endpoint, RequestOrchestrator, RequestParts};
use crate::presentation::WorkflowView;
use crate::services::{
    ArtifactSink, DownloadedArtifact, FileIntake, NotificationCenter, PreviewHandle,
    ARTIFACT_FILE_NAME,
};
use crate::workflow::{Submission, WorkflowKind};

/// multipart 中密文字段的名称
pub const TEXT_FIELD: &str = "text";

/// 嵌入成功后的提示
pub const EMBED_SUCCESS_MESSAGE: &str = "Watermark embedded successfully! Download started.";

/// 嵌入流程
///
/// - 独占自己的 FileIntake、密文和请求状态
/// - 与验证流程只共享通知中心
pub struct EmbedWorkflow {
    intake: FileIntake,
    secret: Mutex<String>,
    orchestrator: RequestOrchestrator,
    notifications: NotificationCenter,
    sink: Arc<dyn ArtifactSink>,
}

impl EmbedWorkflow {
    /// 创建新的嵌入流程
    pub fn new(
        client: WatermarkClient,
        notifications: NotificationCenter,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            intake: FileIntake::new(),
            secret: Mutex::new(String::new()),
            orchestrator: RequestOrchestrator::new(client, WorkflowKind::Embed),
            notifications,
            sink,
        }
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    /// 选择图片；非图片会弹出错误通知
    pub fn select(&self, file: SelectedFile) -> Result<PreviewHandle, ValidationError> {
        let handle = self.intake.select(file).map_err(|e| self.reject(e))?;
        self.orchestrator.reset();
        Ok(handle)
    }

    /// 拖放多个文件时取第一个
    pub fn select_first(
        &self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Option<Result<PreviewHandle, ValidationError>> {
        files.into_iter().next().map(|file| self.select(file))
    }

    /// 移除当前图片
    pub fn clear(&self) {
        self.intake.clear();
        self.orchestrator.reset();
    }

    pub fn set_secret(&self, text: impl Into<String>) {
        *self.lock_secret() = text.into();
    }

    pub fn secret(&self) -> String {
        self.lock_secret().clone()
    }

    pub fn state(&self) -> RequestState {
        self.orchestrator.state()
    }

    pub fn view(&self) -> WorkflowView {
        WorkflowView {
            kind: self.orchestrator.kind(),
            state: self.state(),
            has_file: self.intake.has_file(),
            preview_visible: self.intake.is_preview_visible(),
            outcome: None,
        }
    }

    /// 提交嵌入请求
    ///
    /// 请求在途时直接返回 `Submission::Ignored`，不会发出第二个请求。
    pub async fn submit(&self) -> AppResult<Submission<DownloadedArtifact>> {
        if self.orchestrator.is_busy() {
            return Ok(Submission::Ignored);
        }

        let Some(file) = self.intake.file() else {
            return Err(self.reject(ValidationError::NoFileSelected(WorkflowKind::Embed)).into());
        };

        let text = self.lock_secret().trim().to_string();
        if text.is_empty() {
            return Err(self.reject(ValidationError::EmptySecret).into());
        }

        let Some(guard) = self.orchestrator.begin() else {
            return Ok(Submission::Ignored);
        };

        info!(
            "{} 🔏 嵌入密文 (长度: {} 字符) → {}",
            WorkflowKind::Embed,
            text.chars().count(),
            file.name
        );

        let result = self.embed(file, text).await;
        guard.settle(result.is_ok());

        match result {
            Ok(artifact) => {
                info!(
                    "{} ✓ 已保存: {} ({} 字节)",
                    WorkflowKind::Embed,
                    artifact.path.display(),
                    artifact.size
                );
                self.notifications.info(EMBED_SUCCESS_MESSAGE);
                // 密文只用一次
                self.lock_secret().clear();
                Ok(Submission::Settled(artifact))
            }
            Err(e) => {
                error!("{} ❌ 嵌入失败: {}", WorkflowKind::Embed, e);
                self.notifications.error(e.to_string());
                Err(e)
            }
        }
    }

    async fn embed(&self, file: SelectedFile, text: String) -> AppResult<DownloadedArtifact> {
        let parts = RequestParts::new(file).text(TEXT_FIELD, text);
        let response = self
            .orchestrator
            .submit(Endpoint::Embed, parts)
            .await
            .map_err(AppError::from)?;

        self.sink.save(ARTIFACT_FILE_NAME, &response.body)
    }

    fn reject(&self, err: ValidationError) -> ValidationError {
        self.notifications.error(err.to_string());
        err
    }

    fn lock_secret(&self) -> MutexGuard<'_, String> {
        self.secret.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

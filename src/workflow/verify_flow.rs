//! 验证流程 - 流程层
//!
//! 核心职责：定义"从一张图片中提取水印"的完整流程
//!
//! 流程顺序：
//! 1. 检查文件（任何网络请求之前）
//! 2. 提交到 `/api/extract`
//! 3. 成功：解析 `{found, text?, message?}`，显示"找到 / 未找到"之一
//! 4. 失败：提示错误，隐藏旧结果

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use crate::clients::WatermarkClient;
use crate::error::{AppResult, RequestError, ValidationError};
use crate::models::{ExtractResponse, RequestState, SelectedFile, VerificationOutcome};
use crate::orchestrator::request_orchestrator::{Endpoint, RequestOrchestrator, RequestParts};
use crate::presentation::WorkflowView;
use crate::services::{FileIntake, NotificationCenter, PreviewHandle};
use crate::utils::truncate_text;
use crate::workflow::{Submission, WorkflowKind};

/// 验证流程
///
/// 新选择的图片会使旧结果失效：选择成功后立即隐藏结果。
pub struct VerifyWorkflow {
    intake: FileIntake,
    outcome: Mutex<Option<VerificationOutcome>>,
    orchestrator: RequestOrchestrator,
    notifications: NotificationCenter,
}

impl VerifyWorkflow {
    /// 创建新的验证流程
    pub fn new(client: WatermarkClient, notifications: NotificationCenter) -> Self {
        Self {
            intake: FileIntake::new(),
            outcome: Mutex::new(None),
            orchestrator: RequestOrchestrator::new(client, WorkflowKind::Verify),
            notifications,
        }
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    /// 选择图片；成功时清除上一次的结果
    pub fn select(&self, file: SelectedFile) -> Result<PreviewHandle, ValidationError> {
        let handle = self.intake.select(file).map_err(|e| self.reject(e))?;
        self.lock_outcome().take();
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

    /// 移除当前图片并隐藏结果
    pub fn clear(&self) {
        self.intake.clear();
        self.lock_outcome().take();
        self.orchestrator.reset();
    }

    /// 当前显示的结果
    pub fn outcome(&self) -> Option<VerificationOutcome> {
        self.lock_outcome().clone()
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
            outcome: self.outcome(),
        }
    }

    /// 提交提取请求
    ///
    /// 2xx 但响应体无法解析时按失败处理。
    /// 请求期间换了图片或清空时，结果不再显示。
    pub async fn submit(&self) -> AppResult<Submission<VerificationOutcome>> {
        let kind = self.orchestrator.kind();
        if self.orchestrator.is_busy() {
            return Ok(Submission::Ignored);
        }

        let Some((file, revision)) = self.intake.current() else {
            return Err(self.reject(ValidationError::NoFileSelected(kind)).into());
        };

        let Some(guard) = self.orchestrator.begin() else {
            return Ok(Submission::Ignored);
        };

        info!("{} 🔍 扫描图片: {}", kind, file.name);

        let result = self.extract(file).await;
        guard.settle(result.is_ok());

        let stale = self.intake.revision() != revision;
        if stale {
            debug!("{} 图片已更换，丢弃版本 {} 的结果", kind, revision);
            self.orchestrator.reset();
        }

        match result {
            Ok(outcome) => {
                if outcome.is_found() {
                    info!(
                        "{} ✓ 找到水印 (长度: {} 字符)",
                        kind,
                        outcome.text().chars().count()
                    );
                } else {
                    info!("{} 未找到水印: {}", kind, truncate_text(outcome.text(), 80));
                }
                if !stale {
                    *self.lock_outcome() = Some(outcome.clone());
                }
                Ok(Submission::Settled(outcome))
            }
            Err(e) => {
                error!("{} ❌ 提取失败: {}", kind, e);
                if !stale {
                    self.lock_outcome().take();
                }
                self.notifications.error(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn extract(&self, file: SelectedFile) -> Result<VerificationOutcome, RequestError> {
        let response = self
            .orchestrator
            .submit(Endpoint::Extract, RequestParts::new(file))
            .await?;

        let body: ExtractResponse = response.json(Endpoint::Extract)?;

        VerificationOutcome::from_response(body).ok_or_else(|| RequestError::MalformedBody {
            message: Endpoint::Extract.fallback_message().to_string(),
        })
    }

    fn reject(&self, err: ValidationError) -> ValidationError {
        self.notifications.error(err.to_string());
        err
    }

    fn lock_outcome(&self) -> MutexGuard<'_, Option<VerificationOutcome>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

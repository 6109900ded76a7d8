//! 文件接收服务 - 业务能力层
//!
//! 只负责"接收并预览一张图片"的能力：校验 MIME 类别、保存文件、异步生成预览、清空。
//! 每个工作流实例独占一个 FileIntake，嵌入与验证之间不共享。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::SelectedFile;

#[derive(Debug, Default)]
struct IntakeState {
    file: Option<SelectedFile>,
    preview: Option<String>,
    /// 输入控件版本，每次选择或清空都会递增
    revision: u64,
}

/// 异步预览的句柄
///
/// 预览在后台生成；若期间文件被替换或清空，结果作废并返回 `None`。
#[derive(Debug)]
pub struct PreviewHandle {
    inner: Preview,
}

#[derive(Debug)]
enum Preview {
    Pending(JoinHandle<Option<String>>),
    Ready(Option<String>),
}

impl PreviewHandle {
    /// 等待预览生成完成
    pub async fn ready(self) -> Option<String> {
        match self.inner {
            Preview::Ready(preview) => preview,
            Preview::Pending(handle) => match handle.await {
                Ok(preview) => preview,
                Err(e) => {
                    warn!("预览任务异常结束: {}", e);
                    None
                }
            },
        }
    }
}

/// 文件接收服务
#[derive(Debug, Default)]
pub struct FileIntake {
    state: Arc<Mutex<IntakeState>>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// 选择文件
    ///
    /// 非图片文件返回 `NotAnImage`，已有状态保持不变。
    /// 成功时立即替换当前文件，预览在后台任务中生成，不阻塞调用方。
    pub fn select(&self, file: SelectedFile) -> Result<PreviewHandle, ValidationError> {
        if !file.is_image() {
            debug!("拒绝非图片文件: {} ({})", file.name, file.mime);
            return Err(ValidationError::NotAnImage { mime: file.mime });
        }

        debug!("接收文件: {} ({}, {} 字节)", file.name, file.mime, file.len());

        let revision = {
            let mut state = self.lock();
            state.revision += 1;
            state.file = Some(file.clone());
            state.preview = None;
            state.revision
        };

        let inner = match Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.state);
                Preview::Pending(runtime.spawn(async move {
                    let preview = tokio::task::spawn_blocking(move || file.to_data_uri())
                        .await
                        .ok()?;
                    store_preview(&shared, revision, preview)
                }))
            }
            Err(_) => {
                warn!("没有可用的 tokio 运行时，预览在当前线程生成");
                Preview::Ready(store_preview(&self.state, revision, file.to_data_uri()))
            }
        };

        Ok(PreviewHandle { inner })
    }

    /// 拖放多个文件时只取第一个；空列表直接忽略
    pub fn select_first(
        &self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Option<Result<PreviewHandle, ValidationError>> {
        files.into_iter().next().map(|file| self.select(file))
    }

    /// 清空当前文件和预览，并重置输入控件
    ///
    /// 重置后再次选择同一个文件也会重新触发接收。
    pub fn clear(&self) {
        let mut state = self.lock();
        state.file = None;
        state.preview = None;
        state.revision += 1;
    }

    pub fn file(&self) -> Option<SelectedFile> {
        self.lock().file.clone()
    }

    pub fn has_file(&self) -> bool {
        self.lock().file.is_some()
    }

    pub fn preview(&self) -> Option<String> {
        self.lock().preview.clone()
    }

    pub fn is_preview_visible(&self) -> bool {
        self.lock().preview.is_some()
    }

    /// 输入控件当前版本
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// 当前文件及其所属的版本
    pub fn current(&self) -> Option<(SelectedFile, u64)> {
        let state = self.lock();
        state.file.clone().map(|file| (file, state.revision))
    }

    fn lock(&self) -> MutexGuard<'_, IntakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 仅当版本未变时写入预览
fn store_preview(state: &Mutex<IntakeState>, revision: u64, preview: String) -> Option<String> {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.revision != revision {
        debug!("预览已过期 (版本 {} → {})，丢弃", revision, state.revision);
        return None;
    }
    state.preview = Some(preview.clone());
    Some(preview)
}

//! 状态 → 界面可用性的纯映射
//!
//! 不依赖任何渲染面，渲染层只消费 `Affordances`。

use crate::models::{RequestState, VerificationOutcome};
use crate::workflow::WorkflowKind;

/// 某个工作流此刻的状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub kind: WorkflowKind,
    pub state: RequestState,
    pub has_file: bool,
    pub preview_visible: bool,
    /// 仅验证流程有结果
    pub outcome: Option<VerificationOutcome>,
}

/// 结果区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPanel {
    Hidden,
    /// 找到水印，内容为已转义的 HTML
    Success(String),
    /// 未找到水印，内容为已转义的 HTML
    Failure(String),
}

/// 界面可用性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordances {
    /// 提交按钮是否可点
    pub submit_enabled: bool,
    /// 加载动画
    pub loader_visible: bool,
    /// 按钮文字
    pub label_visible: bool,
    pub preview_visible: bool,
    /// 移除按钮位于预览区内，随预览显示
    pub remove_visible: bool,
    pub result: ResultPanel,
}

pub fn affordances(view: &WorkflowView) -> Affordances {
    let loading = view.state.is_in_flight();

    let result = match &view.outcome {
        Some(outcome @ VerificationOutcome::Found(_)) => ResultPanel::Success(outcome.render_html()),
        Some(outcome @ VerificationOutcome::NotFound(_)) => {
            ResultPanel::Failure(outcome.render_html())
        }
        None => ResultPanel::Hidden,
    };

    Affordances {
        submit_enabled: !loading,
        loader_visible: loading,
        label_visible: !loading,
        preview_visible: view.preview_visible,
        remove_visible: view.preview_visible,
        result,
    }
}

//! 工作流标识
//!
//! 显式传递"当前是哪条流程"，而不是依赖全局状态

use std::fmt::Display;

/// 工作流类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    /// 嵌入水印
    Embed,
    /// 提取 / 验证水印
    Verify,
}

impl Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowKind::Embed => write!(f, "[嵌入]"),
            WorkflowKind::Verify => write!(f, "[验证]"),
        }
    }
}

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    /// 请求已结算为成功
    Settled(T),
    /// 已有请求在途，本次提交被忽略
    Ignored,
}

impl<T> Submission<T> {
    pub fn settled(self) -> Option<T> {
        match self {
            Submission::Settled(value) => Some(value),
            Submission::Ignored => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Submission::Ignored)
    }
}

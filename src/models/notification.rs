use std::fmt;

use chrono::{DateTime, Local};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// 一条短暂显示的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// 通知中心内唯一的编号
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Local>,
}

//! 验证结果
//!
//! 水印内容来自不可信的图片，渲染为 HTML 前必须转义。

use serde::Deserialize;

/// 提取接口的成功响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractResponse {
    pub found: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 服务未给出说明时的默认文案
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "No watermark found or image corrupted.";

/// 验证结果，两种状态互斥
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// 找到水印
    Found(String),
    /// 未找到水印
    NotFound(String),
}

impl VerificationOutcome {
    /// 由响应体构造结果
    ///
    /// `found = true` 却没有 `text` 时返回 `None`，由调用方按响应异常处理。
    pub fn from_response(response: ExtractResponse) -> Option<Self> {
        if response.found {
            response.text.map(VerificationOutcome::Found)
        } else {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NOT_FOUND_MESSAGE.to_string());
            Some(VerificationOutcome::NotFound(message))
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, VerificationOutcome::Found(_))
    }

    /// 标签文案
    pub fn label(&self) -> &'static str {
        match self {
            VerificationOutcome::Found(_) => "Watermark Found:",
            VerificationOutcome::NotFound(_) => "Status:",
        }
    }

    /// 原始文本（未转义，只用于非 HTML 的渲染层）
    pub fn text(&self) -> &str {
        match self {
            VerificationOutcome::Found(text) | VerificationOutcome::NotFound(text) => text,
        }
    }

    /// 结果卡片的 HTML 片段，文本已转义
    pub fn render_html(&self) -> String {
        format!(
            r#"<span class="label-text">{}</span> <strong>{}</strong>"#,
            self.label(),
            escape_html(self.text())
        )
    }
}

/// 将文本转义为可安全插入 HTML 的字面量
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

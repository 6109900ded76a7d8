//! 终端渲染层
//!
//! 水印内容不可信：输出到终端前去掉控制字符，避免 ANSI 转义序列生效。

use crate::presentation::affordance::{affordances, WorkflowView};
use crate::services::DownloadedArtifact;

/// 渲染层接口，可替换为其他界面
pub trait Renderer {
    fn render(&self, view: &WorkflowView);
    fn render_artifact(&self, artifact: &DownloadedArtifact);
}

/// 输出到标准输出
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&self, view: &WorkflowView) {
        println!("{}", describe(view));
    }

    fn render_artifact(&self, artifact: &DownloadedArtifact) {
        println!(
            "⬇️  {} ({} bytes)",
            artifact.path.display(),
            artifact.size
        );
    }
}

/// 生成一段终端文本
pub fn describe(view: &WorkflowView) -> String {
    let a = affordances(view);
    let mut lines = Vec::new();

    let button = if a.loader_visible {
        "⏳ working..."
    } else if a.submit_enabled {
        "ready"
    } else {
        "disabled"
    };
    lines.push(format!(
        "{} state={} preview={} action={}",
        view.kind,
        view.state,
        if a.preview_visible { "shown" } else { "hidden" },
        button
    ));

    if let Some(outcome) = &view.outcome {
        lines.push(format!(
            "{} {}",
            outcome.label(),
            strip_control_chars(outcome.text())
        ));
    }

    lines.join("\n")
}

/// 去掉控制字符（保留空格）
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

//! # PixelProof Client
//!
//! 驱动远程水印服务的客户端：把密文嵌入图片，或从图片中提取并验证水印
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责 HTTP 传输
//! - `WatermarkClient` - `/api/embed`、`/api/extract`、`/health`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `FileIntake` - 接收、校验、预览图片
//! - `NotificationCenter` - 自动消失的通知
//! - `ArtifactSink` - 保存嵌入结果
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 两条互相独立的流程
//! - `EmbedWorkflow` - 图片 + 密文 → 下载 `secure-image.png`
//! - `VerifyWorkflow` - 图片 → 找到 / 未找到
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/request_orchestrator` - 请求生命周期与忙闲状态
//! - `orchestrator/app` - 启动时构造两个工作流，分发命令
//!
//! ### ⑤ 渲染层（Presentation）
//! - `presentation/affordance` - 状态到界面可用性的纯映射
//! - `presentation/terminal` - 终端渲染
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::WatermarkClient;
pub use config::Config;
pub use error::{AppError, AppResult, RequestError, ValidationError};
pub use models::{RequestState, SelectedFile, Severity, VerificationOutcome};
pub use orchestrator::{App, RequestOrchestrator};
pub use services::{FileIntake, NotificationCenter};
pub use workflow::{EmbedWorkflow, Submission, VerifyWorkflow, WorkflowKind};

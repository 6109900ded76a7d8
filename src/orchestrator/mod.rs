//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `request_orchestrator` - 请求编排器
//! - 每个工作流一个实例，保证同一时刻最多一个请求在途
//! - 构造 multipart 请求、等待结算、解释非 2xx 响应
//! - 通过 watch 通道发布 RequestState
//!
//! ### `app` - 应用入口
//! - 启动时构造两个独立的工作流和共享的通知中心
//! - 分发 CLI 命令，调用渲染层
//!
//! ## 层次关系
//!
//! ```text
//! app (分发命令)
//!     ↓
//! workflow::{EmbedWorkflow, VerifyWorkflow} (单条流程)
//!     ↓
//! request_orchestrator (请求生命周期)      services (intake / notification / sink)
//!     ↓
//! clients::WatermarkClient (HTTP)
//! ```

pub mod app;
pub mod request_orchestrator;

pub use app::App;
pub use request_orchestrator::{
    Endpoint, InFlightGuard, RequestOrchestrator, RequestParts, ServiceResponse,
};

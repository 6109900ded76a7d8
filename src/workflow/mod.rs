pub mod embed_flow;
pub mod verify_flow;
pub mod workflow_kind;

pub use embed_flow::EmbedWorkflow;
pub use verify_flow::VerifyWorkflow;
pub use workflow_kind::{Submission, WorkflowKind};

//! 渲染层
//!
//! `affordance` 是纯映射，`terminal` 是 CLI 使用的一种具体渲染面。

pub mod affordance;
pub mod terminal;

pub use affordance::{affordances, Affordances, ResultPanel, WorkflowView};
pub use terminal::{Renderer, TerminalRenderer};

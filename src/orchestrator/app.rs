//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建 HTTP 客户端、通知中心和两个互相独立的工作流实例
//! 2. **命令分发**：把 CLI 命令交给对应的工作流
//! 3. **渲染**：每次操作结束后把工作流快照交给渲染层
//!
//! 两个工作流只在这里构造一次，之间不共享可变状态。

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::Command;
use crate::clients::WatermarkClient;
use crate::config::Config;
use crate::models::SelectedFile;
use crate::presentation::{Renderer, TerminalRenderer};
use crate::services::{DirectorySink, NotificationCenter};
use crate::utils::logging::log_startup;
use crate::workflow::{EmbedWorkflow, Submission, VerifyWorkflow};

/// 应用主结构
pub struct App {
    client: WatermarkClient,
    notifications: NotificationCenter,
    embed: EmbedWorkflow,
    verify: VerifyWorkflow,
    renderer: Box<dyn Renderer + Send + Sync>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: &Config) -> Result<Self> {
        log_startup(config);

        let client = WatermarkClient::new(config)?;
        let notifications = NotificationCenter::new(config.notification_ttl());
        let sink = Arc::new(DirectorySink::new(&config.download_dir));

        Ok(Self {
            embed: EmbedWorkflow::new(client.clone(), notifications.clone(), sink),
            verify: VerifyWorkflow::new(client.clone(), notifications.clone()),
            client,
            notifications,
            renderer: Box::new(TerminalRenderer),
        })
    }

    /// 替换渲染层
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer + Send + Sync>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn embed(&self) -> &EmbedWorkflow {
        &self.embed
    }

    pub fn verify(&self) -> &VerifyWorkflow {
        &self.verify
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// 执行一条命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Embed { image, text } => self.run_embed(&image, &text).await,
            Command::Verify { image } => self.run_verify(&image).await,
            Command::Health => self.run_health().await,
        }
    }

    async fn run_embed(&self, image: &Path, text: &str) -> Result<()> {
        let file = SelectedFile::from_path(image).await?;
        let preview = self.embed.select(file)?;
        if preview.ready().await.is_none() {
            warn!("预览未生成: {}", image.display());
        }

        self.embed.set_secret(text);
        let submission = self.embed.submit().await;
        self.renderer.render(&self.embed.view());

        match submission.context("嵌入失败")? {
            Submission::Settled(artifact) => self.renderer.render_artifact(&artifact),
            Submission::Ignored => warn!("已有嵌入请求在进行中"),
        }
        Ok(())
    }

    async fn run_verify(&self, image: &Path) -> Result<()> {
        let file = SelectedFile::from_path(image).await?;
        let preview = self.verify.select(file)?;
        if preview.ready().await.is_none() {
            warn!("预览未生成: {}", image.display());
        }

        let submission = self.verify.submit().await;
        self.renderer.render(&self.verify.view());

        if submission.context("验证失败")?.is_ignored() {
            warn!("已有验证请求在进行中");
        }
        Ok(())
    }

    async fn run_health(&self) -> Result<()> {
        info!("🩺 检查服务: {}", self.client.base_url());
        let health = self.client.health().await?;
        info!(
            "✓ 服务状态: {} ({})",
            health.status,
            health.service.as_deref().unwrap_or("unknown")
        );
        println!("{}", health.status);
        Ok(())
    }
}

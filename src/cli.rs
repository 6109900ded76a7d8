//! 命令行参数
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pixelproof",
    version,
    about = "Embed and verify hidden text signatures through a watermarking service",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// TOML 配置文件；不指定时读取环境变量
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 输出 debug 级别日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Embed a secret signature into an image and download the result
    Embed {
        /// Image to watermark
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        /// Secret signature text
        #[arg(long)]
        text: String,
    },
    /// Scan an image for an embedded signature
    Verify {
        /// Image to scan
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
    },
    /// Check that the watermarking service is reachable
    Health,
}

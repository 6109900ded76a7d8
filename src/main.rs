use anyhow::Result;
use clap::Parser;

use pixelproof_client::cli::Cli;
use pixelproof_client::utils::logging;
use pixelproof_client::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env(),
    };

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    App::initialize(&config)?.run(cli.command).await?;

    Ok(())
}

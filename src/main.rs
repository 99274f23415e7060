use anyhow::Result;
use clap::Parser;

use quiz_autofill::cli::Cli;
use quiz_autofill::utils::logging;
use quiz_autofill::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置（配置文件 → 环境变量）
    let mut config = Config::load(cli.config.as_deref())?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    cli.dispatch(config).await
}

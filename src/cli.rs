//! 命令行定义与分发

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::infrastructure::JsonFileStore;
use crate::orchestrator::{commands, App};
use crate::services::{ExtractionRequest, UserCommand};

#[derive(Parser, Debug)]
#[command(name = "quiz-autofill", version, about = "把提取好的题目逐题录入网页表单")]
pub struct Cli {
    /// 配置文件（默认读取当前目录的 quiz_autofill.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 接管录入页面，按进度自动续跑（默认）
    Run,
    /// 开始录入（进度归零并刷新页面），然后进入页面循环
    Start,
    /// 停止并重置进度
    Stop,
    /// 清除题目数据
    Clear,
    /// 查看题目数量和进度
    Status,
    /// 从 JSON 文件导入题目
    Import {
        /// 题目文件（数组，或包含数组字段的对象）
        file: PathBuf,
    },
    /// 调用 LLM 从试卷中提取题目
    Extract {
        /// 试卷文件（PDF / 图片 / 文本）
        #[arg(long)]
        document: Option<PathBuf>,
        /// 答案文件
        #[arg(long)]
        answer_key: Option<PathBuf>,
        /// 额外说明，或者直接粘贴的试卷文本
        #[arg(long)]
        text: Option<String>,
        /// 使用的模型（默认取配置）
        #[arg(long)]
        model: Option<String>,
    },
    /// 列出可用的模型
    Models,
}

impl Cli {
    pub async fn dispatch(self, config: Config) -> Result<()> {
        let store = JsonFileStore::new(&config.state_file);

        match self.command.unwrap_or(Command::Run) {
            Command::Run => App::initialize(config).await?.run().await,
            Command::Start => {
                let app = App::initialize(config).await?;
                app.execute(UserCommand::Start).await?;
                app.run().await
            }
            Command::Stop => App::initialize(config).await?.execute(UserCommand::Stop).await,
            Command::Clear => App::initialize(config).await?.execute(UserCommand::Clear).await,
            Command::Status => commands::status(&store).await.map(|_| ()),
            Command::Import { file } => commands::import(&store, &file).await.map(|_| ()),
            Command::Extract {
                document,
                answer_key,
                text,
                model,
            } => {
                let request = ExtractionRequest {
                    document,
                    answer_key,
                    extra_text: text,
                };
                commands::extract(&config, &store, &request, model.as_deref())
                    .await
                    .map(|_| ())
            }
            Command::Models => commands::list_models(&config).await,
        }
    }
}

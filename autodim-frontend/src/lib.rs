pub mod cli;
pub mod errors;
pub mod loader;

use autodim_config::AppConfig;
use cli::CliOptions;
use errors::FrontendError;
use tracing::info;

/// 运行命令行前端：加载平面图并自动标注。
pub fn run_cli(options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    info!("启动 CLI 前端");
    cli::run(options, config).map(|_| ())
}

use std::path::PathBuf;

use autodim_config::{AppConfig, ConfigError, FailurePolicy, OutputMode};
use autodim_frontend::cli::CliOptions;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let mut args = std::env::args().skip(1);
    let mut options = CliOptions::default();
    let mut config_override: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.mode = Some(OutputMode::Json),
            "--report" => options.mode = Some(OutputMode::Report),
            "--isolate" => options.failure_policy = Some(FailurePolicy::Isolate),
            "--abort-all" => options.failure_policy = Some(FailurePolicy::AbortAll),
            "--config" => {
                config_override = Some(PathBuf::from(required_value(&mut args, "--config")));
            }
            "--plan" => {
                options.plan = Some(PathBuf::from(required_value(&mut args, "--plan")));
            }
            "--output" => {
                options.output = Some(PathBuf::from(required_value(&mut args, "--output")));
            }
            other => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
        }
    }

    let (config, fallback) = load_configuration(config_override);
    init_logging(&config);
    if let Some(fallback) = &fallback {
        report_config_fallback(fallback);
    }
    info!("启动 AutoDim 自动标注");

    if let Err(err) = autodim_frontend::run_cli(&options, &config) {
        error!(error = %err, "自动标注失败");
        std::process::exit(1);
    }
}

fn required_value(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    match args.next() {
        Some(value) => value,
        None => {
            eprintln!("`{flag}` 需要提供路径");
            std::process::exit(1);
        }
    }
}

/// 配置加载失败时回退到默认值，错误留待日志初始化后再报告。
struct ConfigFallback {
    explicit: bool,
    error: ConfigError,
}

fn load_configuration(override_path: Option<PathBuf>) -> (AppConfig, Option<ConfigFallback>) {
    let explicit = override_path.is_some();
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(&path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(cfg) => (cfg, None),
        Err(error) => (AppConfig::default(), Some(ConfigFallback { explicit, error })),
    }
}

fn report_config_fallback(fallback: &ConfigFallback) {
    let err = &fallback.error;
    match (fallback.explicit, err) {
        (true, ConfigError::Io { path, .. } | ConfigError::Parse { path, .. }) => {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
        }
        (true, ConfigError::Context { .. }) => {
            warn!(error = %err, "加载指定配置失败，使用默认配置");
        }
        (false, ConfigError::Io { path, .. } | ConfigError::Parse { path, .. }) => {
            warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
        }
        (false, ConfigError::Context { .. }) => {
            warn!(error = %err, "加载默认配置失败，使用内建默认值");
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

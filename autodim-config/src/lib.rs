use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dimensioning: DimensioningConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `AUTODIM_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("AUTODIM_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 单个实体异常（无点定位的柱、没有直线的轴网）时的处理方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 任一实体异常即放弃整个事务。
    #[default]
    AbortAll,
    /// 记录异常实体并跳过，其余实体照常标注。
    Isolate,
}

/// 自动标注的容差与常量。长度单位与宿主文档一致（英尺）。
#[derive(Debug, Clone, Deserialize)]
pub struct DimensioningConfig {
    /// 水平轴网判定：`| |d.x| - 1 |` 的上限。
    #[serde(default = "DimensioningConfig::default_horizontal_tolerance")]
    pub horizontal_tolerance: f64,
    /// 竖向轴网判定：`| |d.y| - 1 |` 的上限。比水平判定宽松一个数量级。
    #[serde(default = "DimensioningConfig::default_vertical_tolerance")]
    pub vertical_tolerance: f64,
    /// 柱面法向与轴网方向、竖直轴的垂直判定阈值（点积绝对值）。
    #[serde(default = "DimensioningConfig::default_perpendicular_tolerance")]
    pub perpendicular_tolerance: f64,
    /// 柱与轴网的最大搜索距离，距离等于该值时不匹配。
    #[serde(default = "DimensioningConfig::default_search_radius")]
    pub search_radius: f64,
    /// 尺寸线相对柱面的偏移量。
    #[serde(default = "DimensioningConfig::default_annotation_offset")]
    pub annotation_offset: f64,
    /// 写入尺寸类型的文字高度。
    #[serde(default = "DimensioningConfig::default_text_size")]
    pub text_size: f64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl DimensioningConfig {
    fn default_horizontal_tolerance() -> f64 {
        1e-6
    }

    fn default_vertical_tolerance() -> f64 {
        1e-5
    }

    fn default_perpendicular_tolerance() -> f64 {
        1e-6
    }

    fn default_search_radius() -> f64 {
        100.0
    }

    fn default_annotation_offset() -> f64 {
        1.64
    }

    fn default_text_size() -> f64 {
        0.00656168
    }
}

impl Default for DimensioningConfig {
    fn default() -> Self {
        Self {
            horizontal_tolerance: Self::default_horizontal_tolerance(),
            vertical_tolerance: Self::default_vertical_tolerance(),
            perpendicular_tolerance: Self::default_perpendicular_tolerance(),
            search_radius: Self::default_search_radius(),
            annotation_offset: Self::default_annotation_offset(),
            text_size: Self::default_text_size(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// 打印标注报告。
    #[default]
    Report,
    /// 输出标注后的文档 JSON。
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontendConfig {
    #[serde(default)]
    pub default_mode: OutputMode,
    /// 标注完成后保存文档的路径，缺省时不保存。
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        let dim = &cfg.dimensioning;
        assert_eq!(dim.horizontal_tolerance, 1e-6);
        assert_eq!(dim.vertical_tolerance, 1e-5);
        assert_eq!(dim.perpendicular_tolerance, 1e-6);
        assert_eq!(dim.search_radius, 100.0);
        assert_eq!(dim.annotation_offset, 1.64);
        assert_eq!(dim.text_size, 0.00656168);
        assert_eq!(dim.failure_policy, FailurePolicy::AbortAll);
        assert_eq!(cfg.frontend.default_mode, OutputMode::Report);
        assert!(cfg.frontend.output_path.is_none());
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [dimensioning]
            search_radius = 40.0
            annotation_offset = 0.5
            failure_policy = "isolate"

            [frontend]
            default_mode = "json"
            output_path = "out/plan.json"
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.dimensioning.search_radius, 40.0);
        assert_eq!(cfg.dimensioning.annotation_offset, 0.5);
        assert_eq!(cfg.dimensioning.failure_policy, FailurePolicy::Isolate);
        // 未给出的字段保持默认值
        assert_eq!(cfg.dimensioning.horizontal_tolerance, 1e-6);
        assert_eq!(cfg.frontend.default_mode, OutputMode::Json);
        assert_eq!(
            cfg.frontend
                .output_path
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("out/plan.json".to_string())
        );
    }

    #[test]
    fn parse_error_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[dimensioning]\nsearch_radius = \"far\"").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV_VAR: &str = "DXFKIT_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub output: OutputConfig,
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

    /// 自动发现配置文件：优先读取环境变量 `DXFKIT_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        let current_dir = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_in(&current_dir, env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
    }

    fn discover_in(base_dir: &Path, explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = base_dir.join("config").join("default.toml");
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

/// 解析器选项。
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    #[serde(default = "ParserConfig::default_prune")]
    pub prune_unreferenced_blocks: bool,
    #[serde(default)]
    pub reachability_iteration_limit: Option<usize>,
    #[serde(default = "ParserConfig::default_window_size")]
    pub stream_window_size: usize,
}

impl ParserConfig {
    fn default_prune() -> bool {
        true
    }

    fn default_window_size() -> usize {
        64 * 1024
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prune_unreferenced_blocks: Self::default_prune(),
            reachability_iteration_limit: None,
            stream_window_size: Self::default_window_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// JSON 输出是否缩进。
    #[serde(default)]
    pub pretty: bool,
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
    fn defaults_are_returned_when_file_missing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cfg = AppConfig::discover_in(dir.path(), None).expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.parser.prune_unreferenced_blocks);
        assert!(cfg.parser.reachability_iteration_limit.is_none());
        assert_eq!(cfg.parser.stream_window_size, 65536);
        assert!(!cfg.output.pretty);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [parser]
            prune_unreferenced_blocks = false
            reachability_iteration_limit = 5000
            stream_window_size = 4096

            [output]
            pretty = true
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert!(!cfg.parser.prune_unreferenced_blocks);
        assert_eq!(cfg.parser.reachability_iteration_limit, Some(5000));
        assert_eq!(cfg.parser.stream_window_size, 4096);
        assert!(cfg.output.pretty);
    }

    #[test]
    fn default_file_in_config_dir_is_discovered() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(dir.path().join("config")).expect("create config dir");
        fs::write(
            dir.path().join("config").join("default.toml"),
            "[logging]\nlevel = \"warn\"\n",
        )
        .expect("write config");

        let cfg = AppConfig::discover_in(dir.path(), None).expect("discover should succeed");
        assert_eq!(cfg.logging.level, "warn");
        assert!(cfg.parser.prune_unreferenced_blocks, "缺省段使用默认值");
    }

    #[test]
    fn explicit_path_wins_and_must_exist() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("missing.toml");
        let err = AppConfig::discover_in(dir.path(), Some(missing)).expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[parser]\nstream_window_size = \"big\"").unwrap();
        let err = AppConfig::from_file(file.path()).expect_err("type mismatch");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dxfkit_config::{AppConfig, ConfigError};
use dxfkit_core::{Document, Entity, Extents3D};
use dxfkit_io::{DxfFacade, ParseOptions, ParseReport};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// ASCII DXF 解析工具。
#[derive(Debug, Parser)]
#[command(name = "dxfkit", version, about = "Parse ASCII DXF drawings into JSON")]
struct Cli {
    /// 配置文件路径，缺省时按 DXFKIT_CONFIG 与 ./config/default.toml 查找。
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// 覆盖配置中的日志等级。
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 解析文件并以 JSON 输出文档。
    Parse {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
        /// 保留顶层实体无法到达的块定义。
        #[arg(long)]
        keep_unreferenced_blocks: bool,
        /// 按窗口流式读取文件。
        #[arg(long)]
        stream: bool,
    },
    /// 输出各段数量、实体类型直方图与模型空间范围。
    Summary {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    // 配置决定日志等级，加载失败的告警要等订阅器就绪后再输出
    let (mut config, config_error) = match load_configuration(cli.config.clone()) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_logging(&config);
    if let Some(err) = config_error {
        warn!(error = %err, "加载配置失败，使用内建默认值");
    }

    if let Err(err) = run(cli.command, &config) {
        error!(error = %err, "执行失败");
        eprintln!("错误：{err:#}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Parse {
            file,
            pretty,
            keep_unreferenced_blocks,
            stream,
        } => {
            let mut options = parse_options(config);
            if keep_unreferenced_blocks {
                options.prune_unreferenced_blocks = false;
            }
            let facade = DxfFacade::with_options(options);
            let report = if stream {
                facade.load_streaming(&file, None)?
            } else {
                facade.load_report(&file)?
            };
            info!(
                path = %file.display(),
                diagnostics = report.diagnostics.len(),
                "解析完成"
            );
            print_json(&report.document, pretty || config.output.pretty)
        }
        Command::Summary { file, pretty } => {
            let report = DxfFacade::with_options(parse_options(config)).load_report(&file)?;
            let summary = Summary::new(&file, &report);
            print_json(&summary, pretty || config.output.pretty)
        }
    }
}

fn parse_options(config: &AppConfig) -> ParseOptions {
    ParseOptions {
        prune_unreferenced_blocks: config.parser.prune_unreferenced_blocks,
        reachability_iteration_limit: config.parser.reachability_iteration_limit,
        stream_window_size: config.parser.stream_window_size,
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("序列化 JSON 失败")?;
    println!("{json}");
    Ok(())
}

/// `summary` 子命令的输出。
#[derive(Debug, Serialize)]
struct Summary {
    file: String,
    version: Option<String>,
    header_variables: usize,
    tables: BTreeMap<String, usize>,
    blocks: usize,
    entities: usize,
    objects: usize,
    diagnostics: usize,
    entity_types: BTreeMap<&'static str, usize>,
    extents: Option<Extents3D>,
}

impl Summary {
    fn new(path: &Path, report: &ParseReport) -> Self {
        let document: &Document = &report.document;
        Self {
            file: path.display().to_string(),
            version: document.version().map(str::to_string),
            header_variables: document.header.len(),
            tables: document
                .tables
                .iter()
                .map(|(name, table)| (name.clone(), table.entries.len()))
                .collect(),
            blocks: document.blocks.len(),
            entities: document.entities.len(),
            objects: document.objects.len(),
            diagnostics: report.diagnostics.len(),
            entity_types: document.entity_histogram(),
            extents: Extents3D::from_points(document.entities.iter().flat_map(Entity::anchor_points)),
        }
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    }
}

/// 日志写到 stderr，stdout 只留给 JSON 输出。
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_flags_are_recognised() {
        let cli = Cli::try_parse_from([
            "dxfkit",
            "--log-level",
            "debug",
            "parse",
            "a.dxf",
            "--pretty",
            "--keep-unreferenced-blocks",
            "--stream",
        ])
        .expect("参数应能解析");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Command::Parse {
            file,
            pretty,
            keep_unreferenced_blocks,
            stream,
        } = cli.command
        else {
            panic!("期望 parse 子命令");
        };
        assert_eq!(file, PathBuf::from("a.dxf"));
        assert!(pretty && keep_unreferenced_blocks && stream);
    }

    #[test]
    fn missing_override_config_is_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = load_configuration(Some(dir.path().join("missing.toml")))
            .expect_err("指定的配置文件不存在");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn config_maps_to_parse_options() {
        let mut config = AppConfig::default();
        config.parser.prune_unreferenced_blocks = false;
        config.parser.reachability_iteration_limit = Some(10);
        let options = parse_options(&config);
        assert!(!options.prune_unreferenced_blocks);
        assert_eq!(options.reachability_iteration_limit, Some(10));
        assert_eq!(options.stream_window_size, 65536);
    }
}

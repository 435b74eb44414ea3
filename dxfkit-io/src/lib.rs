//! ASCII DXF 解析：组码读取、字段规格解释、分段解析、文档组装与块裁剪。

use std::fs;
use std::path::{Path, PathBuf};

use dxfkit_core::Document;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub mod assembler;
pub mod entities;
pub mod error;
pub mod point;
pub mod reader;
pub mod registry;
pub mod resolver;
pub mod sections;
pub mod spec;
pub mod stream;
pub mod xdata;

pub use assembler::{DocumentAssembler, HandleAllocator, SectionKind};
pub use error::{DxfError, Result};
pub use reader::{Diagnostic, DiagnosticKind, GroupReader, Token, split_lines};
pub use resolver::BlockReachability;
pub use stream::{CancellationFlag, DEFAULT_WINDOW_SIZE, DxfStreamParser};

/// 解析选项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// 删除顶层实体无法到达的块定义。
    pub prune_unreferenced_blocks: bool,
    pub reachability_iteration_limit: Option<usize>,
    /// `DxfStreamParser::feed_reader` 的窗口大小。
    pub stream_window_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            prune_unreferenced_blocks: true,
            reachability_iteration_limit: None,
            stream_window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// 解析结果连同过程中记录的可恢复问题。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct DxfParser {
    options: ParseOptions,
}

impl DxfParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, text: &str) -> Result<Document> {
        Ok(self.parse_report(text)?.document)
    }

    pub fn parse_report(&self, text: &str) -> Result<ParseReport> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        self.parse_lines(split_lines(text))
    }

    /// 解析已经切好的行；流式解析器最终也走这里。
    pub fn parse_lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Result<ParseReport> {
        let lines: Vec<&str> = lines.into_iter().collect();
        if lines.iter().all(|line| line.trim().is_empty()) {
            return Err(DxfError::EmptyInput);
        }

        let mut reader = GroupReader::from_lines(lines);
        let mut document = DocumentAssembler::new(&mut reader).run()?;
        let mut diagnostics = reader.take_diagnostics();

        if self.options.prune_unreferenced_blocks {
            let reachability =
                BlockReachability::analyze(&document, self.options.reachability_iteration_limit);
            for name in reachability.missing(&document) {
                warn!(block = name, "引用的块没有定义");
                // 与具体行无关，行号记为 0
                diagnostics.push(Diagnostic {
                    line: 0,
                    kind: DiagnosticKind::MissingBlock {
                        name: name.to_string(),
                    },
                });
            }
            reachability.prune(&mut document);
        }

        info!(
            entities = document.entities.len(),
            blocks = document.blocks.len(),
            tables = document.tables.len(),
            objects = document.objects.len(),
            diagnostics = diagnostics.len(),
            "DXF 解析完成"
        );
        Ok(ParseReport {
            document,
            diagnostics,
        })
    }
}

/// 使用默认选项解析整段文本。
pub fn parse(text: &str) -> Result<Document> {
    DxfParser::default().parse(text)
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse file {path:?}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: DxfError,
    },
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

/// 文件系统入口：读取路径并按给定选项解析。
#[derive(Debug, Clone, Default)]
pub struct DxfFacade {
    options: ParseOptions,
}

impl DxfFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn load_report(&self, path: &Path) -> Result<ParseReport, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut parser = DxfStreamParser::new(self.options.clone());
        parser
            .feed_bytes(&data, true)
            .and_then(|report| report.ok_or(DxfError::EmptyInput))
            .map_err(|source| IoError::ParseError {
                path: path.to_path_buf(),
                source,
            })
    }

    /// 按窗口读取文件，读取期间可通过 `flag` 取消。
    pub fn load_streaming(&self, path: &Path, flag: Option<CancellationFlag>) -> Result<ParseReport, IoError> {
        let file = fs::File::open(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut parser =
            DxfStreamParser::new(self.options.clone()).with_window_size(self.options.stream_window_size);
        if let Some(flag) = flag {
            parser = parser.with_cancellation(flag);
        }
        parser
            .feed_reader(std::io::BufReader::new(file))
            .map_err(|source| IoError::ParseError {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl DocumentLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        Ok(self.load_report(path)?.document)
    }
}

use std::num::ParseIntError;

use thiserror::Error;

/// 致命解析错误。出现后整个解析中止。
#[derive(Debug, Error)]
pub enum DxfError {
    #[error("empty input")]
    EmptyInput,
    #[error("line {line}: invalid group code \"{raw}\"")]
    InvalidGroupCode {
        line: usize,
        raw: String,
        #[source]
        source: ParseIntError,
    },
    #[error("line {line}: expected group code {expected} for the Y ordinate, found {found}")]
    MissingYOrdinate {
        line: usize,
        expected: i32,
        found: i32,
    },
    #[error("line {line}: value \"{raw}\" of group code {code} cannot be cast to a boolean")]
    InvalidBoolean { line: usize, code: i32, raw: String },
    #[error("line {line}: invalid hatch edge type {edge_type}")]
    InvalidEdgeType { line: usize, edge_type: i64 },
    #[error("line {line}: group code {code} holds a {found} value, expected {expected}")]
    UnexpectedValue {
        line: usize,
        code: i32,
        expected: &'static str,
        found: &'static str,
    },
    #[error("line {line}: input is not valid UTF-8")]
    InvalidUtf8 { line: usize },
    #[error("data fed after the final chunk was processed")]
    FeedAfterFinal,
    #[error("parsing cancelled at line {line}")]
    Cancelled { line: usize },
    #[error("i/o failure while reading DXF data: {0}")]
    Io(#[from] std::io::Error),
}

impl DxfError {
    /// 出错位置（从 1 开始的行号）；与具体行无关的错误返回 `None`。
    pub fn line(&self) -> Option<usize> {
        match self {
            DxfError::InvalidGroupCode { line, .. }
            | DxfError::MissingYOrdinate { line, .. }
            | DxfError::InvalidBoolean { line, .. }
            | DxfError::InvalidEdgeType { line, .. }
            | DxfError::UnexpectedValue { line, .. }
            | DxfError::InvalidUtf8 { line }
            | DxfError::Cancelled { line } => Some(*line),
            DxfError::EmptyInput | DxfError::FeedAfterFinal | DxfError::Io(_) => None,
        }
    }
}

pub type Result<T, E = DxfError> = std::result::Result<T, E>;

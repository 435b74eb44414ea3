use std::fmt;

use dxfkit_core::GroupValue;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DxfError, Result};

/// 一个 (组码, 值) 对。
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub code: i32,
    pub value: GroupValue,
}

impl Token {
    pub fn new(code: i32, value: GroupValue) -> Self {
        Self { code, value }
    }

    /// 越过输入末尾时返回的合成 `(0, "EOF")`。
    pub fn eof() -> Self {
        Self::new(0, GroupValue::Text("EOF".to_string()))
    }

    pub fn is(&self, code: i32, value: &str) -> bool {
        self.code == code && self.value.is_text(value)
    }

    pub fn is_eof(&self) -> bool {
        self.is(0, "EOF")
    }

    /// 组码为 0 时的记录类型名。
    pub fn record_name(&self) -> Option<&str> {
        if self.code == 0 { self.value.as_str() } else { None }
    }
}

/// 可恢复问题的分类。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnknownGroupCode { code: i32 },
    InvalidNumber { code: i32, raw: String },
    UnexpectedEndOfInput,
    ReadAfterEof,
    UnknownSection { name: String },
    UnsupportedEntity { name: String },
    UnsupportedTableEntry { name: String },
    UnsupportedObject { name: String },
    MissingBlock { name: String },
}

impl DiagnosticKind {
    /// OBJECTS 段中未支持的对象非常普遍，只在 debug 级别记录。
    fn is_noisy(&self) -> bool {
        matches!(self, DiagnosticKind::UnsupportedObject { .. })
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownGroupCode { code } => write!(f, "组码 {code} 没有定义值类型，按字符串保留"),
            DiagnosticKind::InvalidNumber { code, raw } => {
                write!(f, "组码 {code} 的值 \"{raw}\" 不是有效数字")
            }
            DiagnosticKind::UnexpectedEndOfInput => f.write_str("输入在读到 EOF 组之前结束"),
            DiagnosticKind::ReadAfterEof => f.write_str("EOF 组之后仍在读取"),
            DiagnosticKind::UnknownSection { name } => write!(f, "跳过未知段 {name}"),
            DiagnosticKind::UnsupportedEntity { name } => write!(f, "不支持的实体类型 {name}"),
            DiagnosticKind::UnsupportedTableEntry { name } => write!(f, "不支持的表项类型 {name}"),
            DiagnosticKind::UnsupportedObject { name } => write!(f, "不支持的对象类型 {name}"),
            DiagnosticKind::MissingBlock { name } => write!(f, "引用的块 {name} 没有定义"),
        }
    }
}

/// 记录下来的可恢复问题。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第 {} 行：{}", self.line, self.kind)
    }
}

/// 组码值的类型，完全由组码区间决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Float,
    Integer,
    Bool,
}

pub fn value_kind(code: i32) -> Option<ValueKind> {
    match code {
        0..=9 => Some(ValueKind::Text),
        10..=59 | 110..=149 | 210..=239 | 460..=469 | 1010..=1059 => Some(ValueKind::Float),
        60..=99
        | 160..=179
        | 270..=289
        | 370..=389
        | 400..=409
        | 420..=429
        | 440..=459
        | 1060..=1071 => Some(ValueKind::Integer),
        290..=299 => Some(ValueKind::Bool),
        100..=109 | 300..=369 | 390..=399 | 410..=419 | 430..=439 | 470..=481 | 999 | 1000..=1009 => {
            Some(ValueKind::Text)
        }
        _ => None,
    }
}

/// 按组码转换原始值。未知组码与无法解析的数字不会中断解析，
/// 问题通过第二个返回值报告。
pub fn coerce(code: i32, raw: &str, line: usize) -> Result<(GroupValue, Option<DiagnosticKind>)> {
    let invalid = || {
        Some(DiagnosticKind::InvalidNumber {
            code,
            raw: raw.to_string(),
        })
    };
    let result = match value_kind(code) {
        Some(ValueKind::Text) => (GroupValue::Text(raw.to_string()), None),
        Some(ValueKind::Float) => match parse_float(raw) {
            Some(value) => (GroupValue::Float(value), None),
            None => (GroupValue::Float(f64::NAN), invalid()),
        },
        Some(ValueKind::Integer) => match parse_integer(raw) {
            Some(value) => (GroupValue::Integer(value), None),
            None => (GroupValue::Integer(0), invalid()),
        },
        Some(ValueKind::Bool) => match raw.trim() {
            "0" => (GroupValue::Bool(false), None),
            "1" => (GroupValue::Bool(true), None),
            _ => {
                return Err(DxfError::InvalidBoolean {
                    line,
                    code,
                    raw: raw.to_string(),
                });
            }
        },
        None => (
            GroupValue::Text(raw.to_string()),
            Some(DiagnosticKind::UnknownGroupCode { code }),
        ),
    };
    Ok(result)
}

/// 取能解析为浮点数的最长前缀，"1.5mm" 读作 1.5。
fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value);
    }
    trimmed
        .char_indices()
        .map(|(idx, _)| idx)
        .skip(1)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .find_map(|end| trimmed[..end].parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// 取开头的十进制整数部分："1.0" 读作 1，"12abc" 读作 12。
fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let digits_start = usize::from(trimmed.starts_with(['+', '-']));
    let digits_len = trimmed[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    let prefix = &trimmed[..digits_start + digits_len];
    // 超出 i64 范围时饱和
    Some(prefix.parse::<i64>().unwrap_or(if prefix.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

pub(crate) fn parse_group_code(raw: &str, line: usize) -> Result<i32> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i32>()
        .map_err(|source| DxfError::InvalidGroupCode {
            line,
            raw: trimmed.to_string(),
            source,
        })
}

/// 按 CR、LF 或 CRLF 切分文本；末尾的行结束符之后不再产生空行。
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => {
                lines.push(&text[start..idx]);
                idx += 1;
                start = idx;
            }
            b'\r' => {
                lines.push(&text[start..idx]);
                idx += 1;
                if bytes.get(idx) == Some(&b'\n') {
                    idx += 1;
                }
                start = idx;
            }
            _ => idx += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// 组码读取器：把交替出现的组码行与值行转换为带类型的 [`Token`]。
///
/// 支持 `peek` 预读与多步 `rewind`。读到输入末尾之后继续调用 `next`
/// 不会报错，而是记录诊断并返回合成的 `(0, "EOF")`。
pub struct GroupReader<'a> {
    lines: Vec<&'a str>,
    pointer: usize,
    /// 越过末尾后返回合成 EOF 的次数，回退时先抵消这些读取。
    overrun: usize,
    eof_pointer: Option<usize>,
    /// 已解码过的最远位置；回退后重读的组不再重复报告值诊断。
    decoded_until: usize,
    last_line: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> GroupReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::from_lines(split_lines(text))
    }

    pub fn from_lines(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            pointer: 0,
            overrun: 0,
            eof_pointer: None,
            decoded_until: 0,
            last_line: 0,
            diagnostics: Vec::new(),
        }
    }

    /// 是否已读过真实的 `(0, "EOF")` 组。
    pub fn is_eof(&self) -> bool {
        self.eof_pointer.is_some_and(|at| self.pointer > at)
    }

    pub fn has_next(&self) -> bool {
        !self.is_eof() && self.overrun == 0 && self.pointer + 1 < self.lines.len()
    }

    /// 最近一次返回的组所在的组码行号（从 1 开始）。
    pub fn line(&self) -> usize {
        self.last_line
    }

    pub fn next(&mut self) -> Result<Token> {
        if !self.has_next() {
            self.overrun += 1;
            let kind = if self.is_eof() {
                DiagnosticKind::ReadAfterEof
            } else {
                DiagnosticKind::UnexpectedEndOfInput
            };
            self.diagnose(kind);
            return Ok(Token::eof());
        }

        let line = self.pointer + 1;
        let (token, diagnostic) = self.decode_at(self.pointer)?;
        if token.is_eof() {
            self.eof_pointer = Some(self.pointer);
        }
        let first_visit = self.pointer >= self.decoded_until;
        self.pointer += 2;
        self.decoded_until = self.decoded_until.max(self.pointer);
        self.last_line = line;
        if let Some(kind) = diagnostic.filter(|_| first_visit) {
            self.diagnose(kind);
        }
        Ok(token)
    }

    /// 预读下一组但不前进；已到末尾时返回合成 EOF。
    pub fn peek(&self) -> Result<Token> {
        if !self.has_next() {
            return Ok(Token::eof());
        }
        Ok(self.decode_at(self.pointer)?.0)
    }

    /// 回退 `count` 个组。
    pub fn rewind(&mut self, count: usize) {
        let synthetic = count.min(self.overrun);
        self.overrun -= synthetic;
        let real = count - synthetic;
        self.pointer = self.pointer.saturating_sub(real * 2);
    }

    /// 跳过当前记录余下的组，停在下一个组码 0 之前。
    pub fn skip_to_next_record(&mut self) -> Result<()> {
        loop {
            let token = self.next()?;
            if token.code == 0 {
                self.rewind(1);
                return Ok(());
            }
        }
    }

    pub fn diagnose(&mut self, kind: DiagnosticKind) {
        let line = self.last_line;
        if kind.is_noisy() {
            debug!(line, "{kind}");
        } else {
            warn!(line, "{kind}");
        }
        self.diagnostics.push(Diagnostic { line, kind });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn decode_at(&self, pointer: usize) -> Result<(Token, Option<DiagnosticKind>)> {
        let line = pointer + 1;
        let code = parse_group_code(self.lines[pointer], line)?;
        let (value, diagnostic) = coerce(code, self.lines[pointer + 1], line + 1)?;
        Ok((Token::new(code, value), diagnostic))
    }
}

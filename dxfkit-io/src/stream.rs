//! 推模式的增量解析：按块喂入文本或字节，最后一块到达时统一解析。

use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::{DxfError, Result};
use crate::reader::parse_group_code;
use crate::{DxfParser, ParseOptions, ParseReport};

/// `feed_reader` 默认每次读取的字节数。
pub const DEFAULT_WINDOW_SIZE: usize = 64 * 1024;

const BOM: char = '\u{feff}';

/// 协作式取消标记，可在线程间克隆共享。
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 增量 DXF 解析器。
///
/// 每个完整的组码行在到达时立即校验；值行等到最后统一转换。
/// 块边界可以落在任意位置，包括 CRLF 中间和多字节字符中间。
#[derive(Debug)]
pub struct DxfStreamParser {
    options: ParseOptions,
    window_size: usize,
    cancellation: Option<CancellationFlag>,
    lines: Vec<String>,
    pending: String,
    pending_bytes: Vec<u8>,
    started: bool,
    finished: bool,
}

impl DxfStreamParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            window_size: DEFAULT_WINDOW_SIZE,
            cancellation: None,
            lines: Vec::new(),
            pending: String::new(),
            pending_bytes: Vec::new(),
            started: false,
            finished: false,
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// 已经切分出的完整行数。
    pub fn lines_read(&self) -> usize {
        self.lines.len()
    }

    /// 喂入一段文本。`is_final` 为真时解析累积的全部行并返回结果。
    pub fn feed(&mut self, chunk: &str, is_final: bool) -> Result<Option<ParseReport>> {
        if self.finished {
            return Err(DxfError::FeedAfterFinal);
        }
        if !self.pending_bytes.is_empty() {
            return Err(DxfError::InvalidUtf8 {
                line: self.current_line(""),
            });
        }
        self.push_text(chunk)?;
        if is_final { self.complete().map(Some) } else { Ok(None) }
    }

    /// 喂入一段 UTF-8 字节；被截断的多字节字符留到下一块拼接。
    pub fn feed_bytes(&mut self, bytes: &[u8], is_final: bool) -> Result<Option<ParseReport>> {
        if self.finished {
            return Err(DxfError::FeedAfterFinal);
        }
        let mut buffer = std::mem::take(&mut self.pending_bytes);
        buffer.extend_from_slice(bytes);

        let valid = match std::str::from_utf8(&buffer) {
            Ok(text) => text.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => {
                let prefix = String::from_utf8_lossy(&buffer[..err.valid_up_to()]);
                return Err(DxfError::InvalidUtf8 {
                    line: self.current_line(&prefix),
                });
            }
        };
        let text = std::str::from_utf8(&buffer[..valid]).map_err(|_| DxfError::InvalidUtf8 {
            line: self.current_line(""),
        })?;
        self.push_text(text)?;
        self.pending_bytes = buffer[valid..].to_vec();

        if is_final { self.complete().map(Some) } else { Ok(None) }
    }

    /// 按固定窗口读完 `source` 并解析。每个窗口之前检查一次取消标记。
    pub fn feed_reader<R: Read>(&mut self, mut source: R) -> Result<ParseReport> {
        let mut window = vec![0u8; self.window_size];
        loop {
            if self.cancellation.as_ref().is_some_and(CancellationFlag::is_cancelled) {
                debug!(line = self.lines.len(), "解析被取消");
                return Err(DxfError::Cancelled {
                    line: self.lines.len(),
                });
            }
            let read = match source.read(&mut window) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if read == 0 {
                break;
            }
            trace!(bytes = read, "读取窗口");
            self.feed_bytes(&window[..read], false)?;
        }
        self.finish()
    }

    /// 结束输入并解析，等价于喂入一个空的最终块。
    pub fn finish(&mut self) -> Result<ParseReport> {
        if self.finished {
            return Err(DxfError::FeedAfterFinal);
        }
        self.complete()
    }

    fn push_text(&mut self, chunk: &str) -> Result<()> {
        if self.finished {
            return Err(DxfError::FeedAfterFinal);
        }
        let mut chunk = chunk;
        if !self.started && !chunk.is_empty() {
            self.started = true;
            chunk = chunk.strip_prefix(BOM).unwrap_or(chunk);
        }

        let mut buffer = std::mem::take(&mut self.pending);
        buffer.push_str(chunk);
        let bytes = buffer.as_bytes();
        let mut start = 0;
        let mut idx = 0;
        while idx < bytes.len() {
            match bytes[idx] {
                b'\n' => {
                    self.push_line(&buffer[start..idx])?;
                    idx += 1;
                    start = idx;
                }
                b'\r' => {
                    // 行尾的 CR 要等下一块决定是否属于 CRLF
                    if idx + 1 == bytes.len() {
                        break;
                    }
                    self.push_line(&buffer[start..idx])?;
                    idx += if bytes[idx + 1] == b'\n' { 2 } else { 1 };
                    start = idx;
                }
                _ => idx += 1,
            }
        }
        self.pending = buffer[start..].to_string();
        Ok(())
    }

    fn push_line(&mut self, line: &str) -> Result<()> {
        let number = self.lines.len() + 1;
        if number % 2 == 1 {
            parse_group_code(line, number)?;
        }
        self.lines.push(line.to_string());
        Ok(())
    }

    fn complete(&mut self) -> Result<ParseReport> {
        if !self.pending_bytes.is_empty() {
            return Err(DxfError::InvalidUtf8 {
                line: self.current_line(""),
            });
        }
        self.finished = true;

        // 末尾单独的 CR 同样结束一行
        let rest = std::mem::take(&mut self.pending);
        match rest.strip_suffix('\r') {
            Some(line) => self.push_line(line)?,
            None if !rest.is_empty() => self.push_line(&rest)?,
            None => {}
        }

        debug!(lines = self.lines.len(), "流式输入结束，开始解析");
        DxfParser::new(self.options.clone()).parse_lines(self.lines.iter().map(String::as_str))
    }

    /// 尚未成行的文本加上 `extra` 之后，下一个字符所在的行号。
    fn current_line(&self, extra: &str) -> usize {
        let text = format!("{}{extra}", self.pending);
        let bytes = text.as_bytes();
        let breaks = bytes
            .iter()
            .enumerate()
            .filter(|&(idx, &byte)| byte == b'\n' || (byte == b'\r' && bytes.get(idx + 1) != Some(&b'\n')))
            .count();
        self.lines.len() + breaks + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use dxfkit_core::Entity;

    const LINE_DXF: &str = concat!(
        "0\r\nSECTION\r\n2\r\nENTITIES\r\n",
        "0\r\nLINE\r\n5\r\n2A\r\n8\r\n墙体\r\n10\r\n1.5\r\n20\r\n2\r\n11\r\n3\r\n21\r\n4\r\n",
        "0\r\nENDSEC\r\n0\r\nEOF\r\n",
    );

    #[test]
    fn any_split_point_matches_whole_text() {
        let expected = parse(LINE_DXF).expect("整体解析失败");
        let boundaries = LINE_DXF.char_indices().map(|(idx, _)| idx).skip(1);
        for split in boundaries {
            let mut parser = DxfStreamParser::new(ParseOptions::default());
            assert!(parser.feed(&LINE_DXF[..split], false).expect("喂入失败").is_none());
            let report = parser
                .feed(&LINE_DXF[split..], true)
                .expect("喂入失败")
                .expect("最终块应返回结果");
            assert_eq!(report.document, expected, "在 {split} 处切分");
        }
    }

    #[test]
    fn bytes_split_inside_code_point() {
        let bytes = LINE_DXF.as_bytes();
        let layer_at = LINE_DXF.find('墙').expect("包含图层名");
        let mut parser = DxfStreamParser::new(ParseOptions::default());
        parser.feed_bytes(&bytes[..layer_at + 1], false).expect("喂入失败");
        parser.feed_bytes(&bytes[layer_at + 1..layer_at + 2], false).expect("喂入失败");
        let report = parser
            .feed_bytes(&bytes[layer_at + 2..], true)
            .expect("喂入失败")
            .expect("最终块应返回结果");
        let Entity::Line(line) = &report.document.entities[0] else {
            panic!("期望 LINE");
        };
        assert_eq!(line.common.layer.as_deref(), Some("墙体"));
    }

    #[test]
    fn group_code_lines_are_validated_early() {
        let mut parser = DxfStreamParser::new(ParseOptions::default());
        let err = parser.feed("0\nSECTION\nabc\n", false).expect_err("组码行应立即校验");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn invalid_utf8_reports_line() {
        let mut parser = DxfStreamParser::new(ParseOptions::default());
        let err = parser
            .feed_bytes(b"0\nSECTION\n2\n\xff\n", false)
            .expect_err("非法 UTF-8 应报错");
        assert!(matches!(err, DxfError::InvalidUtf8 { line: 4 }), "{err:?}");
    }

    #[test]
    fn feeding_after_final_fails() {
        let mut parser = DxfStreamParser::new(ParseOptions::default());
        parser.feed(LINE_DXF, true).expect("解析失败");
        assert!(matches!(parser.feed("0\nEOF\n", true), Err(DxfError::FeedAfterFinal)));
        assert!(matches!(parser.finish(), Err(DxfError::FeedAfterFinal)));
    }

    #[test]
    fn reader_windows_and_trailing_cr() {
        let text = LINE_DXF.trim_end_matches('\n');
        let mut parser = DxfStreamParser::new(ParseOptions::default()).with_window_size(7);
        let report = parser.feed_reader(text.as_bytes()).expect("解析失败");
        assert_eq!(report.document, parse(LINE_DXF).expect("整体解析失败"));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn cancellation_is_checked_per_window() {
        let flag = CancellationFlag::new();
        flag.cancel();
        let mut parser = DxfStreamParser::new(ParseOptions::default()).with_cancellation(flag.clone());
        let err = parser.feed_reader(LINE_DXF.as_bytes()).expect_err("应被取消");
        assert!(matches!(err, DxfError::Cancelled { line: 0 }));
        assert!(flag.is_cancelled());
    }
}

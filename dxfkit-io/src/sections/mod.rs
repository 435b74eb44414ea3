//! 各段的解析器。每个解析器读到自己的 ENDSEC（包含）为止；
//! 遇到 `(0, "EOF")` 时回退，让上层看到文件结束。

pub mod blocks;
pub mod entities;
pub mod header;
pub mod objects;
pub mod tables;

use crate::error::Result;
use crate::reader::GroupReader;

/// 跳过一个不解析的段，直到 ENDSEC。
pub fn skip_section(reader: &mut GroupReader<'_>) -> Result<()> {
    loop {
        let token = reader.next()?;
        if token.is_eof() {
            reader.rewind(1);
            return Ok(());
        }
        if token.is(0, "ENDSEC") {
            return Ok(());
        }
    }
}

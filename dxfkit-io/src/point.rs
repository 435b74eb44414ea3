use dxfkit_core::Point3D;

use crate::error::{DxfError, Result};
use crate::reader::{GroupReader, Token};

/// 从起始 X 组组装坐标点：随后必须是 `code + 10` 的 Y 组，
/// 可选的 `code + 20` Z 组；其他组会被回退留给调用方。
pub fn read_point(reader: &mut GroupReader<'_>, first: &Token) -> Result<Point3D> {
    let x = ordinate(first, reader.line())?;

    let y_token = reader.next()?;
    if y_token.code != first.code + 10 {
        return Err(DxfError::MissingYOrdinate {
            line: reader.line(),
            expected: first.code + 10,
            found: y_token.code,
        });
    }
    let y = ordinate(&y_token, reader.line())?;

    let z_token = reader.next()?;
    if z_token.code != first.code + 20 {
        reader.rewind(1);
        return Ok(Point3D::planar(x, y));
    }
    let z = ordinate(&z_token, reader.line())?;
    Ok(Point3D::new(x, y, z))
}

fn ordinate(token: &Token, line: usize) -> Result<f64> {
    token.value.as_f64().ok_or(DxfError::UnexpectedValue {
        line,
        code: token.code,
        expected: "float",
        found: token.value.kind(),
    })
}

use std::collections::BTreeMap;

use dxfkit_core::HeaderValue;

use crate::error::Result;
use crate::point::read_point;
use crate::reader::GroupReader;

/// 点值变量（如 `$EXTMIN`、`$INSBASE`）使用的组码。
const POINT_CODES: std::ops::RangeInclusive<i32> = 10..=18;

/// 解析 HEADER 段：组码 9 给出变量名，随后的组给出取值。
///
/// 第一个组码 9 之前的组被忽略；同名变量以最后一次出现为准。
pub fn parse_header(reader: &mut GroupReader<'_>) -> Result<BTreeMap<String, HeaderValue>> {
    let mut header = BTreeMap::new();
    let mut current: Option<String> = None;

    loop {
        let token = reader.next()?;
        if token.is_eof() {
            reader.rewind(1);
            break;
        }
        if token.is(0, "ENDSEC") {
            break;
        }
        if token.code == 9 {
            current = Some(token.value.to_string());
            continue;
        }

        let value = if POINT_CODES.contains(&token.code) {
            HeaderValue::Point(read_point(reader, &token)?)
        } else {
            HeaderValue::Value(token.value)
        };
        if let Some(name) = &current {
            header.insert(name.clone(), value);
        }
    }
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxfkit_core::{GroupValue, Point3D};

    #[test]
    fn reads_scalars_and_points() {
        let mut reader = GroupReader::new(concat!(
            "70\n1\n",
            "9\n$ACADVER\n1\nAC1027\n",
            "9\n$INSBASE\n10\n1\n20\n2\n30\n0\n",
            "9\n$LIMMIN\n10\n0\n20\n0\n",
            "9\n$LTSCALE\n40\n1\n9\n$LTSCALE\n40\n2.5\n",
            "0\nENDSEC\n0\nEOF\n",
        ));
        let header = parse_header(&mut reader).expect("解析 HEADER 失败");
        assert_eq!(header.len(), 4);
        assert_eq!(header["$ACADVER"], HeaderValue::Value(GroupValue::from("AC1027")));
        assert_eq!(header["$INSBASE"].as_point(), Some(Point3D::new(1.0, 2.0, 0.0)));
        assert_eq!(header["$LIMMIN"].as_point(), Some(Point3D::planar(0.0, 0.0)));
        assert_eq!(header["$LTSCALE"], HeaderValue::Value(GroupValue::Float(2.5)));
        assert!(reader.next().expect("应能读到下一组").is_eof());
    }

    #[test]
    fn stops_before_eof_without_endsec() {
        let mut reader = GroupReader::new("9\n$CLAYER\n8\nWALLS\n0\nEOF\n");
        let header = parse_header(&mut reader).expect("解析 HEADER 失败");
        assert_eq!(header["$CLAYER"], HeaderValue::Value(GroupValue::from("WALLS")));
        assert!(reader.next().expect("应能读到下一组").is_eof());
    }
}

use dxfkit_core::{XData, XDataEntry, XDataItem, XDataKind, XDataValue};

use crate::error::{DxfError, Result};
use crate::point::read_point;
use crate::reader::{GroupReader, Token};

/// 读取从 1001 组开始的扩展数据。
///
/// 每个 1001 组开启一个新的应用块；遇到组码小于 1000 的组或 EOF 时停止，
/// 并回退该组。1002 `{` / `}` 构成嵌套列表，多余的 `}` 被忽略。
pub fn read_xdata(reader: &mut GroupReader<'_>, first: &Token) -> Result<Vec<XData>> {
    let mut apps = Vec::new();
    let mut current = XData::new(app_name(first, reader.line())?);
    let mut stack: Vec<Vec<XDataEntry>> = vec![Vec::new()];

    let mut token = reader.next()?;
    while token.code >= 1000 && !token.is_eof() {
        match token.code {
            1001 => {
                current.values = fold_stack(std::mem::replace(&mut stack, vec![Vec::new()]));
                let name = app_name(&token, reader.line())?;
                apps.push(std::mem::replace(&mut current, XData::new(name)));
            }
            1002 => {
                if token.value.is_text("{") {
                    stack.push(Vec::new());
                } else if stack.len() > 1 {
                    if let Some(list) = stack.pop() {
                        push_entry(&mut stack, XDataEntry::List(list));
                    }
                }
            }
            _ => {
                if let Some(item) = read_item(reader, &token)? {
                    push_entry(&mut stack, XDataEntry::Item(item));
                }
            }
        }
        token = reader.next()?;
    }
    reader.rewind(1);

    current.values = fold_stack(stack);
    apps.push(current);
    Ok(apps)
}

fn app_name(token: &Token, line: usize) -> Result<String> {
    match token.value.as_str() {
        Some(name) if token.code == 1001 => Ok(name.to_string()),
        _ => Err(DxfError::UnexpectedValue {
            line,
            code: token.code,
            expected: "string",
            found: token.value.kind(),
        }),
    }
}

fn push_entry(stack: &mut [Vec<XDataEntry>], entry: XDataEntry) {
    if let Some(top) = stack.last_mut() {
        top.push(entry);
    }
}

/// 未闭合的列表依次并入上一层。
fn fold_stack(mut stack: Vec<Vec<XDataEntry>>) -> Vec<XDataEntry> {
    while stack.len() > 1 {
        if let Some(list) = stack.pop() {
            push_entry(&mut stack, XDataEntry::List(list));
        }
    }
    stack.pop().unwrap_or_default()
}

fn read_item(reader: &mut GroupReader<'_>, token: &Token) -> Result<Option<XDataItem>> {
    let (name, kind) = match token.code {
        1000 => (None, XDataKind::String),
        1003 => (Some("layer"), XDataKind::String),
        1004 => (None, XDataKind::Hex),
        1005 => (Some("handle"), XDataKind::String),
        1010 => (None, XDataKind::Point),
        1011 => (Some("worldSpacePosition"), XDataKind::Point),
        1012 => (Some("worldSpaceDisplacement"), XDataKind::Point),
        1013 => (Some("worldSpaceDirection"), XDataKind::Point),
        1040 => (None, XDataKind::Real),
        1041 => (Some("distance"), XDataKind::Real),
        1042 => (Some("scale"), XDataKind::Real),
        1070 => (None, XDataKind::Integer),
        1071 => (None, XDataKind::Long),
        // 其他 1000 以上的组码（如点的 Y/Z 分量单独出现）不产生条目
        _ => return Ok(None),
    };

    let value = match kind {
        XDataKind::Point => XDataValue::Point(read_point(reader, token)?),
        XDataKind::Integer | XDataKind::Long => XDataValue::Integer(token.value.as_i64().unwrap_or_default()),
        XDataKind::Real => XDataValue::Real(token.value.as_f64().unwrap_or_default()),
        XDataKind::String | XDataKind::Hex => XDataValue::Text(token.value.to_string()),
    };

    Ok(Some(XDataItem {
        name: name.map(str::to_string),
        kind,
        value,
    }))
}

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;

/// 某个注册应用（组码 1001）附加的扩展数据。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XData {
    pub app_name: String,
    pub values: Vec<XDataEntry>,
}

impl XData {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            values: Vec::new(),
        }
    }

    /// 深度优先遍历所有叶子项。
    pub fn items(&self) -> Vec<&XDataItem> {
        fn walk<'a>(entries: &'a [XDataEntry], out: &mut Vec<&'a XDataItem>) {
            for entry in entries {
                match entry {
                    XDataEntry::Item(item) => out.push(item),
                    XDataEntry::List(children) => walk(children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.values, &mut out);
        out
    }
}

/// 扩展数据项：叶子值或由 1002 `{` / `}` 包围的嵌套列表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XDataEntry {
    List(Vec<XDataEntry>),
    Item(XDataItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XDataItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: XDataKind,
    pub value: XDataValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XDataKind {
    String,
    Hex,
    Real,
    Integer,
    Long,
    Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XDataValue {
    Point(Point3D),
    Integer(i64),
    Real(f64),
    Text(String),
}

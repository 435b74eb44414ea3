use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;

/// 组码值经类型转换后的结果。类型完全由组码决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl GroupValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// 整数值也可按浮点读取。
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupValue::Float(value) => Some(*value),
            GroupValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GroupValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// 布尔码直接返回；整数码按非零判断（DXF 中 67、60 等标志位）。
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GroupValue::Bool(value) => Some(*value),
            GroupValue::Integer(value) => Some(*value != 0),
            _ => None,
        }
    }

    pub fn is_text(&self, expected: &str) -> bool {
        self.as_str() == Some(expected)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GroupValue::Bool(_) => "boolean",
            GroupValue::Integer(_) => "integer",
            GroupValue::Float(_) => "float",
            GroupValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Bool(value) => write!(f, "{}", u8::from(*value)),
            GroupValue::Integer(value) => write!(f, "{value}"),
            GroupValue::Float(value) => write!(f, "{value}"),
            GroupValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for GroupValue {
    fn from(value: &str) -> Self {
        GroupValue::Text(value.to_string())
    }
}

/// HEADER 段变量值：普通组值或由 10/20/30 等组装出的点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Point(Point3D),
    Value(GroupValue),
}

impl HeaderValue {
    pub fn as_point(&self) -> Option<Point3D> {
        match self {
            HeaderValue::Point(point) => Some(*point),
            HeaderValue::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&GroupValue> {
        match self {
            HeaderValue::Value(value) => Some(value),
            HeaderValue::Point(_) => None,
        }
    }
}

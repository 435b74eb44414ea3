//! DXF 文档的数据模型：坐标、组值、实体、符号表、对象图与块定义。

pub mod color;
pub mod document;
pub mod entity;
pub mod geometry;
pub mod object;
pub mod table;
pub mod value;
pub mod xdata;

pub use document::{Block, Document};
pub use entity::{Entity, EntityCommon, EntityRecord};
pub use geometry::{Extents3D, Point3D};
pub use object::{ObjectGraph, ObjectId, ObjectRecord};
pub use table::{Table, TableEntry};
pub use value::{GroupValue, HeaderValue};
pub use xdata::{XData, XDataEntry, XDataItem, XDataKind, XDataValue};

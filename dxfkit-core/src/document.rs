use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::geometry::Point3D;
use crate::object::ObjectGraph;
use crate::table::{LayerEntry, Table, TableEntry};
use crate::value::HeaderValue;
use crate::xdata::XData;

/// BLOCKS 段中的块定义。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub handle: Option<String>,
    pub name: String,
    pub name2: Option<String>,
    pub xref_path: Option<String>,
    pub description: Option<String>,
    pub layer: Option<String>,
    pub position: Option<Point3D>,
    pub owner_handle: Option<String>,
    pub paper_space: bool,
    /// 块类型标志，仅在非零时记录。
    #[serde(rename = "type")]
    pub block_type: Option<i64>,
    pub entities: Vec<Entity>,
    pub xdata: Vec<XData>,
}

impl Block {
    /// 块内引用的其他块名（INSERT 与带块名的 DIMENSION）。
    pub fn referenced_blocks(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().filter_map(Entity::block_reference)
    }
}

/// 一次解析得到的完整文档。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub header: BTreeMap<String, HeaderValue>,
    pub blocks: BTreeMap<String, Block>,
    pub entities: Vec<Entity>,
    pub tables: BTreeMap<String, Table>,
    pub objects: ObjectGraph,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_value(&self, name: &str) -> Option<&HeaderValue> {
        self.header.get(name)
    }

    /// 图纸版本号（`$ACADVER`）。
    pub fn version(&self) -> Option<&str> {
        self.header_value("$ACADVER")?.as_value()?.as_str()
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn layer(&self, name: &str) -> Option<&LayerEntry> {
        match self.table("LAYER")?.find(name)? {
            TableEntry::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn entities_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .iter()
            .filter(move |entity| entity.type_name() == type_name)
    }

    /// 按实体类型名统计数量。
    pub fn entity_histogram(&self) -> BTreeMap<&'static str, usize> {
        let mut histogram = BTreeMap::new();
        for entity in &self.entities {
            *histogram.entry(entity.type_name()).or_insert(0) += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Circle, Insert, Line};
    use crate::value::GroupValue;

    #[test]
    fn histogram_counts_by_type() {
        let mut doc = Document::new();
        doc.entities.push(Line::default().into());
        doc.entities.push(Line::default().into());
        doc.entities.push(Circle::default().into());
        let histogram = doc.entity_histogram();
        assert_eq!(histogram["LINE"], 2);
        assert_eq!(histogram["CIRCLE"], 1);
        assert_eq!(doc.entities_of_type("LINE").count(), 2);
    }

    #[test]
    fn version_reads_acadver() {
        let mut doc = Document::new();
        doc.header.insert(
            "$ACADVER".to_string(),
            HeaderValue::Value(GroupValue::from("AC1032")),
        );
        assert_eq!(doc.version(), Some("AC1032"));
    }

    #[test]
    fn block_lists_references() {
        let mut insert = Insert::default();
        insert.name = "INNER".to_string();
        let block = Block {
            name: "OUTER".to_string(),
            entities: vec![insert.into(), Line::default().into()],
            ..Block::default()
        };
        assert_eq!(block.referenced_blocks().collect::<Vec<_>>(), vec!["INNER"]);
    }
}

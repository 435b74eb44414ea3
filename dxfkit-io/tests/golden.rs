use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use dxfkit_core::{Document, Entity};

/// 文档的稳定摘要：只保留不随字段细节变化的结构信息。
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldenDocument {
    version: Option<String>,
    layers: Vec<String>,
    tables: BTreeMap<String, usize>,
    blocks: Vec<GoldenBlock>,
    entities: Vec<GoldenEntity>,
    objects: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GoldenBlock {
    name: String,
    entities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GoldenEntity {
    kind: String,
    handle: Option<String>,
    layer: String,
}

pub fn assert_golden(name: &str, document: &Document) {
    let snapshot = GoldenDocument::from_document(document);
    let base_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/golden");
    if let Err(err) = fs::create_dir_all(&base_dir) {
        panic!("无法创建黄金数据目录 {}: {err}", base_dir.display());
    }
    let golden_path = base_dir.join(format!("{name}.json"));
    let serialized = serde_json::to_string_pretty(&snapshot).expect("序列化黄金快照失败");

    if !golden_path.exists() {
        fs::write(&golden_path, &serialized)
            .unwrap_or_else(|err| panic!("写入黄金文件 {} 失败: {err}", golden_path.display()));
        panic!(
            "黄金文件 {} 不存在，已自动生成。请确认内容后重新运行测试。",
            golden_path.display()
        );
    }

    let expected_str = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    let expected: GoldenDocument = serde_json::from_str(&expected_str)
        .unwrap_or_else(|err| panic!("解析黄金文件 {} 失败: {err}", golden_path.display()));

    if expected != snapshot {
        let diff_path = base_dir.join(format!("{name}.actual.json"));
        fs::write(&diff_path, &serialized).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前解析结果不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}

impl GoldenDocument {
    fn from_document(document: &Document) -> Self {
        let layers = document
            .table("LAYER")
            .map(|table| {
                table
                    .entries
                    .iter()
                    .filter_map(|entry| entry.name().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let tables = document
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.entries.len()))
            .collect();
        let blocks = document
            .blocks
            .values()
            .map(|block| GoldenBlock {
                name: block.name.clone(),
                entities: block.entities.iter().map(|e| e.type_name().to_string()).collect(),
            })
            .collect();

        Self {
            version: document.version().map(str::to_string),
            layers,
            tables,
            blocks,
            entities: document.entities.iter().map(GoldenEntity::from_entity).collect(),
            objects: document
                .objects
                .objects
                .iter()
                .map(|object| object.type_name().to_string())
                .collect(),
        }
    }
}

impl GoldenEntity {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            kind: entity.type_name().to_string(),
            handle: entity.handle().map(str::to_string),
            layer: entity.common().layer_name().to_string(),
        }
    }
}

//! 顶层状态机：识别 SECTION 标记，分派到各段解析器并组装文档。

use std::collections::BTreeSet;

use dxfkit_core::{Document, Entity, GroupValue, HeaderValue};
use tracing::debug;

use crate::error::Result;
use crate::reader::{DiagnosticKind, GroupReader};
use crate::sections::blocks::parse_blocks;
use crate::sections::entities::parse_entities_section;
use crate::sections::header::parse_header;
use crate::sections::objects::parse_objects;
use crate::sections::skip_section;
use crate::sections::tables::parse_tables;

/// 支持解析的段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Header,
    Blocks,
    Entities,
    Tables,
    Objects,
}

impl SectionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HEADER" => Some(SectionKind::Header),
            "BLOCKS" => Some(SectionKind::Blocks),
            "ENTITIES" => Some(SectionKind::Entities),
            "TABLES" => Some(SectionKind::Tables),
            "OBJECTS" => Some(SectionKind::Objects),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Header => "HEADER",
            SectionKind::Blocks => "BLOCKS",
            SectionKind::Entities => "ENTITIES",
            SectionKind::Tables => "TABLES",
            SectionKind::Objects => "OBJECTS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ScanningTopLevel,
    InSection(SectionKind),
    Eof,
}

/// 驱动一次完整解析的状态机。
pub struct DocumentAssembler<'r, 'a> {
    reader: &'r mut GroupReader<'a>,
    document: Document,
    state: State,
}

impl<'r, 'a> DocumentAssembler<'r, 'a> {
    pub fn new(reader: &'r mut GroupReader<'a>) -> Self {
        Self {
            reader,
            document: Document::new(),
            state: State::ScanningTopLevel,
        }
    }

    /// 读到顶层 `(0, "EOF")`（真实或合成）为止，并为缺少句柄的记录补齐句柄。
    pub fn run(mut self) -> Result<Document> {
        loop {
            match self.state {
                State::ScanningTopLevel => self.scan()?,
                State::InSection(kind) => {
                    self.parse_section(kind)?;
                    self.state = State::ScanningTopLevel;
                }
                State::Eof => break,
            }
        }

        let mut document = self.document;
        HandleAllocator::for_document(&document).assign_document(&mut document);
        Ok(document)
    }

    fn scan(&mut self) -> Result<()> {
        let token = self.reader.next()?;
        if token.is_eof() {
            self.state = State::Eof;
            return Ok(());
        }
        if !token.is(0, "SECTION") {
            return Ok(());
        }

        let name = self.reader.next()?;
        if name.code != 2 {
            self.reader.rewind(1);
            return Ok(());
        }
        let name = name.value.to_string();
        match SectionKind::from_name(&name) {
            Some(kind) => {
                debug!(section = kind.name(), line = self.reader.line(), "进入段");
                self.state = State::InSection(kind);
            }
            None => {
                self.reader.diagnose(DiagnosticKind::UnknownSection { name });
                skip_section(self.reader)?;
            }
        }
        Ok(())
    }

    fn parse_section(&mut self, kind: SectionKind) -> Result<()> {
        let document = &mut self.document;
        match kind {
            SectionKind::Header => document.header.extend(parse_header(self.reader)?),
            SectionKind::Blocks => document.blocks.extend(parse_blocks(self.reader)?),
            SectionKind::Entities => document.entities.extend(parse_entities_section(self.reader)?),
            SectionKind::Tables => {
                for (name, mut table) in parse_tables(self.reader)? {
                    if let Some(existing) = document.tables.remove(&name) {
                        let mut entries = existing.entries;
                        entries.append(&mut table.entries);
                        table.entries = entries;
                    }
                    document.tables.insert(name, table);
                }
            }
            SectionKind::Objects => document.objects = parse_objects(self.reader)?,
        }
        Ok(())
    }
}

/// 为缺少句柄（组码 5）的实体和块分配十六进制顺序句柄。
///
/// 每次解析独立持有一个分配器；起点高于 `$HANDSEED` 与文档中所有真实句柄，
/// 因此补出的句柄两两不同，也不会与源文件中的句柄冲突。句柄空间用尽时
/// 从 1 回绕，并跳过已被占用的句柄。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleAllocator {
    next: u64,
    taken: BTreeSet<u64>,
}

impl HandleAllocator {
    pub fn starting_at(next: u64) -> Self {
        Self {
            next: next.max(1),
            taken: BTreeSet::new(),
        }
    }

    pub fn for_document(document: &Document) -> Self {
        let seed = document
            .header_value("$HANDSEED")
            .and_then(HeaderValue::as_value)
            .and_then(GroupValue::as_str)
            .and_then(parse_handle)
            .unwrap_or(0);
        let taken = document_handles(document);
        let above_real = match taken.last() {
            Some(max) => max.checked_add(1).unwrap_or(1),
            None => 0,
        };
        Self {
            next: seed.max(above_real).max(1),
            taken,
        }
    }

    pub fn allocate(&mut self) -> String {
        loop {
            let candidate = self.next;
            self.next = candidate.checked_add(1).unwrap_or(1);
            if self.taken.insert(candidate) {
                return format!("{candidate:X}");
            }
        }
    }

    fn fill(&mut self, slot: &mut Option<String>) {
        if slot.is_none() {
            *slot = Some(self.allocate());
        }
    }

    /// 连同 POLYLINE 顶点、INSERT 属性等嵌套记录一起补齐。
    pub fn assign_entity(&mut self, entity: &mut Entity) {
        self.fill(&mut entity.common_mut().handle);
        match entity {
            Entity::Polyline(polyline) => {
                for vertex in &mut polyline.vertices {
                    self.fill(&mut vertex.common.handle);
                }
            }
            Entity::Insert(insert) => {
                for attribute in &mut insert.attributes {
                    self.fill(&mut attribute.common.handle);
                    if let Some(mtext) = attribute.embedded_mtext.as_mut() {
                        self.fill(&mut mtext.common.handle);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn assign_document(&mut self, document: &mut Document) {
        for block in document.blocks.values_mut() {
            self.fill(&mut block.handle);
            for entity in &mut block.entities {
                self.assign_entity(entity);
            }
        }
        for entity in &mut document.entities {
            self.assign_entity(entity);
        }
    }
}

fn parse_handle(raw: &str) -> Option<u64> {
    u64::from_str_radix(raw.trim(), 16).ok()
}

fn entity_handles<'e>(entity: &'e Entity) -> Vec<&'e str> {
    let mut handles: Vec<&str> = entity.handle().into_iter().collect();
    match entity {
        Entity::Polyline(polyline) => handles.extend(
            polyline
                .vertices
                .iter()
                .filter_map(|vertex| vertex.common.handle.as_deref()),
        ),
        Entity::Insert(insert) => {
            for attribute in &insert.attributes {
                handles.extend(attribute.common.handle.as_deref());
                handles.extend(
                    attribute
                        .embedded_mtext
                        .as_ref()
                        .and_then(|mtext| mtext.common.handle.as_deref()),
                );
            }
        }
        _ => {}
    }
    handles
}

/// 文档中已出现的全部真实句柄。
fn document_handles(document: &Document) -> BTreeSet<u64> {
    let entities = document
        .entities
        .iter()
        .chain(document.blocks.values().flat_map(|block| block.entities.iter()))
        .flat_map(entity_handles);
    let blocks = document
        .blocks
        .values()
        .filter_map(|block| block.handle.as_deref());
    let tables = document.tables.values().flat_map(|table| {
        table
            .handle
            .as_deref()
            .into_iter()
            .chain(table.entries.iter().filter_map(|entry| entry.common().handle.as_deref()))
    });
    let objects = document.objects.objects.iter().filter_map(|object| object.handle());
    entities
        .chain(blocks)
        .chain(tables)
        .chain(objects)
        .filter_map(parse_handle)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assemble(text: &str) -> (Document, GroupReader<'_>) {
        let mut reader = GroupReader::new(text);
        let document = DocumentAssembler::new(&mut reader).run().expect("组装文档失败");
        (document, reader)
    }

    #[test]
    fn dispatches_sections_and_skips_unknown() {
        let (document, reader) = assemble(concat!(
            "999\ncomment\n",
            "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1015\n0\nENDSEC\n",
            "0\nSECTION\n2\nTHUMBNAILIMAGE\n90\n3\n310\nABCDEF\n0\nENDSEC\n",
            "0\nSECTION\n2\nENTITIES\n0\nLINE\n5\n2F\n8\n0\n10\n0\n20\n0\n11\n1\n21\n1\n0\nENDSEC\n",
            "0\nEOF\n",
        ));
        assert_eq!(document.version(), Some("AC1015"));
        assert_eq!(document.entities.len(), 1);
        assert_eq!(
            reader.diagnostics()[0].kind,
            DiagnosticKind::UnknownSection {
                name: "THUMBNAILIMAGE".to_string()
            }
        );
        assert!(reader.is_eof());
    }

    #[test]
    fn missing_eof_ends_with_diagnostic() {
        let (document, reader) = assemble("0\nSECTION\n2\nENTITIES\n0\nPOINT\n10\n1\n20\n2\n");
        assert_eq!(document.entities.len(), 1);
        assert!(
            reader
                .diagnostics()
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedEndOfInput)
        );
    }

    #[test]
    fn fallback_handles_are_distinct_and_above_real_ones() {
        let (document, _) = assemble(concat!(
            "0\nSECTION\n2\nBLOCKS\n0\nBLOCK\n2\nB\n0\nLINE\n8\n0\n0\nENDBLK\n0\nENDSEC\n",
            "0\nSECTION\n2\nENTITIES\n",
            "0\nLINE\n5\nA0\n8\n0\n",
            "0\nCIRCLE\n8\n0\n40\n1\n",
            "0\nPOLYLINE\n8\n0\n66\n1\n0\nVERTEX\n8\n0\n10\n0\n20\n0\n0\nVERTEX\n8\n0\n10\n1\n20\n1\n0\nSEQEND\n",
            "0\nENDSEC\n0\nEOF\n",
        ));
        let mut handles = HashSet::new();
        let mut collect = |handle: Option<&str>| {
            let handle = handle.expect("每条记录都应有句柄").to_string();
            assert!(handles.insert(handle.clone()), "句柄 {handle} 重复");
            u64::from_str_radix(&handle, 16).expect("十六进制句柄")
        };

        assert_eq!(collect(document.entities[0].handle()), 0xA0);
        for entity in &document.entities[1..] {
            assert!(collect(entity.handle()) > 0xA0);
        }
        let Entity::Polyline(polyline) = &document.entities[2] else {
            panic!("期望 POLYLINE");
        };
        for vertex in &polyline.vertices {
            assert!(collect(vertex.common.handle.as_deref()) > 0xA0);
        }
        let block = &document.blocks["B"];
        assert!(collect(block.handle.as_deref()) > 0xA0);
        assert!(collect(block.entities[0].handle()) > 0xA0);
    }

    #[test]
    fn exhausted_handle_space_wraps_without_reuse() {
        let (document, _) = assemble(concat!(
            "0\nSECTION\n2\nENTITIES\n",
            "0\nLINE\n5\nFFFFFFFFFFFFFFFF\n8\n0\n",
            "0\nLINE\n5\n1\n8\n0\n",
            "0\nLINE\n8\n0\n",
            "0\nENDSEC\n0\nEOF\n",
        ));
        let handles: Vec<_> = document.entities.iter().map(Entity::handle).collect();
        assert_eq!(handles, vec![Some("FFFFFFFFFFFFFFFF"), Some("1"), Some("2")]);

        let mut allocator = HandleAllocator::starting_at(u64::MAX);
        assert_eq!(allocator.allocate(), "FFFFFFFFFFFFFFFF");
        assert_eq!(allocator.allocate(), "1");
    }

    #[test]
    fn allocator_respects_handseed() {
        let mut document = Document::new();
        document.header.insert(
            "$HANDSEED".to_string(),
            HeaderValue::Value(GroupValue::from("200")),
        );
        let mut allocator = HandleAllocator::for_document(&document);
        assert_eq!(allocator.allocate(), "200");
        assert_eq!(allocator.allocate(), "201");
    }
}

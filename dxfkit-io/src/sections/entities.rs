use dxfkit_core::Entity;

use crate::entities::ENTITY_REGISTRY;
use crate::error::Result;
use crate::reader::{DiagnosticKind, GroupReader};

/// 解析 ENTITIES 段，消费结尾的 ENDSEC。
pub fn parse_entities_section(reader: &mut GroupReader<'_>) -> Result<Vec<Entity>> {
    let entities = parse_entity_list(reader)?;
    let token = reader.next()?;
    if !token.is(0, "ENDSEC") {
        reader.rewind(1);
    }
    Ok(entities)
}

/// 连续读取实体记录，停在 ENDBLK、ENDSEC 或 EOF 之前（不消费终止组）。
///
/// 不支持的类型记录诊断后整体跳过；记录之间游离的非 0 组直接丢弃。
pub fn parse_entity_list(reader: &mut GroupReader<'_>) -> Result<Vec<Entity>> {
    let mut entities = Vec::new();
    loop {
        let token = reader.next()?;
        if token.is_eof() || token.is(0, "ENDBLK") || token.is(0, "ENDSEC") {
            reader.rewind(1);
            break;
        }
        let Some(name) = token.record_name() else {
            continue;
        };

        match ENTITY_REGISTRY.parse(name, reader) {
            Some(parsed) => entities.push(parsed?.record),
            None => {
                reader.diagnose(DiagnosticKind::UnsupportedEntity {
                    name: name.to_string(),
                });
                reader.skip_to_next_record()?;
            }
        }
    }
    Ok(entities)
}

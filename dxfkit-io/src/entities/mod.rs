//! ENTITIES 段与块内实体的字段表。

mod basic;
mod dimension;
mod hatch;
mod insert;
mod polyline;
mod text;
mod viewport;

use dxfkit_core::color::aci_to_rgb;
use dxfkit_core::entity::{
    Arc, Attribute, AttributeDefinition, Circle, Dimension, Ellipse, Hatch, Insert, Leader, Line,
    LwPolyline, MText, PointEntity, Polyline, Section, Solid, Spline, Text, Vertex, Viewport,
};
use dxfkit_core::{Entity, EntityRecord};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::RecordRegistry;
use crate::spec::{FieldContext, FieldStep, SpecBuilder};

/// 全部受支持实体类型的注册表。
pub static ENTITY_REGISTRY: Lazy<RecordRegistry<Entity>> = Lazy::new(|| {
    let mut registry = RecordRegistry::new();
    registry.register_record::<Arc>();
    registry.register_record::<AttributeDefinition>();
    registry.register_record::<Attribute>();
    registry.register_record::<Circle>();
    registry.register_record::<Dimension>();
    registry.register_record::<Ellipse>();
    registry.register_record::<Hatch>();
    registry.register_record::<Insert>();
    registry.register_record::<Leader>();
    registry.register_record::<Line>();
    registry.register_record::<LwPolyline>();
    registry.register_record::<MText>();
    registry.register_record::<PointEntity>();
    registry.register_record::<Polyline>();
    registry.register_record::<Section>();
    registry.register_record::<Solid>();
    registry.register_record::<Spline>();
    registry.register_record::<Text>();
    registry.register_record::<Vertex>();
    registry.register_record::<Viewport>();
    registry
});

/// AcDbEntity 公共字段，所有实体的字段表都以它开头。
pub(crate) fn entity_common<R: EntityRecord + 'static>(fields: SpecBuilder<R>) -> SpecBuilder<R> {
    fields
        .field(5, |r, cx| {
            r.common_mut().handle = Some(cx.text()?);
            Ok(())
        })
        .multiple(102, |_, cx| cx.skip_application_group())
        .field(330, |r, cx| {
            r.common_mut().owner_block_record_soft_id = Some(cx.text()?);
            Ok(())
        })
        .ignore(100)
        .field(67, |r, cx| {
            r.common_mut().is_in_paper_space = cx.flag()?;
            Ok(())
        })
        .field(410, |r, cx| {
            r.common_mut().layout_tab_name = Some(cx.text()?);
            Ok(())
        })
        .field(8, |r, cx| {
            r.common_mut().layer = Some(cx.text()?);
            Ok(())
        })
        .field(6, |r, cx| {
            r.common_mut().line_type = Some(cx.text()?);
            Ok(())
        })
        .field(347, |r, cx| {
            r.common_mut().material_object_hard_id = Some(cx.text()?);
            Ok(())
        })
        .field(62, |r, cx| {
            let index = cx.int()?;
            let common = r.common_mut();
            common.color_index = Some(index);
            common.color = aci_to_rgb(index);
            Ok(())
        })
        .field(370, |r, cx| {
            r.common_mut().lineweight = Some(cx.int()?);
            Ok(())
        })
        .field(48, |r, cx| {
            r.common_mut().line_type_scale = Some(cx.float()?);
            Ok(())
        })
        .field(60, |r, cx| {
            r.common_mut().is_visible = Some(cx.flag()?);
            Ok(())
        })
        .field(92, |r, cx| {
            r.common_mut().proxy_byte = Some(cx.int()?);
            Ok(())
        })
        .multiple(310, |r, cx| {
            r.common_mut().proxy_entity.push(cx.text()?);
            Ok(())
        })
        .field(420, |r, cx| {
            r.common_mut().color = u32::try_from(cx.int()?).ok();
            Ok(())
        })
        .field(430, |r, cx| {
            r.common_mut().color_name = Some(cx.text()?);
            Ok(())
        })
        .field(440, |r, cx| {
            r.common_mut().transparency = Some(cx.int()?);
            Ok(())
        })
        .field(390, |r, cx| {
            r.common_mut().plot_style_hard_id = Some(cx.text()?);
            Ok(())
        })
        .field(284, |r, cx| {
            r.common_mut().shadow_mode = Some(cx.int()?);
            Ok(())
        })
        .multiple(1001, |r, cx| {
            let xdata = cx.xdata()?;
            r.common_mut().xdata.extend(xdata);
            Ok(())
        })
}

/// 写入子类标记（组码 100）。
pub(crate) fn subclass<R: EntityRecord>(record: &mut R, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    record.common_mut().subclass_marker = Some(cx.text()?);
    Ok(())
}

/// 跳过 SEQEND 记录体并结束所属记录。
pub(crate) fn finish_sequence(cx: &mut FieldContext<'_, '_>) -> Result<FieldStep> {
    cx.reader().skip_to_next_record()?;
    Ok(FieldStep::EndOfRecord)
}

#[cfg(test)]
pub(crate) fn parse_one<R: crate::spec::SpecRecord>(text: &str) -> R {
    let mut reader = crate::reader::GroupReader::new(text);
    let (record, consumed) = R::parse_from(&mut reader).expect("解析实体失败");
    assert!(consumed, "实体没有消费任何组");
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxfkit_core::entity::SUPPORTED_ENTITY_TYPES;

    #[test]
    fn registry_covers_every_entity_type() {
        for name in SUPPORTED_ENTITY_TYPES {
            assert!(ENTITY_REGISTRY.contains(name), "缺少 {name} 的解析器");
        }
        assert_eq!(ENTITY_REGISTRY.names().count(), SUPPORTED_ENTITY_TYPES.len());
    }

    #[test]
    fn common_fields_resolve_color_and_skip_groups() {
        let line: Line = parse_one(concat!(
            "5\n2A\n102\n{ACAD_REACTORS\n330\n1F\n102\n}\n330\n1F\n100\nAcDbEntity\n8\nWALLS\n",
            "62\n1\n370\n25\n100\nAcDbLine\n10\n0\n20\n0\n30\n0\n11\n5\n21\n5\n31\n0\n0\nEOF\n",
        ));
        assert_eq!(line.common.handle.as_deref(), Some("2A"));
        assert_eq!(line.common.owner_block_record_soft_id.as_deref(), Some("1F"));
        assert_eq!(line.common.layer_name(), "WALLS");
        assert_eq!(line.common.color_index, Some(1));
        assert_eq!(line.common.color, Some(0xFF0000));
        assert_eq!(line.common.lineweight, Some(25));
        assert_eq!(line.common.subclass_marker.as_deref(), Some("AcDbLine"));
    }

    #[test]
    fn true_color_overrides_index_color() {
        let circle: Circle = parse_one("8\n0\n62\n5\n420\n65280\n100\nAcDbCircle\n40\n2\n0\nEOF\n");
        assert_eq!(circle.common.color_index, Some(5));
        assert_eq!(circle.common.color, Some(0x00FF00));
        assert_eq!(circle.radius, 2.0);
    }

    #[test]
    fn xdata_attaches_to_entity() {
        let point: PointEntity = parse_one(concat!(
            "8\n0\n100\nAcDbPoint\n10\n1\n20\n2\n30\n3\n",
            "1001\nACAD\n1000\nnote\n1001\nOTHER\n1070\n3\n0\nEOF\n",
        ));
        assert_eq!(point.common.xdata.len(), 2);
        assert_eq!(point.common.xdata[1].app_name, "OTHER");
    }
}

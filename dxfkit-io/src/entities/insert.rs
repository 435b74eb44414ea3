use dxfkit_core::entity::{Attribute, Insert};

use super::{entity_common, finish_sequence, subclass};
use crate::error::Result;
use crate::spec::{spec_record, store, FieldContext, FieldStep, RecordSpec};

/// INSERT 之后跟随的 ATTRIB 记录，直到 SEQEND。
fn attributes(insert: &mut Insert, cx: &mut FieldContext<'_, '_>) -> Result<FieldStep> {
    if cx.is(0, "ATTRIB") {
        let attribute = cx.continue_with::<Attribute>()?;
        insert.attributes.push(attribute);
        Ok(FieldStep::Consumed)
    } else if cx.is(0, "SEQEND") {
        finish_sequence(cx)
    } else {
        Ok(FieldStep::NotForThisScope)
    }
}

spec_record!(Insert => || {
    RecordSpec::<Insert>::builder("INSERT")
        .with(entity_common)
        .field(100, subclass)
        .field(66, store!(is_variable_attributes = flag))
        .field(2, store!(name = text))
        .field(10, store!(insertion_point = point))
        .field(41, store!(x_scale = float))
        .field(42, store!(y_scale = float))
        .field(43, store!(z_scale = float))
        .field(50, store!(rotation = float))
        .field(70, store!(column_count = int))
        .field(71, store!(row_count = int))
        .field(44, store!(column_spacing = float))
        .field(45, store!(row_spacing = float))
        .field(210, store!(extrusion_direction = point_3d))
        .multiple_step(0, attributes)
        .build()
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::GroupReader;
    use crate::spec::SpecRecord;
    use dxfkit_core::Point3D;

    #[test]
    fn insert_collects_attributes_until_seqend() {
        let mut reader = GroupReader::new(concat!(
            "5\n50\n100\nAcDbEntity\n8\n0\n100\nAcDbBlockReference\n66\n1\n2\nDOOR\n",
            "10\n5\n20\n6\n30\n0\n41\n2\n",
            "0\nATTRIB\n5\n51\n100\nAcDbEntity\n100\nAcDbText\n1\nA1\n100\nAcDbAttribute\n2\nTAG_A\n70\n0\n",
            "0\nATTRIB\n5\n52\n100\nAcDbEntity\n100\nAcDbText\n1\nB2\n100\nAcDbAttribute\n2\nTAG_B\n70\n0\n",
            "0\nSEQEND\n5\n53\n100\nAcDbEntity\n8\n0\n",
            "0\nLINE\n",
        ));
        let (insert, consumed) = Insert::parse_from(&mut reader).expect("解析 INSERT 失败");
        assert!(consumed);
        assert_eq!(insert.name, "DOOR");
        assert!(insert.is_variable_attributes);
        assert_eq!(insert.insertion_point, Point3D::new(5.0, 6.0, 0.0));
        assert_eq!((insert.x_scale, insert.y_scale), (2.0, 1.0));
        let tags: Vec<_> = insert.attributes.iter().filter_map(|a| a.tag.as_deref()).collect();
        assert_eq!(tags, vec!["TAG_A", "TAG_B"]);
        assert_eq!(insert.attributes[1].text, "B2");
        assert!(reader.next().expect("应能读到下一组").is(0, "LINE"));
    }

    #[test]
    fn insert_without_attributes_leaves_next_record() {
        let mut reader = GroupReader::new("100\nAcDbEntity\n100\nAcDbBlockReference\n2\nPLAIN\n0\nCIRCLE\n");
        let (insert, _) = Insert::parse_from(&mut reader).expect("解析 INSERT 失败");
        assert!(insert.attributes.is_empty());
        assert!(reader.next().expect("应能读到下一组").is(0, "CIRCLE"));
    }
}

use dxfkit_core::entity::{Attribute, AttributeDefinition, MText, Text, TextBody};
use dxfkit_core::EntityRecord;

use super::{entity_common, subclass};
use crate::error::Result;
use crate::spec::{append, spec_record, store, FieldContext, FieldStep, RecordSpec, SpecBuilder};

/// 带单行文字字段的记录。
trait TextBodyRecord: EntityRecord + 'static {
    fn body_mut(&mut self) -> &mut TextBody;
}

impl TextBodyRecord for Text {
    fn body_mut(&mut self) -> &mut TextBody {
        &mut self.body
    }
}

impl TextBodyRecord for AttributeDefinition {
    fn body_mut(&mut self) -> &mut TextBody {
        &mut self.body
    }
}

/// AcDbText 字段，TEXT 与 ATTDEF 共用。
fn text_body<R: TextBodyRecord>(fields: SpecBuilder<R>) -> SpecBuilder<R> {
    fields
        .field(100, subclass)
        .field(39, |r, cx| {
            r.body_mut().thickness = cx.float()?;
            Ok(())
        })
        .field(10, |r, cx| {
            r.body_mut().start_point = cx.point()?;
            Ok(())
        })
        .field(40, |r, cx| {
            r.body_mut().text_height = cx.float()?;
            Ok(())
        })
        .field(1, |r, cx| {
            r.body_mut().text = cx.text()?;
            Ok(())
        })
        .field(50, |r, cx| {
            r.body_mut().rotation = cx.float()?;
            Ok(())
        })
        .field(41, |r, cx| {
            r.body_mut().x_scale = cx.float()?;
            Ok(())
        })
        .field(51, |r, cx| {
            r.body_mut().oblique_angle = cx.float()?;
            Ok(())
        })
        .field(7, |r, cx| {
            r.body_mut().style_name = cx.text()?;
            Ok(())
        })
        .field(71, |r, cx| {
            r.body_mut().generation_flag = cx.int()?;
            Ok(())
        })
        .field(72, |r, cx| {
            r.body_mut().halign = cx.int()?;
            Ok(())
        })
        .field(72, |r, cx| {
            r.body_mut().valign = cx.int()?;
            Ok(())
        })
        .field(11, |r, cx| {
            r.body_mut().end_point = Some(cx.point()?);
            Ok(())
        })
        .field(210, |r, cx| {
            r.body_mut().extrusion_direction = cx.point_3d()?;
            Ok(())
        })
}

spec_record!(Text => || {
    RecordSpec::<Text>::builder("TEXT")
        .with(entity_common)
        .with(text_body)
        .ignore(100)
        .field(73, store!(body.valign = int))
        .build()
});

spec_record!(AttributeDefinition => || {
    RecordSpec::<AttributeDefinition>::builder("ATTDEF")
        .with(entity_common)
        .with(text_body)
        .field(100, subclass)
        .ignore(280)
        .field(3, store!(prompt = Some(text)))
        .field(2, store!(tag = Some(text)))
        .field(70, store!(attribute_flag = int))
        .ignore(73)
        .field(74, store!(body.valign = int))
        .field(280, store!(is_locked = flag))
        .ignore(100)
        .field(280, store!(is_duplicated_record = flag))
        .field(70, store!(mtext_flag = int))
        .field(70, store!(is_really_locked = flag))
        .field(70, store!(number_of_secondary_attributes = int))
        .multiple(340, append!(secondary_attributes_hard_ids = text))
        .field(10, store!(alignment_point = Some(point)))
        .field(40, store!(annotation_scale = Some(float)))
        .ignore(2)
        .build()
});

/// ATTRIB 内嵌的多行文字：以 `(0, "MTEXT")` 或 101 组开头。
fn embedded_mtext(attrib: &mut Attribute, cx: &mut FieldContext<'_, '_>) -> Result<FieldStep> {
    if cx.code() == 0 && !cx.is(0, "MTEXT") {
        return Ok(FieldStep::NotForThisScope);
    }
    let mtext = cx.continue_with::<MText>()?;
    attrib.embedded_mtext = Some(Box::new(mtext));
    Ok(FieldStep::Consumed)
}

spec_record!(Attribute => || {
    RecordSpec::<Attribute>::builder("ATTRIB")
        .with(entity_common)
        .ignore(100)
        .field(39, store!(thickness = float))
        .field(10, store!(start_point = point))
        .field(40, store!(text_height = float))
        .field(1, store!(text = text))
        .field(100, subclass)
        .ignore(280)
        .field(2, store!(tag = Some(text)))
        .field(70, store!(attribute_flag = int))
        .ignore(73)
        .field(50, store!(rotation = float))
        .field(41, store!(scale = float))
        .field(51, store!(oblique_angle = float))
        .field(7, store!(text_style = text))
        .field(71, store!(text_generation_flag = int))
        .field(72, store!(horizontal_justification = int))
        .field(74, store!(vertical_justification = int))
        .field(11, store!(alignment_point = Some(point)))
        .field(210, store!(extrusion_direction = point_3d))
        .field(280, store!(lock_position_flag = flag))
        .ignore(100)
        .field(280, store!(is_duplicated_entries_keep = flag))
        .field(70, store!(mtext_flag = int))
        .field(70, store!(is_really_locked = flag))
        .field(70, store!(number_of_secondary_attributes = int))
        .field(340, store!(secondary_attributes_hard_id = Some(text)))
        .field(10, store!(annotation_alignment_point = Some(point)))
        .field(40, store!(annotation_scale = Some(float)))
        .field(2, store!(definition_tag = Some(text)))
        .step([0, 101], embedded_mtext)
        .build()
});

/// 跳过 101 "Embedded Object" 直到下一个组码 0。
fn skip_embedded_object(_: &mut MText, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    cx.reader().skip_to_next_record()
}

spec_record!(MText => || {
    RecordSpec::<MText>::builder("MTEXT")
        .with(entity_common)
        .field(100, subclass)
        .field(10, store!(insertion_point = point))
        .field(40, store!(height = float))
        .field(41, store!(width = float))
        .field(71, store!(attachment_point = int))
        .field(72, store!(drawing_direction = int))
        .field(1, |r, cx| {
            r.text.push_str(&cx.text()?);
            Ok(())
        })
        .multiple(3, |r, cx| {
            r.text.push_str(&cx.text()?);
            Ok(())
        })
        .field(7, store!(style_name = text))
        .field(210, store!(extrusion_direction = point_3d))
        .field(11, store!(direction = Some(point)))
        .ignore(42)
        .ignore(43)
        .field(50, store!(rotation = float))
        .field(73, store!(line_spacing_style = Some(int)))
        .field(44, store!(line_spacing = Some(float)))
        .field(90, store!(background_fill = Some(int)))
        .field(420..=429, store!(background_color = Some(int)))
        .field(430..=439, store!(background_color_name = Some(text)))
        .field(45, store!(fill_box_scale = Some(float)))
        .field(63, store!(background_fill_color = Some(int)))
        .field(441, store!(background_fill_transparency = Some(int)))
        .field(75, store!(column_type = Some(int)))
        .field(76, store!(column_count = Some(int)))
        .field(78, store!(column_flow_reversed = Some(int)))
        .field(79, store!(column_auto_height = Some(int)))
        .field(48, store!(column_width = Some(float)))
        .field(49, store!(column_gutter = Some(float)))
        .field(50, store!(column_height = Some(float)))
        .field(101, skip_embedded_object)
        .field(46, store!(annotation_height = Some(float)))
        .build()
});

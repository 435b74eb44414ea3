use dxfkit_core::entity::{Dimension, Leader};

use super::{entity_common, subclass};
use crate::spec::{append, spec_record, store, RecordSpec};

// 标注字段可以按任意顺序、重复出现，后出现的值覆盖先前的值。
spec_record!(Dimension => || {
    RecordSpec::<Dimension>::builder("DIMENSION")
        .with(entity_common)
        .field(360, |r, cx| {
            r.common.owner_dictionary_hard_id = Some(cx.text()?);
            Ok(())
        })
        .multiple(100, subclass)
        .multiple(280, store!(version = Some(int)))
        .multiple(2, store!(name = Some(text)))
        .multiple(10, store!(definition_point = Some(point)))
        .multiple(11, store!(text_point = Some(point)))
        .multiple(12, store!(insertion_point = Some(point)))
        .multiple(13, store!(sub_definition_point1 = Some(point)))
        .multiple(14, store!(sub_definition_point2 = Some(point)))
        .multiple(15, store!(center_point = Some(point)))
        .multiple(16, store!(arc_point = Some(point)))
        .multiple(70, store!(dimension_type = int))
        .multiple(71, store!(attachment_point = Some(int)))
        .multiple(72, store!(text_line_spacing_style = Some(int)))
        .multiple(40, store!(leader_length = Some(float)))
        .multiple(41, store!(text_line_spacing_factor = Some(float)))
        .multiple(42, store!(measurement = Some(float)))
        .multiple(1, store!(text = Some(text)))
        .multiple(50, store!(rotation_angle = Some(float)))
        .multiple(52, store!(oblique_angle = Some(float)))
        .multiple(53, store!(text_rotation = Some(float)))
        .multiple(51, store!(ocs_rotation = Some(float)))
        .multiple(210, store!(extrusion_direction = Some(point_3d)))
        .multiple(3, store!(style_name = Some(text)))
        .build()
});

spec_record!(Leader => || {
    RecordSpec::<Leader>::builder("LEADER")
        .with(entity_common)
        .field(100, subclass)
        .field(3, store!(style_name = Some(text)))
        .field(71, store!(is_arrowhead_enabled = flag))
        .field(72, store!(is_spline = flag))
        .field(73, store!(leader_creation_flag = Some(int)))
        .field(74, store!(is_hookline_same_direction = flag))
        .field(75, store!(is_hookline_exists = flag))
        .field(40, store!(text_height = Some(float)))
        .field(41, store!(text_width = Some(float)))
        .field(76, store!(number_of_vertices = Some(int)))
        .multiple(10, append!(vertices = point))
        .field(77, store!(by_block_color = Some(int)))
        .field(340, store!(associated_annotation = Some(text)))
        .field(210, store!(normal = Some(point_3d)))
        .field(211, store!(horizontal_direction = Some(point_3d)))
        .field(212, store!(offset_from_block = Some(point)))
        .field(213, store!(offset_from_annotation = Some(point)))
        .build()
});

use dxfkit_core::entity::Viewport;

use super::{entity_common, subclass};
use crate::spec::{append, spec_record, store, RecordSpec};

// 视口中心、视图方向、目标点与 UCS 向量总是补全 Z 坐标。
spec_record!(Viewport => || {
    RecordSpec::<Viewport>::builder("VIEWPORT")
        .with(entity_common)
        .field(360, |r, cx| {
            r.common.owner_dictionary_hard_id = Some(cx.text()?);
            Ok(())
        })
        .multiple(100, subclass)
        .multiple(10, store!(viewport_center = point_3d))
        .multiple(40, store!(width = float))
        .multiple(41, store!(height = float))
        .multiple(68, store!(status = Some(int)))
        .multiple(69, store!(viewport_id = Some(int)))
        .multiple(12, store!(display_center = Some(point)))
        .multiple(13, store!(snap_base = Some(point)))
        .multiple(14, store!(snap_spacing = Some(point)))
        .multiple(15, store!(grid_spacing = Some(point)))
        .multiple(16, store!(view_direction = Some(point_3d)))
        .multiple(17, store!(target_point = Some(point_3d)))
        .multiple(42, store!(perspective_lens_length = Some(float)))
        .multiple(43, store!(front_clip_z = Some(float)))
        .multiple(44, store!(back_clip_z = Some(float)))
        .multiple(45, store!(view_height = Some(float)))
        .multiple(50, store!(snap_angle = Some(float)))
        .multiple(51, store!(view_twist_angle = Some(float)))
        .multiple(72, store!(circle_zoom_percent = Some(int)))
        .multiple(331, append!(frozen_layer_ids = text))
        .multiple(90, store!(status_bit_flags = Some(int)))
        .multiple(340, store!(clipping_boundary_id = Some(text)))
        .multiple(1, store!(sheet_name = Some(text)))
        .multiple(281, store!(render_mode = Some(int)))
        .multiple(71, store!(ucs_per_viewport = Some(int)))
        .multiple(110, store!(ucs_origin = Some(point_3d)))
        .multiple(111, store!(ucs_x_axis = Some(point_3d)))
        .multiple(112, store!(ucs_y_axis = Some(point_3d)))
        .multiple(345, store!(ucs_id = Some(text)))
        .multiple(346, store!(ucs_base_id = Some(text)))
        .multiple(79, store!(orthographic_type = Some(int)))
        .multiple(146, store!(elevation = Some(float)))
        .multiple(170, store!(shade_plot_mode = Some(int)))
        .multiple(61, store!(major_grid_frequency = Some(int)))
        .multiple(332, store!(background_id = Some(text)))
        .multiple(333, store!(shade_plot_id = Some(text)))
        .multiple(348, store!(visual_style_id = Some(text)))
        .multiple(292, store!(is_default_lighting = flag))
        .multiple(282, store!(default_lighting_type = Some(int)))
        .multiple(141, store!(brightness = Some(float)))
        .multiple(142, store!(contrast = Some(float)))
        .multiple([63, 421], store!(ambient_light_color = Some(int)))
        .multiple(431, store!(ambient_light_color_name = Some(text)))
        .multiple(361, store!(sun_id = Some(text)))
        .multiple([335, 343, 344], store!(soft_pointer = Some(text)))
        .ignore_multiple(91)
        .build()
});

#[cfg(test)]
mod tests {
    use super::super::parse_one;
    use super::*;
    use dxfkit_core::Point3D;

    #[test]
    fn viewport_normalizes_vectors() {
        let viewport: Viewport = parse_one(concat!(
            "5\n80\n100\nAcDbEntity\n67\n1\n8\n0\n100\nAcDbViewport\n10\n5\n20\n4\n40\n10\n41\n8\n",
            "68\n1\n69\n2\n16\n0\n26\n0\n36\n1\n17\n0\n27\n0\n331\n1A\n331\n1B\n",
            "110\n0\n120\n0\n111\n1\n121\n0\n292\n1\n421\n255\n431\nBLUE\n0\nEOF\n",
        ));
        assert!(viewport.common.is_in_paper_space);
        assert_eq!(viewport.viewport_center, Point3D::new(5.0, 4.0, 0.0));
        assert_eq!((viewport.width, viewport.height), (10.0, 8.0));
        assert_eq!(viewport.view_direction, Some(Point3D::unit_z()));
        assert_eq!(viewport.target_point, Some(Point3D::new(0.0, 0.0, 0.0)));
        assert_eq!(viewport.frozen_layer_ids, vec!["1A", "1B"]);
        assert_eq!(viewport.ucs_x_axis, Some(Point3D::new(1.0, 0.0, 0.0)));
        assert!(viewport.is_default_lighting);
        assert_eq!(viewport.ambient_light_color, Some(255));
        assert_eq!(viewport.ambient_light_color_name.as_deref(), Some("BLUE"));
    }
}

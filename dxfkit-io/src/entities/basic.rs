use dxfkit_core::entity::{Arc, Circle, Ellipse, Line, PointEntity, Section, Solid, Spline};

use super::{entity_common, subclass};
use crate::spec::{append, spec_record, store, RecordSpec};

spec_record!(Line => || {
    RecordSpec::<Line>::builder("LINE")
        .with(entity_common)
        .field(100, subclass)
        .field(39, store!(thickness = float))
        .field(10, store!(start_point = point))
        .field(11, store!(end_point = point))
        .field(210, store!(extrusion_direction = point_3d))
        .build()
});

spec_record!(Circle => || {
    RecordSpec::<Circle>::builder("CIRCLE")
        .with(entity_common)
        .field(100, subclass)
        .field(39, store!(thickness = float))
        .field(10, store!(center = point))
        .field(40, store!(radius = float))
        .field(210, store!(extrusion_direction = point_3d))
        .build()
});

// AcDbCircle 与 AcDbArc 两个子类标记，只记录后者。
spec_record!(Arc => || {
    RecordSpec::<Arc>::builder("ARC")
        .with(entity_common)
        .ignore(100)
        .field(39, store!(thickness = float))
        .field(10, store!(center = point))
        .field(40, store!(radius = float))
        .field(100, subclass)
        .field(50, store!(start_angle = float))
        .field(51, store!(end_angle = float))
        .field(210, store!(extrusion_direction = point_3d))
        .build()
});

spec_record!(Ellipse => || {
    RecordSpec::<Ellipse>::builder("ELLIPSE")
        .with(entity_common)
        .field(100, subclass)
        .field(10, store!(center = point))
        .field(11, store!(major_axis_end_point = point))
        .field(210, store!(extrusion_direction = point_3d))
        .field(40, store!(axis_ratio = float))
        .field(41, store!(start_angle = float))
        .field(42, store!(end_angle = float))
        .build()
});

spec_record!(PointEntity => || {
    RecordSpec::<PointEntity>::builder("POINT")
        .with(entity_common)
        .field(100, subclass)
        .field(10, store!(position = point))
        .field(39, store!(thickness = float))
        .field(210, store!(extrusion_direction = point_3d))
        .field(50, store!(angle = float))
        .build()
});

spec_record!(Solid => || {
    RecordSpec::<Solid>::builder("SOLID")
        .with(entity_common)
        .field(100, subclass)
        .multiple(10..=13, append!(points = point))
        .field(39, store!(thickness = float))
        .field(210, store!(extrusion_direction = point_3d))
        .build()
});

spec_record!(Spline => || {
    RecordSpec::<Spline>::builder("SPLINE")
        .with(entity_common)
        .field(100, subclass)
        .field(210, store!(normal = Some(point_3d)))
        .field(70, store!(flag = int))
        .field(71, store!(degree = int))
        .field(72, store!(number_of_knots = Some(int)))
        .field(73, store!(number_of_control_points = Some(int)))
        .field(74, store!(number_of_fit_points = Some(int)))
        .field(42, store!(knot_tolerance = float))
        .field(43, store!(control_tolerance = float))
        .field(44, store!(fit_tolerance = float))
        .field(12, store!(start_tangent = Some(point)))
        .field(13, store!(end_tangent = Some(point)))
        .multiple(40, append!(knots = float))
        .multiple(41, append!(weights = float))
        .multiple(10, append!(control_points = point))
        .multiple(11, append!(fit_points = point))
        .build()
});

// AcDbSection 之后的字段单独成一个作用域，避免 92/63 等与公共字段混淆。
spec_record!(Section => || {
    RecordSpec::<Section>::builder("SECTION")
        .with(entity_common)
        .boundary(100, subclass)
        .field(90, store!(state = Some(int)))
        .field(91, store!(flag = Some(int)))
        .field(1, store!(name = Some(text)))
        .field(10, store!(vertical_direction = Some(point)))
        .field(40, store!(top_height = Some(float)))
        .field(41, store!(bottom_height = Some(float)))
        .field(70, store!(indicator_transparency = Some(int)))
        .field(63, store!(indicator_color = Some(int)))
        .field(411, store!(indicator_color_name = Some(text)))
        .field(92, store!(vertices_count = Some(int)))
        .multiple(11, append!(vertices = point))
        .field(93, store!(number_of_back_line_vertices = Some(int)))
        .multiple(12, append!(back_line_vertices = point))
        .field(360, store!(geometry_setting_hard_id = Some(text)))
        .build()
});

#[cfg(test)]
mod tests {
    use super::super::parse_one;
    use super::*;
    use dxfkit_core::Point3D;

    #[test]
    fn arc_keeps_last_subclass_marker() {
        let arc: Arc = parse_one(concat!(
            "5\n30\n100\nAcDbEntity\n8\n0\n100\nAcDbCircle\n10\n1\n20\n2\n30\n0\n40\n3\n",
            "100\nAcDbArc\n50\n0\n51\n90\n0\nEOF\n",
        ));
        assert_eq!(arc.common.subclass_marker.as_deref(), Some("AcDbArc"));
        assert_eq!(arc.center, Point3D::new(1.0, 2.0, 0.0));
        assert_eq!((arc.radius, arc.start_angle, arc.end_angle), (3.0, 0.0, 90.0));
        assert_eq!(arc.extrusion_direction, Point3D::unit_z());
    }

    #[test]
    fn line_reads_planar_points() {
        let line: Line = parse_one("100\nAcDbEntity\n100\nAcDbLine\n10\n0\n20\n0\n11\n10\n21\n5\n0\nEOF\n");
        assert_eq!(line.end_point, Point3D::planar(10.0, 5.0));
        assert!(!line.start_point.has_z());
    }

    #[test]
    fn solid_collects_corner_points() {
        let solid: Solid = parse_one(concat!(
            "100\nAcDbEntity\n100\nAcDbTrace\n10\n0\n20\n0\n30\n0\n11\n1\n21\n0\n31\n0\n",
            "12\n0\n22\n1\n32\n0\n13\n1\n23\n1\n33\n0\n0\nEOF\n",
        ));
        assert_eq!(solid.points.len(), 4);
        assert_eq!(solid.points[3], Point3D::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn spline_collects_knots_and_points() {
        let spline: Spline = parse_one(concat!(
            "100\nAcDbEntity\n100\nAcDbSpline\n210\n0\n220\n0\n230\n1\n70\n8\n71\n3\n72\n8\n73\n4\n74\n0\n",
            "42\n0.0000001\n43\n0.0000001\n40\n0\n40\n0\n40\n0\n40\n0\n40\n1\n40\n1\n40\n1\n40\n1\n",
            "10\n0\n20\n0\n30\n0\n10\n1\n20\n1\n30\n0\n10\n2\n20\n1\n30\n0\n10\n3\n20\n0\n30\n0\n0\nEOF\n",
        ));
        assert_eq!(spline.degree, 3);
        assert_eq!(spline.knots.len(), 8);
        assert_eq!(spline.control_points.len(), 4);
        assert_eq!(spline.knot_tolerance, 0.0000001);
        assert_eq!(spline.fit_tolerance, 1e-9);
        assert_eq!(spline.normal, Some(Point3D::unit_z()));
    }

    #[test]
    fn section_fields_do_not_collide_with_common() {
        let section: Section = parse_one(concat!(
            "100\nAcDbEntity\n8\n0\n100\nAcDbSection\n90\n1\n91\n0\n1\nSection1\n",
            "92\n2\n11\n0\n21\n0\n31\n0\n11\n5\n21\n0\n31\n0\n0\nEOF\n",
        ));
        assert_eq!(section.vertices_count, Some(2));
        assert_eq!(section.common.proxy_byte, None);
        assert_eq!(section.vertices.len(), 2);
        assert_eq!(section.name.as_deref(), Some("Section1"));
    }
}

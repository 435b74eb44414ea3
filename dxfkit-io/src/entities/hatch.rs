use dxfkit_core::entity::{
    BoundaryEdge, BoundaryPath, CircularEdge, EdgeBoundaryPath, EllipticEdge, Hatch,
    HatchDefinitionLine, HatchGradientColor, LineEdge, PatternVector, PolylineBoundaryPath,
    PolylineBoundaryVertex, SplineEdge, WeightedControlPoint,
};

use super::{entity_common, subclass};
use crate::error::{DxfError, Result};
use crate::spec::{append, spec_record, store, FieldContext, RecordSpec};

/// 读取紧随其后的可选组；不匹配时回退。
fn optional_float(cx: &mut FieldContext<'_, '_>, code: i32) -> Result<Option<f64>> {
    let token = cx.reader().next()?;
    if token.code == code {
        return Ok(token.value.as_f64());
    }
    cx.reader().rewind(1);
    Ok(None)
}

/// 由 `code` 与 `code + 1` 组成的图案向量。
fn pattern_vector(cx: &mut FieldContext<'_, '_>) -> Result<PatternVector> {
    let x = cx.float()?;
    let y = optional_float(cx, cx.code() + 1)?.unwrap_or(0.0);
    Ok(PatternVector { x, y })
}

spec_record!(LineEdge => || {
    RecordSpec::<LineEdge>::builder("HATCH_LINE_EDGE")
        .field(10, store!(start = point))
        .field(11, store!(end = point))
        .build()
});

spec_record!(CircularEdge => || {
    RecordSpec::<CircularEdge>::builder("HATCH_ARC_EDGE")
        .field(10, store!(center = point))
        .field(40, store!(radius = float))
        .field(50, store!(start_angle = float))
        .field(51, store!(end_angle = float))
        .field(73, store!(is_ccw = flag))
        .build()
});

spec_record!(EllipticEdge => || {
    RecordSpec::<EllipticEdge>::builder("HATCH_ELLIPSE_EDGE")
        .field(10, store!(center = point))
        .field(11, store!(end = point))
        .field(40, store!(length_of_minor_axis = float))
        .field(50, store!(start_angle = float))
        .field(51, store!(end_angle = float))
        .field(73, store!(is_ccw = flag))
        .build()
});

spec_record!(SplineEdge => || {
    RecordSpec::<SplineEdge>::builder("HATCH_SPLINE_EDGE")
        .field(94, store!(degree = int))
        .field(73, store!(spline_flag = Some(int)))
        .field(74, store!(is_periodic = flag))
        .field(95, store!(number_of_knots = Some(int)))
        .field(96, store!(number_of_control_points = Some(int)))
        .multiple(40, append!(knots = float))
        .multiple(10, |r, cx| {
            let point = cx.point()?;
            let weight = optional_float(cx, 42)?.unwrap_or(1.0);
            r.control_points.push(WeightedControlPoint { point, weight });
            Ok(())
        })
        .field(97, store!(number_of_fit_data = Some(int)))
        .multiple(11, append!(fit_datum = point))
        .field(12, store!(start_tangent = Some(point)))
        .field(13, store!(end_tangent = Some(point)))
        .build()
});

spec_record!(PolylineBoundaryPath => || {
    RecordSpec::<PolylineBoundaryPath>::builder("HATCH_POLYLINE_PATH")
        .field(72, store!(has_bulge = flag))
        .field(73, store!(is_closed = flag))
        .field(93, store!(number_of_vertices = Some(int)))
        .multiple(10, |r, cx| {
            let point = cx.point()?;
            let bulge = optional_float(cx, 42)?.unwrap_or(0.0);
            r.vertices.push(PolylineBoundaryVertex { x: point.x, y: point.y, bulge });
            Ok(())
        })
        .field(97, store!(number_of_source_boundary_objects = Some(int)))
        .multiple(330, append!(source_boundary_objects = text))
        .build()
});

fn boundary_edge(path: &mut EdgeBoundaryPath, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    let edge = match cx.int()? {
        1 => BoundaryEdge::Line(cx.continue_with()?),
        2 => BoundaryEdge::Circular(cx.continue_with()?),
        3 => BoundaryEdge::Elliptic(cx.continue_with()?),
        4 => BoundaryEdge::Spline(cx.continue_with()?),
        edge_type => {
            return Err(DxfError::InvalidEdgeType {
                line: cx.line(),
                edge_type,
            });
        }
    };
    path.edges.push(edge);
    Ok(())
}

spec_record!(EdgeBoundaryPath => || {
    RecordSpec::<EdgeBoundaryPath>::builder("HATCH_EDGE_PATH")
        .field(93, store!(number_of_edges = Some(int)))
        .multiple(72, boundary_edge)
        .field(97, store!(number_of_source_boundary_objects = Some(int)))
        .multiple(330, append!(source_boundary_objects = text))
        .build()
});

/// 组码 92 的标志位决定后续是多段线路径还是边路径。
fn boundary_path(hatch: &mut Hatch, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    let flag = cx.int()?;
    let path = if flag & BoundaryPath::POLYLINE_FLAG != 0 {
        let mut path = cx.continue_with::<PolylineBoundaryPath>()?;
        path.boundary_path_type_flag = flag;
        BoundaryPath::Polyline(path)
    } else {
        let mut path = cx.continue_with::<EdgeBoundaryPath>()?;
        path.boundary_path_type_flag = flag;
        BoundaryPath::Edges(path)
    };
    hatch.boundary_paths.push(path);
    Ok(())
}

spec_record!(HatchDefinitionLine => || {
    RecordSpec::<HatchDefinitionLine>::builder("HATCH_PATTERN_LINE")
        .field(53, store!(angle = float))
        .field(43, |r, cx| {
            r.base = pattern_vector(cx)?;
            Ok(())
        })
        .field(45, |r, cx| {
            r.offset = pattern_vector(cx)?;
            Ok(())
        })
        .field(79, store!(number_of_dash_lengths = Some(int)))
        .multiple(49, append!(dash_lengths = float))
        .build()
});

spec_record!(HatchGradientColor => || {
    RecordSpec::<HatchGradientColor>::builder("HATCH_GRADIENT_COLOR")
        .field(463, store!(value = float))
        .field(63, store!(color_index = Some(int)))
        .field(421, store!(color = Some(int)))
        .build()
});

// 公共字段与 AcDbHatch 标记之后的字段分属两个作用域：
// 92、10 等组码在两边含义不同。
spec_record!(Hatch => || {
    RecordSpec::<Hatch>::builder("HATCH")
        .with(entity_common)
        .boundary(100, subclass)
        .field(10, store!(elevation_point = point))
        .field(210, store!(extrusion_direction = point_3d))
        .field(2, store!(pattern_name = Some(text)))
        .field(70, store!(solid_fill = int))
        .field(63, store!(pattern_fill_color = Some(int)))
        .field(71, store!(associativity = int))
        .field(91, store!(number_of_boundary_paths = Some(int)))
        .multiple(92, boundary_path)
        .field(75, store!(hatch_style = Some(int)))
        .field(76, store!(pattern_type = Some(int)))
        .field(52, store!(pattern_angle = Some(float)))
        .field(41, store!(pattern_scale = Some(float)))
        .field(73, store!(is_annotated = flag))
        .field(77, store!(is_double = flag))
        .field(78, store!(number_of_definition_lines = Some(int)))
        .multiple(53, |r, cx| {
            let line = cx.parse_nested::<HatchDefinitionLine>()?;
            r.definition_lines.push(line);
            Ok(())
        })
        .field(47, store!(pixel_size = Some(float)))
        .field(98, store!(number_of_seed_points = Some(int)))
        .field(11, store!(offset_vector = Some(point)))
        .ignore(99)
        .multiple(10, append!(seed_points = point))
        .field(450, store!(gradient_flag = Some(int)))
        .ignore(451)
        .field(452, store!(gradient_color_flag = Some(int)))
        .field(453, store!(number_of_colors = Some(int)))
        .field(460, store!(gradient_rotation = float))
        .field(461, store!(gradient_definition = Some(float)))
        .field(462, store!(color_tint = float))
        .multiple(463, |r, cx| {
            let color = cx.parse_nested::<HatchGradientColor>()?;
            r.gradient_colors.push(color);
            Ok(())
        })
        .field(470, store!(gradient_name = Some(text)))
        .build()
});

#[cfg(test)]
mod tests {
    use super::super::parse_one;
    use super::*;
    use crate::reader::GroupReader;
    use crate::spec::SpecRecord;
    use dxfkit_core::Point3D;

    const HEAD: &str = "5\n90\n100\nAcDbEntity\n8\n0\n62\n1\n100\nAcDbHatch\n10\n0\n20\n0\n30\n0\n210\n0\n220\n0\n230\n1\n";

    #[test]
    fn polyline_path_with_bulges() {
        let text = format!(
            "{HEAD}2\nSOLID\n70\n1\n71\n0\n91\n1\n92\n7\n72\n1\n73\n1\n93\n3\n\
             10\n0\n20\n0\n42\n0.5\n10\n10\n20\n0\n10\n10\n20\n10\n97\n0\n\
             75\n0\n76\n1\n98\n1\n10\n5\n20\n5\n0\nEOF\n"
        );
        let hatch: Hatch = parse_one(&text);
        assert_eq!(hatch.pattern_name.as_deref(), Some("SOLID"));
        assert_eq!(hatch.solid_fill, 1);
        assert_eq!(hatch.boundary_paths.len(), 1);
        match &hatch.boundary_paths[0] {
            BoundaryPath::Polyline(path) => {
                assert_eq!(path.boundary_path_type_flag, 7);
                assert!(path.has_bulge && path.is_closed);
                assert_eq!(path.vertices.len(), 3);
                assert_eq!(path.vertices[0].bulge, 0.5);
                assert_eq!(path.vertices[1].bulge, 0.0);
            }
            other => panic!("期望多段线边界，实际为 {other:?}"),
        }
        assert_eq!(hatch.seed_points, vec![Point3D::planar(5.0, 5.0)]);
        assert_eq!(hatch.elevation_point, Point3D::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn edge_path_with_typed_edges() {
        let text = format!(
            "{HEAD}2\nANSI31\n70\n0\n71\n1\n91\n1\n92\n1\n93\n2\n\
             72\n1\n10\n0\n20\n0\n11\n10\n21\n0\n\
             72\n2\n10\n5\n20\n0\n40\n5\n50\n0\n51\n180\n73\n1\n\
             97\n1\n330\n2F\n75\n1\n76\n1\n52\n45\n41\n2\n77\n0\n78\n1\n\
             53\n45\n43\n0\n44\n0\n45\n-0.088\n46\n0.088\n79\n0\n98\n0\n0\nEOF\n"
        );
        let hatch: Hatch = parse_one(&text);
        let BoundaryPath::Edges(path) = &hatch.boundary_paths[0] else {
            panic!("期望边路径");
        };
        assert_eq!(path.edges.len(), 2);
        assert!(matches!(path.edges[0], BoundaryEdge::Line(_)));
        match &path.edges[1] {
            BoundaryEdge::Circular(arc) => {
                assert_eq!(arc.radius, 5.0);
                assert!(arc.is_ccw);
            }
            other => panic!("期望圆弧边，实际为 {other:?}"),
        }
        assert_eq!(path.source_boundary_objects, vec!["2F"]);
        assert_eq!(hatch.pattern_angle, Some(45.0));
        assert_eq!(hatch.definition_lines.len(), 1);
        let line = &hatch.definition_lines[0];
        assert_eq!(line.offset, PatternVector { x: -0.088, y: 0.088 });
        assert_eq!(line.number_of_dash_lengths, Some(0));
    }

    #[test]
    fn spline_edge_weights_default_to_one() {
        let text = format!(
            "{HEAD}2\nSOLID\n70\n1\n71\n0\n91\n1\n92\n0\n93\n1\n\
             72\n4\n94\n3\n73\n1\n74\n0\n95\n2\n96\n2\n40\n0\n40\n1\n\
             10\n0\n20\n0\n42\n2\n10\n1\n20\n1\n97\n0\n0\nEOF\n"
        );
        let hatch: Hatch = parse_one(&text);
        let BoundaryPath::Edges(path) = &hatch.boundary_paths[0] else {
            panic!("期望边路径");
        };
        let BoundaryEdge::Spline(spline) = &path.edges[0] else {
            panic!("期望样条边");
        };
        assert_eq!(spline.degree, 3);
        assert_eq!(spline.knots, vec![0.0, 1.0]);
        assert_eq!(spline.control_points[0].weight, 2.0);
        assert_eq!(spline.control_points[1].weight, 1.0);
    }

    #[test]
    fn gradient_colors_are_collected() {
        let text = format!(
            "{HEAD}2\nSOLID\n70\n1\n71\n0\n91\n0\n75\n0\n76\n1\n98\n0\n450\n1\n451\n0\n452\n0\n453\n2\n\
             460\n0\n461\n0\n462\n1\n463\n0\n63\n5\n421\n255\n463\n1\n63\n2\n421\n16776960\n470\nLINEAR\n0\nEOF\n"
        );
        let hatch: Hatch = parse_one(&text);
        assert_eq!(hatch.number_of_colors, Some(2));
        assert_eq!(hatch.gradient_colors.len(), 2);
        assert_eq!(hatch.gradient_colors[1].color_index, Some(2));
        assert_eq!(hatch.gradient_colors[1].color, Some(16776960));
        assert_eq!(hatch.gradient_name.as_deref(), Some("LINEAR"));
        assert_eq!(hatch.color_tint, 1.0);
    }

    #[test]
    fn invalid_edge_type_is_fatal() {
        let text = format!("{HEAD}2\nSOLID\n70\n1\n71\n0\n91\n1\n92\n0\n93\n1\n72\n9\n0\nEOF\n");
        let mut reader = GroupReader::new(&text);
        let err = Hatch::parse_from(&mut reader).unwrap_err();
        assert!(matches!(err, DxfError::InvalidEdgeType { edge_type: 9, .. }));
    }
}

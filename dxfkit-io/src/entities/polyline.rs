use dxfkit_core::entity::{LwPolyline, LwPolylineVertex, Polyline, Vertex};

use super::{entity_common, finish_sequence, subclass};
use crate::error::Result;
use crate::spec::{append, spec_record, store, FieldContext, FieldStep, RecordSpec};

// 轻量多段线的顶点由独立的 10/20 标量组成，没有 Z 坐标。
spec_record!(LwPolylineVertex => || {
    RecordSpec::<LwPolylineVertex>::builder("LWPOLYLINE_VERTEX")
        .field(10, store!(x = float))
        .field(20, store!(y = float))
        .field(91, store!(id = Some(int)))
        .field(40, store!(start_width = Some(float)))
        .field(41, store!(end_width = Some(float)))
        .field(42, store!(bulge = float))
        .build()
});

spec_record!(LwPolyline => || {
    RecordSpec::<LwPolyline>::builder("LWPOLYLINE")
        .with(entity_common)
        .field(100, subclass)
        .field(90, store!(number_of_vertices = Some(int)))
        .field(70, store!(flag = int))
        .field(43, store!(constant_width = Some(float)))
        .field(38, store!(elevation = float))
        .field(39, store!(thickness = float))
        .multiple(10, |r, cx| {
            let vertex = cx.parse_nested::<LwPolylineVertex>()?;
            r.vertices.push(vertex);
            Ok(())
        })
        .field(210, store!(extrusion_direction = point_3d))
        .build()
});

spec_record!(Vertex => || {
    RecordSpec::<Vertex>::builder("VERTEX")
        .with(entity_common)
        .ignore(100)
        .field(100, subclass)
        .field(10, store!(position = point))
        .field(40, store!(start_width = float))
        .field(41, store!(end_width = float))
        .field(42, store!(bulge = float))
        .field(70, store!(flag = int))
        .field(50, store!(tangent_direction = Some(float)))
        .multiple(71..=74, append!(faces = int))
        .field(91, store!(id = Some(int)))
        .build()
});

/// POLYLINE 之后跟随的 VERTEX 记录，直到 SEQEND。
fn vertices(polyline: &mut Polyline, cx: &mut FieldContext<'_, '_>) -> Result<FieldStep> {
    if cx.is(0, "VERTEX") {
        let vertex = cx.continue_with::<Vertex>()?;
        polyline.vertices.push(vertex);
        Ok(FieldStep::Consumed)
    } else if cx.is(0, "SEQEND") {
        finish_sequence(cx)
    } else {
        Ok(FieldStep::NotForThisScope)
    }
}

// 10/20 是恒为 0 的占位点，标高只取 30。
spec_record!(Polyline => || {
    RecordSpec::<Polyline>::builder("POLYLINE")
        .with(entity_common)
        .field(100, subclass)
        .ignore(66)
        .ignore(10)
        .ignore(20)
        .field(30, store!(elevation = float))
        .field(39, store!(thickness = float))
        .field(70, store!(flag = int))
        .field(40, store!(start_width = float))
        .field(41, store!(end_width = float))
        .field(71, store!(mesh_m_vertex_count = int))
        .field(72, store!(mesh_n_vertex_count = int))
        .field(73, store!(surface_m_density = int))
        .field(74, store!(surface_n_density = int))
        .field(75, store!(smooth_type = int))
        .field(210, store!(extrusion_direction = point_3d))
        .multiple_step(0, vertices)
        .build()
});

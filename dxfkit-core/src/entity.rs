use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;
use crate::xdata::XData;

/// 所有实体共享的公共字段（AcDbEntity）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityCommon {
    pub handle: Option<String>,
    pub owner_block_record_soft_id: Option<String>,
    pub owner_dictionary_hard_id: Option<String>,
    pub is_in_paper_space: bool,
    pub layout_tab_name: Option<String>,
    pub layer: Option<String>,
    pub line_type: Option<String>,
    pub material_object_hard_id: Option<String>,
    pub color_index: Option<i64>,
    /// 24 位 RGB；由颜色索引查表或真彩色（420）写入。
    pub color: Option<u32>,
    pub lineweight: Option<i64>,
    pub line_type_scale: Option<f64>,
    pub is_visible: Option<bool>,
    pub proxy_byte: Option<i64>,
    pub proxy_entity: Vec<String>,
    pub color_name: Option<String>,
    pub transparency: Option<i64>,
    pub plot_style_hard_id: Option<String>,
    pub shadow_mode: Option<i64>,
    pub xdata: Vec<XData>,
    pub subclass_marker: Option<String>,
}

impl EntityCommon {
    /// 未指定图层时按 DXF 约定落在 "0" 图层。
    pub fn layer_name(&self) -> &str {
        self.layer.as_deref().unwrap_or("0")
    }
}

/// 具体实体记录的公共访问接口。
pub trait EntityRecord: Default {
    const TYPE_NAME: &'static str;

    fn common(&self) -> &EntityCommon;
    fn common_mut(&mut self) -> &mut EntityCommon;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub thickness: f64,
    pub start_point: Point3D,
    pub end_point: Point3D,
    pub extrusion_direction: Point3D,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            thickness: 0.0,
            start_point: Point3D::default(),
            end_point: Point3D::default(),
            extrusion_direction: Point3D::unit_z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub thickness: f64,
    pub center: Point3D,
    pub radius: f64,
    pub extrusion_direction: Point3D,
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            thickness: 0.0,
            center: Point3D::default(),
            radius: 0.0,
            extrusion_direction: Point3D::unit_z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub thickness: f64,
    pub center: Point3D,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub extrusion_direction: Point3D,
}

impl Default for Arc {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            thickness: 0.0,
            center: Point3D::default(),
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
            extrusion_direction: Point3D::unit_z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub center: Point3D,
    pub major_axis_end_point: Point3D,
    pub extrusion_direction: Point3D,
    pub axis_ratio: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Default for Ellipse {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            center: Point3D::default(),
            major_axis_end_point: Point3D::default(),
            extrusion_direction: Point3D::unit_z(),
            axis_ratio: 1.0,
            start_angle: 0.0,
            end_angle: std::f64::consts::TAU,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEntity {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub position: Point3D,
    pub thickness: f64,
    pub extrusion_direction: Point3D,
    pub angle: f64,
}

impl Default for PointEntity {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            position: Point3D::default(),
            thickness: 0.0,
            extrusion_direction: Point3D::unit_z(),
            angle: 0.0,
        }
    }
}

/// TEXT 与 ATTDEF 共享的单行文字字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBody {
    pub thickness: f64,
    pub start_point: Point3D,
    pub text_height: f64,
    pub text: String,
    pub rotation: f64,
    pub x_scale: f64,
    pub oblique_angle: f64,
    pub style_name: String,
    pub generation_flag: i64,
    pub halign: i64,
    pub valign: i64,
    pub end_point: Option<Point3D>,
    pub extrusion_direction: Point3D,
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            thickness: 0.0,
            start_point: Point3D::default(),
            text_height: 0.0,
            text: String::new(),
            rotation: 0.0,
            x_scale: 1.0,
            oblique_angle: 0.0,
            style_name: "STANDARD".to_string(),
            generation_flag: 0,
            halign: 0,
            valign: 0,
            end_point: None,
            extrusion_direction: Point3D::unit_z(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(flatten)]
    pub common: EntityCommon,
    #[serde(flatten)]
    pub body: TextBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    #[serde(flatten)]
    pub common: EntityCommon,
    #[serde(flatten)]
    pub body: TextBody,
    pub prompt: Option<String>,
    pub tag: Option<String>,
    pub attribute_flag: i64,
    pub is_locked: bool,
    pub is_duplicated_record: bool,
    pub mtext_flag: i64,
    pub is_really_locked: bool,
    pub number_of_secondary_attributes: i64,
    pub secondary_attributes_hard_ids: Vec<String>,
    pub alignment_point: Option<Point3D>,
    pub annotation_scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub thickness: f64,
    pub start_point: Point3D,
    pub text_height: f64,
    pub text: String,
    pub tag: Option<String>,
    pub attribute_flag: i64,
    pub rotation: f64,
    pub scale: f64,
    pub oblique_angle: f64,
    pub text_style: String,
    pub text_generation_flag: i64,
    pub horizontal_justification: i64,
    pub vertical_justification: i64,
    pub alignment_point: Option<Point3D>,
    pub extrusion_direction: Point3D,
    pub lock_position_flag: bool,
    pub is_duplicated_entries_keep: bool,
    pub mtext_flag: i64,
    pub is_really_locked: bool,
    pub number_of_secondary_attributes: i64,
    pub secondary_attributes_hard_id: Option<String>,
    pub annotation_alignment_point: Option<Point3D>,
    pub annotation_scale: Option<f64>,
    pub definition_tag: Option<String>,
    pub embedded_mtext: Option<Box<MText>>,
}

impl Default for Attribute {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            thickness: 0.0,
            start_point: Point3D::default(),
            text_height: 0.0,
            text: String::new(),
            tag: None,
            attribute_flag: 0,
            rotation: 0.0,
            scale: 1.0,
            oblique_angle: 0.0,
            text_style: "STANDARD".to_string(),
            text_generation_flag: 0,
            horizontal_justification: 0,
            vertical_justification: 0,
            alignment_point: None,
            extrusion_direction: Point3D::unit_z(),
            lock_position_flag: false,
            is_duplicated_entries_keep: false,
            mtext_flag: 0,
            is_really_locked: false,
            number_of_secondary_attributes: 0,
            secondary_attributes_hard_id: None,
            annotation_alignment_point: None,
            annotation_scale: None,
            definition_tag: None,
            embedded_mtext: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MText {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub insertion_point: Point3D,
    pub height: f64,
    pub width: f64,
    pub attachment_point: i64,
    pub drawing_direction: i64,
    pub text: String,
    pub style_name: String,
    pub extrusion_direction: Point3D,
    pub direction: Option<Point3D>,
    pub rotation: f64,
    pub line_spacing_style: Option<i64>,
    pub line_spacing: Option<f64>,
    pub background_fill: Option<i64>,
    pub background_color: Option<i64>,
    pub background_color_name: Option<String>,
    pub fill_box_scale: Option<f64>,
    pub background_fill_color: Option<i64>,
    pub background_fill_transparency: Option<i64>,
    pub column_type: Option<i64>,
    pub column_count: Option<i64>,
    pub column_flow_reversed: Option<i64>,
    pub column_auto_height: Option<i64>,
    pub column_width: Option<f64>,
    pub column_gutter: Option<f64>,
    pub column_height: Option<f64>,
    pub annotation_height: Option<f64>,
}

impl Default for MText {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            insertion_point: Point3D::default(),
            height: 0.0,
            width: 0.0,
            attachment_point: 1,
            drawing_direction: 1,
            text: String::new(),
            style_name: "STANDARD".to_string(),
            extrusion_direction: Point3D::unit_z(),
            direction: None,
            rotation: 0.0,
            line_spacing_style: None,
            line_spacing: None,
            background_fill: None,
            background_color: None,
            background_color_name: None,
            fill_box_scale: None,
            background_fill_color: None,
            background_fill_transparency: None,
            column_type: None,
            column_count: None,
            column_flow_reversed: None,
            column_auto_height: None,
            column_width: None,
            column_gutter: None,
            column_height: None,
            annotation_height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insert {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub is_variable_attributes: bool,
    pub name: String,
    pub insertion_point: Point3D,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    pub rotation: f64,
    pub column_count: i64,
    pub row_count: i64,
    pub column_spacing: f64,
    pub row_spacing: f64,
    pub extrusion_direction: Point3D,
    pub attributes: Vec<Attribute>,
}

impl Default for Insert {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            is_variable_attributes: false,
            name: String::new(),
            insertion_point: Point3D::default(),
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            rotation: 0.0,
            column_count: 0,
            row_count: 0,
            column_spacing: 0.0,
            row_spacing: 0.0,
            extrusion_direction: Point3D::unit_z(),
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub style_name: Option<String>,
    pub is_arrowhead_enabled: bool,
    pub is_spline: bool,
    pub leader_creation_flag: Option<i64>,
    pub is_hookline_same_direction: bool,
    pub is_hookline_exists: bool,
    pub text_height: Option<f64>,
    pub text_width: Option<f64>,
    pub number_of_vertices: Option<i64>,
    pub vertices: Vec<Point3D>,
    pub by_block_color: Option<i64>,
    pub associated_annotation: Option<String>,
    pub normal: Option<Point3D>,
    pub horizontal_direction: Option<Point3D>,
    pub offset_from_block: Option<Point3D>,
    pub offset_from_annotation: Option<Point3D>,
}

impl Default for Leader {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            style_name: None,
            is_arrowhead_enabled: true,
            is_spline: false,
            leader_creation_flag: None,
            is_hookline_same_direction: false,
            is_hookline_exists: false,
            text_height: None,
            text_width: None,
            number_of_vertices: None,
            vertices: Vec::new(),
            by_block_color: None,
            associated_annotation: None,
            normal: None,
            horizontal_direction: None,
            offset_from_block: None,
            offset_from_annotation: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LwPolylineVertex {
    pub x: f64,
    pub y: f64,
    pub id: Option<i64>,
    pub start_width: Option<f64>,
    pub end_width: Option<f64>,
    pub bulge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LwPolyline {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub number_of_vertices: Option<i64>,
    pub flag: i64,
    pub constant_width: Option<f64>,
    pub elevation: f64,
    pub thickness: f64,
    pub vertices: Vec<LwPolylineVertex>,
    pub extrusion_direction: Point3D,
}

impl LwPolyline {
    pub fn is_closed(&self) -> bool {
        self.flag & 1 != 0
    }
}

impl Default for LwPolyline {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            number_of_vertices: None,
            flag: 0,
            constant_width: None,
            elevation: 0.0,
            thickness: 0.0,
            vertices: Vec::new(),
            extrusion_direction: Point3D::unit_z(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub position: Point3D,
    pub start_width: f64,
    pub end_width: f64,
    pub bulge: f64,
    pub flag: i64,
    pub tangent_direction: Option<f64>,
    pub faces: Vec<i64>,
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polyline {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub elevation: f64,
    pub thickness: f64,
    pub flag: i64,
    pub start_width: f64,
    pub end_width: f64,
    pub mesh_m_vertex_count: i64,
    pub mesh_n_vertex_count: i64,
    pub surface_m_density: i64,
    pub surface_n_density: i64,
    pub smooth_type: i64,
    pub extrusion_direction: Point3D,
    pub vertices: Vec<Vertex>,
}

impl Polyline {
    pub fn is_closed(&self) -> bool {
        self.flag & 1 != 0
    }
}

impl Default for Polyline {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            elevation: 0.0,
            thickness: 0.0,
            flag: 0,
            start_width: 0.0,
            end_width: 0.0,
            mesh_m_vertex_count: 0,
            mesh_n_vertex_count: 0,
            surface_m_density: 0,
            surface_n_density: 0,
            smooth_type: 0,
            extrusion_direction: Point3D::unit_z(),
            vertices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub state: Option<i64>,
    pub flag: Option<i64>,
    pub name: Option<String>,
    pub vertical_direction: Option<Point3D>,
    pub top_height: Option<f64>,
    pub bottom_height: Option<f64>,
    pub indicator_transparency: Option<i64>,
    pub indicator_color: Option<i64>,
    pub indicator_color_name: Option<String>,
    pub vertices_count: Option<i64>,
    pub vertices: Vec<Point3D>,
    pub number_of_back_line_vertices: Option<i64>,
    pub back_line_vertices: Vec<Point3D>,
    pub geometry_setting_hard_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solid {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub points: Vec<Point3D>,
    pub thickness: f64,
    pub extrusion_direction: Point3D,
}

impl Default for Solid {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            points: Vec::new(),
            thickness: 0.0,
            extrusion_direction: Point3D::unit_z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spline {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub normal: Option<Point3D>,
    pub flag: i64,
    pub degree: i64,
    pub number_of_knots: Option<i64>,
    pub number_of_control_points: Option<i64>,
    pub number_of_fit_points: Option<i64>,
    pub knot_tolerance: f64,
    pub control_tolerance: f64,
    pub fit_tolerance: f64,
    pub start_tangent: Option<Point3D>,
    pub end_tangent: Option<Point3D>,
    pub knots: Vec<f64>,
    pub weights: Vec<f64>,
    pub control_points: Vec<Point3D>,
    pub fit_points: Vec<Point3D>,
}

impl Default for Spline {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            normal: None,
            flag: 0,
            degree: 0,
            number_of_knots: None,
            number_of_control_points: None,
            number_of_fit_points: None,
            knot_tolerance: 1e-6,
            control_tolerance: 1e-6,
            fit_tolerance: 1e-9,
            start_tangent: None,
            end_tangent: None,
            knots: Vec::new(),
            weights: Vec::new(),
            control_points: Vec::new(),
            fit_points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub version: Option<i64>,
    /// 承载标注图形的匿名块名。
    pub name: Option<String>,
    pub definition_point: Option<Point3D>,
    pub text_point: Option<Point3D>,
    pub insertion_point: Option<Point3D>,
    pub sub_definition_point1: Option<Point3D>,
    pub sub_definition_point2: Option<Point3D>,
    pub center_point: Option<Point3D>,
    pub arc_point: Option<Point3D>,
    pub dimension_type: i64,
    pub attachment_point: Option<i64>,
    pub text_line_spacing_style: Option<i64>,
    pub text_line_spacing_factor: Option<f64>,
    pub leader_length: Option<f64>,
    pub measurement: Option<f64>,
    pub text: Option<String>,
    pub rotation_angle: Option<f64>,
    pub oblique_angle: Option<f64>,
    pub text_rotation: Option<f64>,
    pub ocs_rotation: Option<f64>,
    pub extrusion_direction: Option<Point3D>,
    pub style_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub viewport_center: Point3D,
    pub width: f64,
    pub height: f64,
    pub status: Option<i64>,
    pub viewport_id: Option<i64>,
    pub display_center: Option<Point3D>,
    pub snap_base: Option<Point3D>,
    pub snap_spacing: Option<Point3D>,
    pub grid_spacing: Option<Point3D>,
    pub view_direction: Option<Point3D>,
    pub target_point: Option<Point3D>,
    pub perspective_lens_length: Option<f64>,
    pub front_clip_z: Option<f64>,
    pub back_clip_z: Option<f64>,
    pub view_height: Option<f64>,
    pub snap_angle: Option<f64>,
    pub view_twist_angle: Option<f64>,
    pub circle_zoom_percent: Option<i64>,
    pub frozen_layer_ids: Vec<String>,
    pub status_bit_flags: Option<i64>,
    pub clipping_boundary_id: Option<String>,
    pub sheet_name: Option<String>,
    pub render_mode: Option<i64>,
    pub ucs_per_viewport: Option<i64>,
    pub ucs_origin: Option<Point3D>,
    pub ucs_x_axis: Option<Point3D>,
    pub ucs_y_axis: Option<Point3D>,
    pub ucs_id: Option<String>,
    pub ucs_base_id: Option<String>,
    pub orthographic_type: Option<i64>,
    pub elevation: Option<f64>,
    pub shade_plot_mode: Option<i64>,
    pub major_grid_frequency: Option<i64>,
    pub background_id: Option<String>,
    pub shade_plot_id: Option<String>,
    pub visual_style_id: Option<String>,
    pub is_default_lighting: bool,
    pub default_lighting_type: Option<i64>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub ambient_light_color: Option<i64>,
    pub ambient_light_color_name: Option<String>,
    pub sun_id: Option<String>,
    pub soft_pointer: Option<String>,
}

/// 填充线型定义中的 (x, y) 向量；y 缺省时取 0。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternVector {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatchDefinitionLine {
    pub angle: f64,
    pub base: PatternVector,
    pub offset: PatternVector,
    pub number_of_dash_lengths: Option<i64>,
    pub dash_lengths: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatchGradientColor {
    pub value: f64,
    pub color_index: Option<i64>,
    pub color: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineBoundaryVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineBoundaryPath {
    pub boundary_path_type_flag: i64,
    pub has_bulge: bool,
    pub is_closed: bool,
    pub number_of_vertices: Option<i64>,
    pub vertices: Vec<PolylineBoundaryVertex>,
    pub number_of_source_boundary_objects: Option<i64>,
    pub source_boundary_objects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeBoundaryPath {
    pub boundary_path_type_flag: i64,
    pub number_of_edges: Option<i64>,
    pub edges: Vec<BoundaryEdge>,
    pub number_of_source_boundary_objects: Option<i64>,
    pub source_boundary_objects: Vec<String>,
}

/// 边界路径：标志位含 2 时为多段线路径，否则为边路径。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryPath {
    Polyline(PolylineBoundaryPath),
    Edges(EdgeBoundaryPath),
}

impl BoundaryPath {
    pub const POLYLINE_FLAG: i64 = 2;

    pub fn flag(&self) -> i64 {
        match self {
            BoundaryPath::Polyline(path) => path.boundary_path_type_flag,
            BoundaryPath::Edges(path) => path.boundary_path_type_flag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineEdge {
    pub start: Point3D,
    pub end: Point3D,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularEdge {
    pub center: Point3D,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    #[serde(rename = "isCCW")]
    pub is_ccw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipticEdge {
    pub center: Point3D,
    pub end: Point3D,
    pub length_of_minor_axis: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    #[serde(rename = "isCCW")]
    pub is_ccw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedControlPoint {
    #[serde(flatten)]
    pub point: Point3D,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplineEdge {
    pub degree: i64,
    pub spline_flag: Option<i64>,
    pub is_periodic: bool,
    pub number_of_knots: Option<i64>,
    pub number_of_control_points: Option<i64>,
    pub knots: Vec<f64>,
    pub control_points: Vec<WeightedControlPoint>,
    pub number_of_fit_data: Option<i64>,
    pub fit_datum: Vec<Point3D>,
    pub start_tangent: Option<Point3D>,
    pub end_tangent: Option<Point3D>,
}

/// 边路径中的单条边，按组码 72 的类型值区分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryEdge {
    Line(LineEdge),
    Circular(CircularEdge),
    Elliptic(EllipticEdge),
    Spline(SplineEdge),
}

impl BoundaryEdge {
    pub fn type_code(&self) -> i64 {
        match self {
            BoundaryEdge::Line(_) => 1,
            BoundaryEdge::Circular(_) => 2,
            BoundaryEdge::Elliptic(_) => 3,
            BoundaryEdge::Spline(_) => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hatch {
    #[serde(flatten)]
    pub common: EntityCommon,
    pub elevation_point: Point3D,
    pub extrusion_direction: Point3D,
    pub pattern_name: Option<String>,
    pub solid_fill: i64,
    pub pattern_fill_color: Option<i64>,
    pub associativity: i64,
    pub number_of_boundary_paths: Option<i64>,
    pub boundary_paths: Vec<BoundaryPath>,
    pub hatch_style: Option<i64>,
    pub pattern_type: Option<i64>,
    pub pattern_angle: Option<f64>,
    pub pattern_scale: Option<f64>,
    pub is_annotated: bool,
    pub is_double: bool,
    pub number_of_definition_lines: Option<i64>,
    pub definition_lines: Vec<HatchDefinitionLine>,
    pub pixel_size: Option<f64>,
    pub number_of_seed_points: Option<i64>,
    pub offset_vector: Option<Point3D>,
    pub seed_points: Vec<Point3D>,
    pub gradient_flag: Option<i64>,
    pub gradient_color_flag: Option<i64>,
    pub number_of_colors: Option<i64>,
    pub gradient_colors: Vec<HatchGradientColor>,
    pub gradient_rotation: f64,
    pub gradient_definition: Option<f64>,
    pub color_tint: f64,
    pub gradient_name: Option<String>,
}

impl Default for Hatch {
    fn default() -> Self {
        Self {
            common: EntityCommon::default(),
            elevation_point: Point3D::default(),
            extrusion_direction: Point3D::unit_z(),
            pattern_name: None,
            solid_fill: 0,
            pattern_fill_color: None,
            associativity: 0,
            number_of_boundary_paths: None,
            boundary_paths: Vec::new(),
            hatch_style: None,
            pattern_type: None,
            pattern_angle: None,
            pattern_scale: None,
            is_annotated: false,
            is_double: false,
            number_of_definition_lines: None,
            definition_lines: Vec::new(),
            pixel_size: None,
            number_of_seed_points: None,
            offset_vector: None,
            seed_points: Vec::new(),
            gradient_flag: None,
            gradient_color_flag: None,
            number_of_colors: None,
            gradient_colors: Vec::new(),
            gradient_rotation: 0.0,
            gradient_definition: None,
            color_tint: 0.0,
            gradient_name: None,
        }
    }
}

macro_rules! entity_kinds {
    ($($variant:ident($ty:ident) => $name:literal,)+) => {
        /// DXF 实体，按记录类型名区分。
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type")]
        pub enum Entity {
            $(
                #[serde(rename = $name)]
                $variant($ty),
            )+
        }

        impl Entity {
            /// 记录类型名，与选择解析器时使用的名称一致。
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Entity::$variant(_) => $name,)+
                }
            }

            pub fn common(&self) -> &EntityCommon {
                match self {
                    $(Entity::$variant(inner) => &inner.common,)+
                }
            }

            pub fn common_mut(&mut self) -> &mut EntityCommon {
                match self {
                    $(Entity::$variant(inner) => &mut inner.common,)+
                }
            }
        }

        $(
            impl EntityRecord for $ty {
                const TYPE_NAME: &'static str = $name;

                fn common(&self) -> &EntityCommon {
                    &self.common
                }

                fn common_mut(&mut self) -> &mut EntityCommon {
                    &mut self.common
                }
            }

            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Entity::$variant(value)
                }
            }
        )+

        /// 全部受支持的实体类型名。
        pub const SUPPORTED_ENTITY_TYPES: &[&str] = &[$($name),+];
    };
}

entity_kinds! {
    Arc(Arc) => "ARC",
    AttributeDefinition(AttributeDefinition) => "ATTDEF",
    Attribute(Attribute) => "ATTRIB",
    Circle(Circle) => "CIRCLE",
    Dimension(Dimension) => "DIMENSION",
    Ellipse(Ellipse) => "ELLIPSE",
    Hatch(Hatch) => "HATCH",
    Insert(Insert) => "INSERT",
    Leader(Leader) => "LEADER",
    Line(Line) => "LINE",
    LwPolyline(LwPolyline) => "LWPOLYLINE",
    MText(MText) => "MTEXT",
    Point(PointEntity) => "POINT",
    Polyline(Polyline) => "POLYLINE",
    Section(Section) => "SECTION",
    Solid(Solid) => "SOLID",
    Spline(Spline) => "SPLINE",
    Text(Text) => "TEXT",
    Vertex(Vertex) => "VERTEX",
    Viewport(Viewport) => "VIEWPORT",
}

impl Entity {
    pub fn handle(&self) -> Option<&str> {
        self.common().handle.as_deref()
    }

    /// INSERT 的块名，或带块名的 DIMENSION。
    pub fn block_reference(&self) -> Option<&str> {
        match self {
            Entity::Insert(insert) => Some(insert.name.as_str()),
            Entity::Dimension(dimension) => dimension.name.as_deref().filter(|n| !n.is_empty()),
            _ => None,
        }
    }

    /// 实体的代表性定位点，用于范围统计。
    pub fn anchor_points(&self) -> Vec<Point3D> {
        match self {
            Entity::Arc(arc) => vec![arc.center],
            Entity::AttributeDefinition(attdef) => vec![attdef.body.start_point],
            Entity::Attribute(attrib) => vec![attrib.start_point],
            Entity::Circle(circle) => vec![circle.center],
            Entity::Dimension(dimension) => dimension.definition_point.into_iter().collect(),
            Entity::Ellipse(ellipse) => vec![ellipse.center],
            Entity::Hatch(hatch) => hatch
                .boundary_paths
                .iter()
                .flat_map(|path| match path {
                    BoundaryPath::Polyline(poly) => poly
                        .vertices
                        .iter()
                        .map(|v| Point3D::planar(v.x, v.y))
                        .collect::<Vec<_>>(),
                    BoundaryPath::Edges(_) => Vec::new(),
                })
                .collect(),
            Entity::Insert(insert) => vec![insert.insertion_point],
            Entity::Leader(leader) => leader.vertices.clone(),
            Entity::Line(line) => vec![line.start_point, line.end_point],
            Entity::LwPolyline(poly) => poly
                .vertices
                .iter()
                .map(|v| Point3D::planar(v.x, v.y))
                .collect(),
            Entity::MText(mtext) => vec![mtext.insertion_point],
            Entity::Point(point) => vec![point.position],
            Entity::Polyline(poly) => poly.vertices.iter().map(|v| v.position).collect(),
            Entity::Section(section) => section.vertices.clone(),
            Entity::Solid(solid) => solid.points.clone(),
            Entity::Spline(spline) => {
                if spline.control_points.is_empty() {
                    spline.fit_points.clone()
                } else {
                    spline.control_points.clone()
                }
            }
            Entity::Text(text) => vec![text.body.start_point],
            Entity::Vertex(vertex) => vec![vertex.position],
            Entity::Viewport(viewport) => vec![viewport.viewport_center],
        }
    }
}

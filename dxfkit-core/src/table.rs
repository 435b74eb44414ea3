use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;
use crate::value::GroupValue;

/// 符号表（TABLE ... ENDTAB）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub handle: Option<String>,
    pub owner_object_id: Option<String>,
    pub subclass_marker: Option<String>,
    pub max_number_of_entries: Option<i64>,
    pub entries: Vec<TableEntry>,
}

impl Table {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn find(&self, name: &str) -> Option<&TableEntry> {
        self.entries.iter().find(|entry| entry.name() == Some(name))
    }
}

/// 所有表项共享的字段。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecordCommon {
    pub handle: Option<String>,
    pub owner_object_id: Option<String>,
    pub subclass_marker: Option<String>,
}

pub trait TableRecord: Default {
    const TYPE_NAME: &'static str;

    fn common_mut(&mut self) -> &mut TableRecordCommon;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    #[serde(flatten)]
    pub common: TableRecordCommon,
    pub name: String,
    pub standard_flag: i64,
    pub color_index: Option<i64>,
    pub line_type: Option<String>,
    pub is_plotting: Option<bool>,
    pub lineweight: Option<i64>,
    pub plot_style_name_object_id: Option<String>,
    pub material_object_id: Option<String>,
}

impl LayerEntry {
    /// 颜色索引为负表示图层关闭。
    pub fn is_off(&self) -> bool {
        self.color_index.is_some_and(|index| index < 0)
    }

    pub fn is_frozen(&self) -> bool {
        self.standard_flag & 1 != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeElement {
    pub element_length: f64,
    pub element_type_flag: i64,
    pub shape_number: Option<i64>,
    pub style_object_id: Option<String>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeEntry {
    #[serde(flatten)]
    pub common: TableRecordCommon,
    pub name: String,
    pub standard_flag: i64,
    pub description: Option<String>,
    pub number_of_line_types: Option<i64>,
    pub total_pattern_length: Option<f64>,
    pub pattern: Vec<LineTypeElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleEntry {
    #[serde(flatten)]
    pub common: TableRecordCommon,
    pub name: String,
    pub standard_flag: i64,
    pub fixed_text_height: Option<f64>,
    pub width_factor: Option<f64>,
    pub oblique_angle: Option<f64>,
    pub text_generation_flag: Option<i64>,
    pub last_height: Option<f64>,
    pub font: Option<String>,
    pub big_font: Option<String>,
    pub extended_font: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportEntry {
    #[serde(flatten)]
    pub common: TableRecordCommon,
    pub name: String,
    pub standard_flag: i64,
    pub lower_left_corner: Option<Point3D>,
    pub upper_right_corner: Option<Point3D>,
    pub center: Option<Point3D>,
    pub snap_base_point: Option<Point3D>,
    pub snap_spacing: Option<Point3D>,
    pub grid_spacing: Option<Point3D>,
    pub view_direction_from_target: Option<Point3D>,
    pub view_target: Option<Point3D>,
    pub view_height: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub lens_length: Option<f64>,
    pub front_clipping_plane: Option<f64>,
    pub back_clipping_plane: Option<f64>,
    pub snap_rotation_angle: Option<f64>,
    pub view_twist_angle: Option<f64>,
    pub circle_sides: Option<i64>,
    pub frozen_layers: Vec<String>,
    pub style_sheet: Option<String>,
    pub render_mode: Option<i64>,
    pub view_mode: Option<i64>,
    pub ucs_icon_setting: Option<i64>,
    pub ucs_origin: Option<Point3D>,
    pub ucs_x_axis: Option<Point3D>,
    pub ucs_y_axis: Option<Point3D>,
    pub orthographic_type: Option<i64>,
    pub elevation: Option<f64>,
    pub shade_plot_setting: Option<i64>,
    pub major_grid_lines: Option<i64>,
    pub background_object_id: Option<String>,
    pub shade_plot_object_id: Option<String>,
    pub visual_style_object_id: Option<String>,
    pub is_default_lighting_on: Option<bool>,
    pub default_lighting_type: Option<i64>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub ambient_color: Option<i64>,
    pub ambient_color_name: Option<String>,
}

/// 标注样式变量的出厂默认值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DimDefault {
    Float(f64),
    Integer(i64),
    Text(&'static str),
}

impl DimDefault {
    pub fn to_value(self) -> GroupValue {
        match self {
            DimDefault::Float(value) => GroupValue::Float(value),
            DimDefault::Integer(value) => GroupValue::Integer(value),
            DimDefault::Text(value) => GroupValue::Text(value.to_string()),
        }
    }
}

/// DIMSTYLE 表项中一个变量的组码、名称与默认值（公制 / 英制）。
#[derive(Debug, Clone, Copy)]
pub struct DimVariable {
    pub name: &'static str,
    pub code: i32,
    pub metric: Option<DimDefault>,
    pub imperial: Option<DimDefault>,
}

const fn var(name: &'static str, code: i32) -> DimVariable {
    DimVariable {
        name,
        code,
        metric: None,
        imperial: None,
    }
}

const fn float(name: &'static str, code: i32, metric: f64) -> DimVariable {
    DimVariable {
        name,
        code,
        metric: Some(DimDefault::Float(metric)),
        imperial: Some(DimDefault::Float(metric)),
    }
}

const fn float2(name: &'static str, code: i32, metric: f64, imperial: f64) -> DimVariable {
    DimVariable {
        name,
        code,
        metric: Some(DimDefault::Float(metric)),
        imperial: Some(DimDefault::Float(imperial)),
    }
}

const fn int(name: &'static str, code: i32, metric: i64) -> DimVariable {
    DimVariable {
        name,
        code,
        metric: Some(DimDefault::Integer(metric)),
        imperial: Some(DimDefault::Integer(metric)),
    }
}

const fn int2(name: &'static str, code: i32, metric: i64, imperial: i64) -> DimVariable {
    DimVariable {
        name,
        code,
        metric: Some(DimDefault::Integer(metric)),
        imperial: Some(DimDefault::Integer(imperial)),
    }
}

pub const DIM_STYLE_VARIABLES: &[DimVariable] = &[
    var("DIMPOST", 3),
    var("DIMAPOST", 4),
    var("DIMBLK_OBSOLETE", 5),
    var("DIMBLK1_OBSOLETE", 6),
    var("DIMBLK2_OBSOLETE", 7),
    float("DIMSCALE", 40, 1.0),
    float("DIMASZ", 41, 0.25),
    float2("DIMEXO", 42, 0.625, 0.0625),
    float2("DIMDLI", 43, 3.75, 0.38),
    float2("DIMEXE", 44, 2.25, 0.28),
    float("DIMRND", 45, 0.0),
    float("DIMDLE", 46, 0.0),
    float("DIMTP", 47, 0.0),
    float("DIMTM", 48, 0.0),
    float2("DIMTXT", 140, 2.5, 0.28),
    float2("DIMCEN", 141, 2.5, 0.09),
    float("DIMTSZ", 142, 0.0),
    float("DIMALTF", 143, 25.4),
    float("DIMLFAC", 144, 1.0),
    float("DIMTVP", 145, 0.0),
    float("DIMTFAC", 146, 1.0),
    float2("DIMGAP", 147, 0.625, 0.09),
    float("DIMALTRND", 148, 0.0),
    int2("DIMTOL", 71, 0, 1),
    int("DIMLIM", 72, 0),
    int2("DIMTIH", 73, 0, 1),
    int2("DIMTOH", 74, 0, 1),
    int("DIMSE1", 75, 0),
    int("DIMSE2", 76, 0),
    int2("DIMTAD", 77, 1, 0),
    int2("DIMZIN", 78, 8, 0),
    int("DIMAZIN", 79, 0),
    int("DIMALT", 170, 0),
    int2("DIMALTD", 171, 3, 2),
    int2("DIMTOFL", 172, 1, 0),
    int("DIMSAH", 173, 0),
    int("DIMTIX", 174, 0),
    int("DIMSOXD", 175, 0),
    int("DIMCLRD", 176, 0),
    int("DIMCLRE", 177, 0),
    int("DIMCLRT", 178, 0),
    var("DIMADEC", 179),
    var("DIMUNIT", 270),
    int2("DIMDEC", 271, 2, 4),
    int2("DIMTDEC", 272, 2, 4),
    int("DIMALTU", 273, 2),
    int2("DIMALTTD", 274, 2, 4),
    int("DIMAUNIT", 275, 0),
    int("DIMFRAC", 276, 0),
    int("DIMLUNIT", 277, 2),
    DimVariable {
        name: "DIMDSEP",
        code: 278,
        metric: Some(DimDefault::Text(",")),
        imperial: Some(DimDefault::Text(".")),
    },
    int("DIMJUST", 280, 0),
    int("DIMSD1", 281, 0),
    int("DIMSD2", 282, 0),
    int("DIMTOLJ", 283, 1),
    int2("DIMTZIN", 284, 8, 0),
    int("DIMALTZ", 285, 8),
    int("DIMALTTZ", 286, 8),
    var("DIMFIT", 287),
    int("DIMUPT", 288, 0),
    int("DIMATFIT", 289, 3),
    var("DIMTXSTY", 340),
    var("DIMLDRBLK", 341),
    var("DIMBLK", 342),
    var("DIMBLK1", 343),
    var("DIMBLK2", 344),
    int("DIMLWD", 371, -2),
    int("DIMLWE", 372, -2),
];

pub fn dim_variable_by_code(code: i32) -> Option<&'static DimVariable> {
    DIM_STYLE_VARIABLES.iter().find(|variable| variable.code == code)
}

pub fn dim_variable_by_name(name: &str) -> Option<&'static DimVariable> {
    DIM_STYLE_VARIABLES.iter().find(|variable| variable.name == name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimStyleEntry {
    #[serde(flatten)]
    pub common: TableRecordCommon,
    pub name: String,
    pub standard_flag: i64,
    /// 文件中显式出现的变量，按 DIMxxx 名称索引。
    pub variables: BTreeMap<String, GroupValue>,
}

impl DimStyleEntry {
    /// 读取变量值；文件未给出时回落到公制默认值。
    pub fn variable(&self, name: &str) -> Option<GroupValue> {
        self.variable_with_units(name, false)
    }

    pub fn variable_with_units(&self, name: &str, imperial: bool) -> Option<GroupValue> {
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        let variable = dim_variable_by_name(name)?;
        let default = if imperial {
            variable.imperial
        } else {
            variable.metric
        };
        default.map(DimDefault::to_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecordEntry {
    #[serde(flatten)]
    pub common: TableRecordCommon,
    pub name: String,
    pub layout_objects: Option<String>,
    pub insertion_units: Option<i64>,
    pub explodability: Option<i64>,
    pub scalability: Option<i64>,
    pub bmp_preview: Vec<String>,
}

macro_rules! table_entries {
    ($($variant:ident($ty:ident) => $name:literal,)+) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type")]
        pub enum TableEntry {
            $(
                #[serde(rename = $name)]
                $variant($ty),
            )+
        }

        impl TableEntry {
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(TableEntry::$variant(_) => $name,)+
                }
            }

            pub fn common(&self) -> &TableRecordCommon {
                match self {
                    $(TableEntry::$variant(entry) => &entry.common,)+
                }
            }

            pub fn name(&self) -> Option<&str> {
                match self {
                    $(TableEntry::$variant(entry) => Some(entry.name.as_str()),)+
                }
            }
        }

        $(
            impl TableRecord for $ty {
                const TYPE_NAME: &'static str = $name;

                fn common_mut(&mut self) -> &mut TableRecordCommon {
                    &mut self.common
                }
            }

            impl From<$ty> for TableEntry {
                fn from(value: $ty) -> Self {
                    TableEntry::$variant(value)
                }
            }
        )+
    };
}

table_entries! {
    Layer(LayerEntry) => "LAYER",
    LineType(LineTypeEntry) => "LTYPE",
    Style(TextStyleEntry) => "STYLE",
    Viewport(ViewportEntry) => "VPORT",
    DimStyle(DimStyleEntry) => "DIMSTYLE",
    BlockRecord(BlockRecordEntry) => "BLOCK_RECORD",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_variable_codes_are_unique() {
        for (idx, variable) in DIM_STYLE_VARIABLES.iter().enumerate() {
            assert!(
                DIM_STYLE_VARIABLES[idx + 1..]
                    .iter()
                    .all(|other| other.code != variable.code && other.name != variable.name),
                "重复的标注变量 {}",
                variable.name
            );
        }
    }

    #[test]
    fn dimstyle_falls_back_to_defaults() {
        let mut style = DimStyleEntry::default();
        style
            .variables
            .insert("DIMTXT".to_string(), GroupValue::Float(3.5));
        assert_eq!(style.variable("DIMTXT"), Some(GroupValue::Float(3.5)));
        assert_eq!(style.variable("DIMSCALE"), Some(GroupValue::Float(1.0)));
        assert_eq!(
            style.variable_with_units("DIMDSEP", true),
            Some(GroupValue::Text(".".to_string()))
        );
        assert_eq!(style.variable("DIMLWE"), Some(GroupValue::Integer(-2)));
        assert_eq!(style.variable("DIMPOST"), None);
    }
}

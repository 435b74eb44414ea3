use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;

/// 对象在 [`ObjectGraph`] 中的位置索引。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub usize);

/// OBJECTS 段记录的公共字段，以及解析后回填的所有者引用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedObjectCommon {
    pub handle: Option<String>,
    pub owner_dictionary_id_soft: Option<String>,
    pub owner_dictionary_id_hard: Option<String>,
    pub owner_object_id: Option<String>,
    pub subclass_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_dictionary_soft: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_dictionary_hard: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_object: Option<ObjectId>,
}

pub trait ObjectData: Default {
    const TYPE_NAME: &'static str;

    fn common_mut(&mut self) -> &mut OwnedObjectCommon;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub name: String,
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    #[serde(flatten)]
    pub common: OwnedObjectCommon,
    pub is_hard_owned: bool,
    pub record_clone_flag: Option<i64>,
    pub entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    pub const SUBCLASS: &'static str = "AcDbDictionary";

    pub fn entry(&self, name: &str) -> Option<&DictionaryEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    fn is_root(&self) -> bool {
        self.common.subclass_marker.as_deref() == Some(Self::SUBCLASS)
            && self.common.owner_dictionary_id_soft.as_deref() == Some("0")
    }
}

/// 打印设置字段，PLOTSETTINGS 与 LAYOUT 共用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotSettingsFields {
    pub page_setup_name: Option<String>,
    pub config_name: Option<String>,
    pub paper_size: Option<String>,
    pub plot_view_name: Option<String>,
    pub margin_left: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub margin_right: Option<f64>,
    pub margin_top: Option<f64>,
    pub paper_width: Option<f64>,
    pub paper_height: Option<f64>,
    pub plot_origin_x: Option<f64>,
    pub plot_origin_y: Option<f64>,
    pub window_area_x_min: Option<f64>,
    pub window_area_x_max: Option<f64>,
    pub window_area_y_min: Option<f64>,
    pub window_area_y_max: Option<f64>,
    pub print_scale_nominator: Option<f64>,
    pub print_scale_denominator: Option<f64>,
    pub layout_flag: Option<i64>,
    pub paper_unit: Option<i64>,
    pub plot_rotation: Option<i64>,
    pub plot_type: Option<i64>,
    pub current_style_sheet: Option<String>,
    pub standard_scale_type: Option<i64>,
    pub shade_plot_mode: Option<i64>,
    pub shade_plot_resolution: Option<i64>,
    pub shade_plot_custom_dpi: Option<i64>,
    pub scale_factor: Option<f64>,
    pub image_origin_x: Option<f64>,
    pub image_origin_y: Option<f64>,
    pub shade_plot_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotSettings {
    #[serde(flatten)]
    pub common: OwnedObjectCommon,
    #[serde(flatten)]
    pub settings: PlotSettingsFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(flatten)]
    pub common: OwnedObjectCommon,
    #[serde(flatten)]
    pub settings: PlotSettingsFields,
    pub layout_name: Option<String>,
    pub control_flag: Option<i64>,
    pub tab_order: Option<i64>,
    pub min_limit: Option<Point3D>,
    pub max_limit: Option<Point3D>,
    pub insertion_base: Option<Point3D>,
    pub min_extent: Option<Point3D>,
    pub max_extent: Option<Point3D>,
    pub elevation: Option<f64>,
    pub ucs_origin: Option<Point3D>,
    pub ucs_x_axis: Option<Point3D>,
    pub ucs_y_axis: Option<Point3D>,
    pub orthographic_type: Option<i64>,
    pub paper_space_table_id: Option<String>,
    pub viewport_id: Option<String>,
    pub named_ucs_id: Option<String>,
    pub orthographic_ucs_id: Option<String>,
    pub layout_shade_plot_id: Option<String>,
}

macro_rules! object_kinds {
    ($($variant:ident($ty:ident) => $name:literal,)+) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "name")]
        pub enum ObjectRecord {
            $(
                #[serde(rename = $name)]
                $variant($ty),
            )+
        }

        impl ObjectRecord {
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(ObjectRecord::$variant(_) => $name,)+
                }
            }

            pub fn common(&self) -> &OwnedObjectCommon {
                match self {
                    $(ObjectRecord::$variant(inner) => &inner.common,)+
                }
            }

            pub fn common_mut(&mut self) -> &mut OwnedObjectCommon {
                match self {
                    $(ObjectRecord::$variant(inner) => &mut inner.common,)+
                }
            }
        }

        $(
            impl ObjectData for $ty {
                const TYPE_NAME: &'static str = $name;

                fn common_mut(&mut self) -> &mut OwnedObjectCommon {
                    &mut self.common
                }
            }

            impl From<$ty> for ObjectRecord {
                fn from(value: $ty) -> Self {
                    ObjectRecord::$variant(value)
                }
            }
        )+
    };
}

object_kinds! {
    Dictionary(Dictionary) => "DICTIONARY",
    Layout(Layout) => "LAYOUT",
    PlotSettings(PlotSettings) => "PLOTSETTINGS",
}

impl ObjectRecord {
    pub fn handle(&self) -> Option<&str> {
        self.common().handle.as_deref()
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            ObjectRecord::Dictionary(dictionary) => Some(dictionary),
            _ => None,
        }
    }
}

/// OBJECTS 段对象图。对象存放在数组中，引用以 [`ObjectId`] 表示。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectGraph {
    pub objects: Vec<ObjectRecord>,
    pub by_name: BTreeMap<String, Vec<ObjectId>>,
    /// 第一个解析到的对象，通常是根字典。
    pub root: Option<ObjectId>,
}

impl ObjectGraph {
    /// 建立按类型名索引，并把句柄引用解析为对象索引。
    ///
    /// 字典条目得到目标对象；除根字典（软所有者为 "0"）外，每个对象得到
    /// 所有者字典和所有者对象的回指。
    pub fn from_records(objects: Vec<ObjectRecord>) -> Self {
        let by_handle: HashMap<String, ObjectId> = objects
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| record.handle().map(|h| (h.to_string(), ObjectId(idx))))
            .collect();
        let lookup = |handle: &Option<String>| handle.as_ref().and_then(|h| by_handle.get(h).copied());

        let mut graph = Self {
            objects,
            by_name: BTreeMap::new(),
            root: None,
        };

        for (idx, record) in graph.objects.iter_mut().enumerate() {
            graph
                .by_name
                .entry(record.type_name().to_string())
                .or_default()
                .push(ObjectId(idx));

            let is_root_dictionary = record.as_dictionary().is_some_and(Dictionary::is_root);
            if !is_root_dictionary {
                let common = record.common_mut();
                common.owner_dictionary_soft = lookup(&common.owner_dictionary_id_soft);
                common.owner_dictionary_hard = lookup(&common.owner_dictionary_id_hard);
                common.owner_object = lookup(&common.owner_object_id);
            }

            if let ObjectRecord::Dictionary(dictionary) = record {
                for entry in &mut dictionary.entries {
                    entry.target = lookup(&entry.object_id);
                }
            }
        }

        if !graph.objects.is_empty() {
            graph.root = Some(ObjectId(0));
        }
        graph
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(id.0)
    }

    pub fn root(&self) -> Option<&ObjectRecord> {
        self.root.and_then(|id| self.get(id))
    }

    pub fn named(&self, type_name: &str) -> impl Iterator<Item = &ObjectRecord> {
        self.by_name
            .get(type_name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(*id))
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|record| record.handle() == Some(handle))
            .map(ObjectId)
    }

    /// 沿根字典的条目名称逐级查找，例如 `["ACAD_LAYOUT", "Model"]`。
    pub fn lookup_path(&self, path: &[&str]) -> Option<ObjectId> {
        let mut current = self.root?;
        for name in path {
            let dictionary = self.get(current)?.as_dictionary()?;
            current = dictionary.entry(name)?.target?;
        }
        Some(current)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

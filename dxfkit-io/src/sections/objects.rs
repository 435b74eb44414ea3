use dxfkit_core::object::{
    Dictionary, DictionaryEntry, Layout, ObjectData, PlotSettings, PlotSettingsFields,
};
use dxfkit_core::{ObjectGraph, ObjectRecord};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::reader::{DiagnosticKind, GroupReader};
use crate::registry::RecordRegistry;
use crate::spec::{spec_record, store, FieldContext, RecordSpec, SpecBuilder};

/// 受支持的对象类型。
pub static OBJECT_REGISTRY: Lazy<RecordRegistry<ObjectRecord>> = Lazy::new(|| {
    let mut registry = RecordRegistry::new();
    registry.register_record::<Dictionary>();
    registry.register_record::<Layout>();
    registry.register_record::<PlotSettings>();
    registry
});

/// 对象公共字段。
///
/// 102 组逐个消费；第一个 330 位于 `{ACAD_REACTORS` 组内，记为软所有者字典，
/// 第二个 330 是真正的所有者对象。
fn owned_common<R: ObjectData + 'static>(fields: SpecBuilder<R>) -> SpecBuilder<R> {
    fields
        .field(5, |r, cx| {
            r.common_mut().handle = Some(cx.text()?);
            Ok(())
        })
        .ignore(102)
        .ignore(102)
        .ignore(102)
        .field(330, |r, cx| {
            r.common_mut().owner_dictionary_id_soft = Some(cx.text()?);
            Ok(())
        })
        .ignore(102)
        .ignore(102)
        .field(360, |r, cx| {
            r.common_mut().owner_dictionary_id_hard = Some(cx.text()?);
            Ok(())
        })
        .ignore(102)
        .field(330, |r, cx| {
            r.common_mut().owner_object_id = Some(cx.text()?);
            Ok(())
        })
}

fn subclass<R: ObjectData>(record: &mut R, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    record.common_mut().subclass_marker = Some(cx.text()?);
    Ok(())
}

/// 字典条目：组码 3 给出名称，紧随的 350/360 给出目标句柄。
fn dictionary_entry(dictionary: &mut Dictionary, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    let name = cx.text()?;
    let next = cx.reader().next()?;
    let object_id = if matches!(next.code, 350 | 360) {
        Some(next.value.to_string())
    } else {
        cx.reader().rewind(1);
        None
    };
    dictionary.entries.push(DictionaryEntry {
        name,
        object_id,
        target: None,
    });
    Ok(())
}

spec_record!(Dictionary => || {
    RecordSpec::<Dictionary>::builder("DICTIONARY")
        .with(owned_common)
        .field(100, subclass)
        .field(280, |r, cx| {
            r.is_hard_owned = cx.int()? != 0;
            Ok(())
        })
        .field(281, store!(record_clone_flag = Some(int)))
        .multiple(3, dictionary_entry)
        .build()
});

/// AcDbPlotSettings 字段，PLOTSETTINGS 与 LAYOUT 共用。
trait PlotSettingsRecord: ObjectData + 'static {
    fn settings(&mut self) -> &mut PlotSettingsFields;
}

impl PlotSettingsRecord for PlotSettings {
    fn settings(&mut self) -> &mut PlotSettingsFields {
        &mut self.settings
    }
}

impl PlotSettingsRecord for Layout {
    fn settings(&mut self) -> &mut PlotSettingsFields {
        &mut self.settings
    }
}

macro_rules! plot {
    ($field:ident = $read:ident) => {
        |record, cx| {
            record.settings().$field = Some(cx.$read()?);
            Ok(())
        }
    };
}

fn plot_settings<R: PlotSettingsRecord>(fields: SpecBuilder<R>) -> SpecBuilder<R> {
    fields
        .field(100, subclass)
        .field(1, plot!(page_setup_name = text))
        .field(2, plot!(config_name = text))
        .field(4, plot!(paper_size = text))
        .field(6, plot!(plot_view_name = text))
        .field(40, plot!(margin_left = float))
        .field(41, plot!(margin_bottom = float))
        .field(42, plot!(margin_right = float))
        .field(43, plot!(margin_top = float))
        .field(44, plot!(paper_width = float))
        .field(45, plot!(paper_height = float))
        .field(46, plot!(plot_origin_x = float))
        .field(47, plot!(plot_origin_y = float))
        .field(48, plot!(window_area_x_min = float))
        .field(49, plot!(window_area_x_max = float))
        .field(140, plot!(window_area_y_min = float))
        .field(141, plot!(window_area_y_max = float))
        .field(142, plot!(print_scale_nominator = float))
        .field(143, plot!(print_scale_denominator = float))
        .field(70, plot!(layout_flag = int))
        .field(72, plot!(paper_unit = int))
        .field(73, plot!(plot_rotation = int))
        .field(74, plot!(plot_type = int))
        .field(7, plot!(current_style_sheet = text))
        .field(75, plot!(standard_scale_type = int))
        .field(76, plot!(shade_plot_mode = int))
        .field(77, plot!(shade_plot_resolution = int))
        .field(78, plot!(shade_plot_custom_dpi = int))
        .field(147, plot!(scale_factor = float))
        .field(148, plot!(image_origin_x = float))
        .field(149, plot!(image_origin_y = float))
        .field(333, plot!(shade_plot_id = text))
}

spec_record!(PlotSettings => || {
    RecordSpec::<PlotSettings>::builder("PLOTSETTINGS")
        .with(owned_common)
        .with(plot_settings)
        .build()
});

spec_record!(Layout => || {
    RecordSpec::<Layout>::builder("LAYOUT")
        .with(owned_common)
        .with(plot_settings)
        .field(100, subclass)
        .field(1, store!(layout_name = Some(text)))
        .field(70, store!(control_flag = Some(int)))
        .field(71, store!(tab_order = Some(int)))
        .field(10, store!(min_limit = Some(point)))
        .field(11, store!(max_limit = Some(point)))
        .field(12, store!(insertion_base = Some(point)))
        .field(14, store!(min_extent = Some(point)))
        .field(15, store!(max_extent = Some(point)))
        .field(146, store!(elevation = Some(float)))
        .field(13, store!(ucs_origin = Some(point)))
        .field(16, store!(ucs_x_axis = Some(point)))
        .field(17, store!(ucs_y_axis = Some(point)))
        .field(76, store!(orthographic_type = Some(int)))
        .field(330, store!(paper_space_table_id = Some(text)))
        .field(331, store!(viewport_id = Some(text)))
        .field(345, store!(named_ucs_id = Some(text)))
        .field(346, store!(orthographic_ucs_id = Some(text)))
        .field(333, store!(layout_shade_plot_id = Some(text)))
        .build()
});

/// 解析 OBJECTS 段并建立对象图。
///
/// 没有消费任何字段的记录被丢弃；不支持的对象类型记录诊断后跳过。
pub fn parse_objects(reader: &mut GroupReader<'_>) -> Result<ObjectGraph> {
    let mut records = Vec::new();
    loop {
        let token = reader.next()?;
        if token.is_eof() {
            reader.rewind(1);
            break;
        }
        let Some(name) = token.record_name() else {
            continue;
        };
        if name == "ENDSEC" {
            break;
        }

        match OBJECT_REGISTRY.parse(name, reader) {
            Some(parsed) => {
                let parsed = parsed?;
                if parsed.consumed {
                    records.push(parsed.record);
                }
            }
            None => {
                reader.diagnose(DiagnosticKind::UnsupportedObject {
                    name: name.to_string(),
                });
                reader.skip_to_next_record()?;
            }
        }
    }
    Ok(ObjectGraph::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxfkit_core::{ObjectId, Point3D};

    const OBJECTS: &str = concat!(
        "0\nDICTIONARY\n5\nC\n330\n0\n100\nAcDbDictionary\n281\n1\n",
        "3\nACAD_GROUP\n350\nD\n3\nACAD_LAYOUT\n350\n1A\n",
        "0\nDICTIONARY\n5\n1A\n102\n{ACAD_REACTORS\n330\nC\n102\n}\n330\nC\n100\nAcDbDictionary\n281\n1\n",
        "3\nLayout1\n350\n1E\n3\nModel\n350\n22\n",
        "0\nLAYOUT\n5\n22\n102\n{ACAD_REACTORS\n330\n1A\n102\n}\n330\n1A\n",
        "100\nAcDbPlotSettings\n1\n\n2\nnone_device\n4\nA4\n6\n\n40\n7.5\n41\n20\n42\n7.5\n43\n20\n",
        "44\n210\n45\n297\n46\n0\n47\n0\n48\n0\n49\n0\n140\n0\n141\n0\n142\n1\n143\n1\n",
        "70\n1712\n72\n1\n73\n0\n74\n0\n7\n\n75\n0\n147\n1\n76\n0\n77\n2\n78\n300\n148\n0\n149\n0\n",
        "100\nAcDbLayout\n1\nModel\n70\n1\n71\n0\n10\n0\n20\n0\n11\n420\n21\n297\n",
        "12\n0\n22\n0\n32\n0\n14\n0\n24\n0\n34\n0\n15\n100\n25\n100\n35\n0\n146\n0\n",
        "13\n0\n23\n0\n33\n0\n16\n1\n26\n0\n36\n0\n17\n0\n27\n1\n37\n0\n76\n0\n330\n1F\n",
        "0\nACDBPLACEHOLDER\n5\nF\n330\nC\n",
        "0\nDICTIONARY\n",
        "0\nENDSEC\n0\nEOF\n",
    );

    #[test]
    fn builds_resolved_object_graph() {
        let mut reader = GroupReader::new(OBJECTS);
        let graph = parse_objects(&mut reader).expect("解析 OBJECTS 失败");
        assert_eq!(graph.len(), 3, "空记录应被丢弃");
        assert_eq!(graph.root, Some(ObjectId(0)));
        assert_eq!(graph.lookup_path(&["ACAD_LAYOUT", "Model"]), Some(ObjectId(2)));

        let ObjectRecord::Layout(model) = &graph.objects[2] else {
            panic!("期望 LAYOUT 对象");
        };
        assert_eq!(model.layout_name.as_deref(), Some("Model"));
        assert_eq!(model.settings.page_setup_name.as_deref(), Some(""));
        assert_eq!(model.settings.paper_size.as_deref(), Some("A4"));
        assert_eq!(model.settings.layout_flag, Some(1712));
        assert_eq!(model.settings.shade_plot_custom_dpi, Some(300));
        assert_eq!(model.control_flag, Some(1));
        assert_eq!(model.max_limit, Some(Point3D::planar(420.0, 297.0)));
        assert_eq!(model.ucs_x_axis, Some(Point3D::new(1.0, 0.0, 0.0)));
        assert_eq!(model.paper_space_table_id.as_deref(), Some("1F"));
        assert_eq!(model.common.owner_dictionary_id_soft.as_deref(), Some("1A"));
        assert_eq!(model.common.owner_object_id.as_deref(), Some("1A"));
        assert_eq!(model.common.owner_dictionary_soft, Some(ObjectId(1)));
        assert_eq!(model.common.subclass_marker.as_deref(), Some("AcDbLayout"));

        let root = graph.root().and_then(ObjectRecord::as_dictionary).expect("根字典");
        assert_eq!(root.record_clone_flag, Some(1));
        assert_eq!(root.entries.len(), 2);
        assert_eq!(root.entry("ACAD_GROUP").and_then(|e| e.target), None);

        assert_eq!(
            reader.diagnostics()[0].kind,
            DiagnosticKind::UnsupportedObject {
                name: "ACDBPLACEHOLDER".to_string()
            }
        );
        assert!(reader.next().expect("应能读到下一组").is_eof());
    }

    #[test]
    fn hard_owned_dictionary_entries_use_360() {
        let mut reader = GroupReader::new(concat!(
            "0\nDICTIONARY\n5\nA\n330\n0\n100\nAcDbDictionary\n280\n1\n281\n1\n3\nITEM\n360\nB\n",
            "0\nENDSEC\n",
        ));
        let graph = parse_objects(&mut reader).expect("解析 OBJECTS 失败");
        let dictionary = graph.objects[0].as_dictionary().expect("字典");
        assert!(dictionary.is_hard_owned);
        assert_eq!(dictionary.entries[0].object_id.as_deref(), Some("B"));
        assert_eq!(dictionary.common.owner_dictionary_id_hard, None);
    }
}

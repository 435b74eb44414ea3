use std::collections::BTreeMap;

use dxfkit_core::table::{
    BlockRecordEntry, DimStyleEntry, LayerEntry, LineTypeElement, LineTypeEntry, TableRecord,
    TextStyleEntry, ViewportEntry, DIM_STYLE_VARIABLES, dim_variable_by_code,
};
use dxfkit_core::{Table, TableEntry};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::reader::{DiagnosticKind, GroupReader};
use crate::registry::RecordRegistry;
use crate::spec::{append, spec_record, store, FieldContext, RecordSpec, SpecBuilder, SpecRecord};

/// 受支持的表项类型。
pub static TABLE_REGISTRY: Lazy<RecordRegistry<TableEntry>> = Lazy::new(|| {
    let mut registry = RecordRegistry::new();
    registry.register_record::<BlockRecordEntry>();
    registry.register_record::<DimStyleEntry>();
    registry.register_record::<LayerEntry>();
    registry.register_record::<LineTypeEntry>();
    registry.register_record::<TextStyleEntry>();
    registry.register_record::<ViewportEntry>();
    registry
});

spec_record!(Table => || {
    RecordSpec::<Table>::builder("TABLE")
        .field(2, store!(name = text))
        .field(5, store!(handle = Some(text)))
        .multiple(102, |_, cx| cx.skip_application_group())
        .ignore_multiple(360)
        .field(330, store!(owner_object_id = Some(text)))
        .multiple(100, store!(subclass_marker = Some(text)))
        .field(70, store!(max_number_of_entries = Some(int)))
        .ignore_multiple([71, 340])
        .build()
});

fn owner_and_marker<R: TableRecord + 'static>(fields: SpecBuilder<R>) -> SpecBuilder<R> {
    fields
        .multiple(102, |_, cx| cx.skip_application_group())
        .field(330, |r, cx| {
            r.common_mut().owner_object_id = Some(cx.text()?);
            Ok(())
        })
        .field(100, subclass)
}

/// 表项公共字段：句柄、应用组、所有者与子类标记。
fn table_common<R: TableRecord + 'static>(fields: SpecBuilder<R>) -> SpecBuilder<R> {
    fields
        .field(5, |r, cx| {
            r.common_mut().handle = Some(cx.text()?);
            Ok(())
        })
        .with(owner_and_marker)
}

fn subclass<R: TableRecord>(record: &mut R, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    record.common_mut().subclass_marker = Some(cx.text()?);
    Ok(())
}

spec_record!(LayerEntry => || {
    RecordSpec::<LayerEntry>::builder("LAYER")
        .with(table_common)
        .field(100, subclass)
        .field(2, store!(name = text))
        .field(70, store!(standard_flag = int))
        .field(62, store!(color_index = Some(int)))
        .field(6, store!(line_type = Some(text)))
        .field(290, store!(is_plotting = Some(flag)))
        .field(370, store!(lineweight = Some(int)))
        .field(390, store!(plot_style_name_object_id = Some(text)))
        .field(347, store!(material_object_id = Some(text)))
        .ignore_multiple(348)
        .build()
});

spec_record!(LineTypeElement => || {
    RecordSpec::<LineTypeElement>::builder("LTYPE_ELEMENT")
        .field(49, store!(element_length = float))
        .field(74, store!(element_type_flag = int))
        .field(75, store!(shape_number = Some(int)))
        .field(340, store!(style_object_id = Some(text)))
        .field(46, store!(scale = Some(float)))
        .field(50, store!(rotation = Some(float)))
        .field(44, store!(offset_x = Some(float)))
        .field(45, store!(offset_y = Some(float)))
        .field(9, store!(text = Some(text)))
        .build()
});

spec_record!(LineTypeEntry => || {
    RecordSpec::<LineTypeEntry>::builder("LTYPE")
        .with(table_common)
        .field(100, subclass)
        .field(2, store!(name = text))
        .field(70, store!(standard_flag = int))
        .field(3, store!(description = Some(text)))
        .ignore(72)
        .field(73, store!(number_of_line_types = Some(int)))
        .field(40, store!(total_pattern_length = Some(float)))
        .multiple(49, |r, cx| {
            let element = cx.parse_nested::<LineTypeElement>()?;
            r.pattern.push(element);
            Ok(())
        })
        .build()
});

// 扩展字体名写在 ACAD 扩展数据里（1001 之后的 1000）。
spec_record!(TextStyleEntry => || {
    RecordSpec::<TextStyleEntry>::builder("STYLE")
        .with(table_common)
        .field(100, subclass)
        .field(2, store!(name = text))
        .field(70, store!(standard_flag = int))
        .field(40, store!(fixed_text_height = Some(float)))
        .field(41, store!(width_factor = Some(float)))
        .field(50, store!(oblique_angle = Some(float)))
        .field(71, store!(text_generation_flag = Some(int)))
        .field(42, store!(last_height = Some(float)))
        .field(3, store!(font = Some(text)))
        .field(4, store!(big_font = Some(text)))
        .ignore(1001)
        .field(1000, store!(extended_font = Some(text)))
        .build()
});

spec_record!(ViewportEntry => || {
    RecordSpec::<ViewportEntry>::builder("VPORT")
        .with(table_common)
        .field(100, subclass)
        .field(2, store!(name = text))
        .field(70, store!(standard_flag = int))
        .field(10, store!(lower_left_corner = Some(point)))
        .field(11, store!(upper_right_corner = Some(point)))
        .field(12, store!(center = Some(point)))
        .field(13, store!(snap_base_point = Some(point)))
        .field(14, store!(snap_spacing = Some(point)))
        .field(15, store!(grid_spacing = Some(point)))
        .field(16, store!(view_direction_from_target = Some(point)))
        .field(17, store!(view_target = Some(point)))
        .field(42, store!(lens_length = Some(float)))
        .field(43, store!(front_clipping_plane = Some(float)))
        .field(44, store!(back_clipping_plane = Some(float)))
        .field(45, store!(view_height = Some(float)))
        .field(50, store!(snap_rotation_angle = Some(float)))
        .field(51, store!(view_twist_angle = Some(float)))
        .field(40, store!(view_height = Some(float)))
        .field(41, store!(aspect_ratio = Some(float)))
        .field(72, store!(circle_sides = Some(int)))
        .multiple([331, 441], append!(frozen_layers = text))
        .field(1, store!(style_sheet = Some(text)))
        .field(281, store!(render_mode = Some(int)))
        .field(71, store!(view_mode = Some(int)))
        .field(74, store!(ucs_icon_setting = Some(int)))
        .field(110, store!(ucs_origin = Some(point)))
        .field(111, store!(ucs_x_axis = Some(point)))
        .field(112, store!(ucs_y_axis = Some(point)))
        .field(79, store!(orthographic_type = Some(int)))
        .field(146, store!(elevation = Some(float)))
        .field(170, store!(shade_plot_setting = Some(int)))
        .field(61, store!(major_grid_lines = Some(int)))
        .field(332, store!(background_object_id = Some(text)))
        .field(333, store!(shade_plot_object_id = Some(text)))
        .field(348, store!(visual_style_object_id = Some(text)))
        .field(292, store!(is_default_lighting_on = Some(flag)))
        .field(282, store!(default_lighting_type = Some(int)))
        .field(141, store!(brightness = Some(float)))
        .field(142, store!(contrast = Some(float)))
        .field([63, 421], store!(ambient_color = Some(int)))
        .field(431, store!(ambient_color_name = Some(text)))
        .ignore_multiple([60, 65, 73, 75, 76, 77, 78, 345, 346])
        .build()
});

/// 标注变量按组码查表，以 DIMxxx 名称保存原始值。
fn dim_variable(style: &mut DimStyleEntry, cx: &mut FieldContext<'_, '_>) -> Result<()> {
    if let Some(variable) = dim_variable_by_code(cx.code()) {
        style
            .variables
            .insert(variable.name.to_string(), cx.value().clone());
    }
    Ok(())
}

// DIMSTYLE 的句柄使用组码 105，组码 5 属于 DIMBLK_OBSOLETE。
spec_record!(DimStyleEntry => || {
    let variable_codes: Vec<i32> = DIM_STYLE_VARIABLES.iter().map(|variable| variable.code).collect();
    RecordSpec::<DimStyleEntry>::builder("DIMSTYLE")
        .with(owner_and_marker)
        .field(105, |r, cx| {
            r.common.handle = Some(cx.text()?);
            Ok(())
        })
        .field(100, subclass)
        .field(2, store!(name = text))
        .field(70, store!(standard_flag = int))
        .field(variable_codes, dim_variable)
        .build()
});

spec_record!(BlockRecordEntry => || {
    RecordSpec::<BlockRecordEntry>::builder("BLOCK_RECORD")
        .with(table_common)
        .field(100, subclass)
        .field(2, store!(name = text))
        .field(340, store!(layout_objects = Some(text)))
        .field(70, store!(insertion_units = Some(int)))
        .field(280, store!(explodability = Some(int)))
        .field(281, store!(scalability = Some(int)))
        .multiple(310, append!(bmp_preview = text))
        .build()
});

/// 解析 TABLES 段。表项追加到与其类型同名的表中，缺少表头时自动建表。
pub fn parse_tables(reader: &mut GroupReader<'_>) -> Result<BTreeMap<String, Table>> {
    let mut tables: BTreeMap<String, Table> = BTreeMap::new();
    loop {
        let token = reader.next()?;
        if token.is_eof() {
            reader.rewind(1);
            break;
        }
        let Some(name) = token.record_name() else {
            continue;
        };

        match name {
            "ENDSEC" => break,
            "ENDTAB" => {}
            "TABLE" => {
                let (mut table, _) = Table::parse_from(reader)?;
                if let Some(existing) = tables.remove(&table.name) {
                    let mut entries = existing.entries;
                    entries.append(&mut table.entries);
                    table.entries = entries;
                }
                tables.insert(table.name.clone(), table);
            }
            entry_type => match TABLE_REGISTRY.parse(entry_type, reader) {
                Some(parsed) => {
                    let entry = parsed?.record;
                    tables
                        .entry(entry_type.to_string())
                        .or_insert_with(|| Table::named(entry_type))
                        .entries
                        .push(entry);
                }
                None => {
                    reader.diagnose(DiagnosticKind::UnsupportedTableEntry {
                        name: entry_type.to_string(),
                    });
                    reader.skip_to_next_record()?;
                }
            },
        }
    }
    Ok(tables)
}

use dxfkit_core::entity::SUPPORTED_ENTITY_TYPES;
use dxfkit_core::Entity;
use dxfkit_io::{Diagnostic, DiagnosticKind, DxfParser, ParseOptions, parse};

fn entities_file(body: &str) -> String {
    format!("0\nSECTION\n2\nENTITIES\n{body}0\nENDSEC\n0\nEOF\n")
}

#[test]
fn every_supported_type_parses_to_its_own_variant() {
    for name in SUPPORTED_ENTITY_TYPES {
        let text = entities_file(&format!("0\n{name}\n5\nA1\n8\nPROBE\n"));
        // INSERT 的块名为空，关闭裁剪以免产生缺失块诊断
        let options = ParseOptions {
            prune_unreferenced_blocks: false,
            ..ParseOptions::default()
        };
        let report = DxfParser::new(options)
            .parse_report(&text)
            .unwrap_or_else(|err| panic!("解析 {name} 失败: {err}"));
        assert_eq!(report.document.entities.len(), 1, "{name} 应产生一个实体");

        let entity = &report.document.entities[0];
        assert_eq!(entity.type_name(), *name);
        assert_eq!(entity.handle(), Some("A1"));
        assert_eq!(entity.common().layer_name(), "PROBE");
        assert!(report.diagnostics.is_empty(), "{name}: {:?}", report.diagnostics);
    }
}

#[test]
fn unsupported_types_are_skipped_with_one_diagnostic() {
    let text = entities_file(concat!(
        "0\nLINE\n8\n0\n10\n0\n20\n0\n11\n1\n21\n1\n",
        "0\nMLINE\n8\n0\n2\nSTANDARD\n72\n2\n10\n0\n20\n0\n30\n0\n",
        "0\nCIRCLE\n8\n0\n10\n0\n20\n0\n40\n1\n",
    ));
    let report = DxfParser::default().parse_report(&text).expect("解析失败");

    let names: Vec<_> = report.document.entities.iter().map(Entity::type_name).collect();
    assert_eq!(names, vec!["LINE", "CIRCLE"]);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::UnsupportedEntity {
            name: "MLINE".to_string()
        }
    );
    assert_eq!(report.diagnostics[0].line, 17);
}

#[test]
fn histogram_counts_each_type() {
    let text = entities_file(concat!(
        "0\nPOINT\n10\n0\n20\n0\n",
        "0\nPOINT\n10\n1\n20\n1\n",
        "0\nARC\n10\n0\n20\n0\n40\n1\n50\n0\n51\n90\n",
    ));
    let document = parse(&text).expect("解析失败");
    let histogram = document.entity_histogram();
    assert_eq!(histogram.get("POINT"), Some(&2));
    assert_eq!(histogram.get("ARC"), Some(&1));
}

#[test]
fn invalid_boolean_aborts_the_parse() {
    let bad_bool = entities_file("0\nLINE\n8\n0\n290\n2\n");
    let err = parse(&bad_bool).expect_err("290 只接受 0/1");
    assert_eq!(err.line(), Some(10));
}

#[test]
fn unparsable_numbers_keep_the_document() {
    let text = entities_file(concat!(
        "0\nCIRCLE\n8\n0\n40\nnan-ish\n",
        "0\nLINE\n8\n0\n62\nred\n10\n0\n20\n0\n11\n1\n21\n1\n",
    ));
    let report = DxfParser::default().parse_report(&text).expect("数值错误不应中断解析");

    let names: Vec<_> = report.document.entities.iter().map(Entity::type_name).collect();
    assert_eq!(names, vec!["CIRCLE", "LINE"]);
    let Entity::Circle(circle) = &report.document.entities[0] else {
        panic!("期望 CIRCLE 实体");
    };
    assert!(circle.radius.is_nan());

    let problems: Vec<_> = report
        .diagnostics
        .iter()
        .map(|d| (d.line, d.kind.clone()))
        .collect();
    assert_eq!(
        problems,
        vec![
            (
                9,
                DiagnosticKind::InvalidNumber {
                    code: 40,
                    raw: "nan-ish".to_string()
                }
            ),
            (
                15,
                DiagnosticKind::InvalidNumber {
                    code: 62,
                    raw: "red".to_string()
                }
            ),
        ]
    );
}

#[test]
fn unknown_group_code_is_reported_once() {
    let text = entities_file("0\nLINE\n8\n0\n1072\nzz\n");
    let report = DxfParser::default().parse_report(&text).expect("解析失败");
    assert_eq!(report.document.entities.len(), 1);
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic {
            line: 9,
            kind: DiagnosticKind::UnknownGroupCode { code: 1072 },
        }]
    );
}

use std::path::PathBuf;

use autodim_core::document::{Entity, Location};
use autodim_io::{DocumentLoader, DocumentSaver, IoError, PlanFacade};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

#[test]
fn load_two_bay_plan() {
    let loader = PlanFacade::new();
    let doc = loader.load(&fixture("two_bay_plan.json")).expect("读取平面图失败");

    assert_eq!(doc.grids().count(), 5);
    assert_eq!(doc.columns().count(), 2);
    assert_eq!(doc.dimensions().count(), 0);
    assert_eq!(doc.next_entity_id(), 7);
    assert!(doc.layer("S-COLS").is_some_and(|layer| layer.is_visible));

    let (_, column) = doc.columns().next().expect("未找到柱");
    assert_eq!(column.name, "C1");
    match column.location {
        Location::Point { point, rotation } => {
            assert!((point.x() - 0.3).abs() < 1e-9);
            assert!(point.y().abs() < 1e-9);
            assert_eq!(rotation, 0.0);
        }
        Location::Curve { .. } => panic!("期望点定位"),
    }
    let faces = &column.solids[0].faces;
    assert_eq!(faces.len(), 6);
    assert!(faces[..5].iter().all(|face| face.is_visible));
    assert!(!faces[5].is_visible);

    let ty = doc.dimension_types().next().expect("未找到尺寸类型");
    assert!((ty.text_size - 0.0082021).abs() < 1e-12);
}

#[test]
fn save_then_load_preserves_document() {
    let facade = PlanFacade::new();
    let doc = facade.load(&fixture("two_bay_plan.json")).expect("读取平面图失败");

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("saved.json");
    facade.save(&doc, &path).expect("保存失败");
    let reloaded = facade.load(&path).expect("重新读取失败");

    assert_eq!(reloaded.entities().count(), doc.entities().count());
    assert_eq!(reloaded.next_entity_id(), doc.next_entity_id());
    for ((id_a, a), (id_b, b)) in doc.entities().zip(reloaded.entities()) {
        assert_eq!(id_a, id_b);
        match (a, b) {
            (Entity::Grid(a), Entity::Grid(b)) => {
                assert_eq!(a.name, b.name);
                assert_eq!(a.line, b.line);
            }
            (Entity::Column(a), Entity::Column(b)) => {
                assert_eq!(a.location, b.location);
                assert_eq!(a.solids[0].faces, b.solids[0].faces);
            }
            _ => panic!("实体类型不一致: {} / {}", id_a.get(), id_b.get()),
        }
    }
    assert_eq!(
        facade.to_json(&reloaded).expect("序列化失败"),
        facade.to_json(&doc).expect("序列化失败")
    );
}

#[test]
fn missing_file_reports_path() {
    let err = PlanFacade::new()
        .load(&fixture("does_not_exist.json"))
        .unwrap_err();
    match err {
        IoError::ReadError { path, .. } => assert!(path.ends_with("does_not_exist.json")),
        other => panic!("意外的错误: {other}"),
    }
}

#[test]
fn unknown_active_view_is_rejected() {
    let data = std::fs::read_to_string(fixture("two_bay_plan.json")).expect("读取夹具失败");
    let broken = data.replace("\"active_view\": 0", "\"active_view\": 9");
    let err = PlanFacade::new().parse_str(&broken).unwrap_err();
    assert!(matches!(err, IoError::InvalidDocument(message) if message.contains("active view")));
}

use std::path::PathBuf;

use autodim_config::{AppConfig, FailurePolicy, OutputMode};
use autodim_frontend::cli::{CliOptions, run, run_loaded};
use autodim_frontend::errors::FrontendError;
use autodim_frontend::loader::{PlanSource, demo_session, load_session};
use autodim_io::{DocumentLoader, PlanFacade};

fn two_bay_plan() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../autodim-io/tests/data/two_bay_plan.json");
    path
}

#[test]
fn explicit_plan_is_loaded() {
    let loaded = load_session(Some(&two_bay_plan())).expect("加载平面图失败");
    assert!(matches!(loaded.source, PlanSource::File(_)));
    assert!(loaded.demo.is_none());
    assert_eq!(loaded.session.document().grids().count(), 5);
}

#[test]
fn missing_explicit_plan_is_an_error() {
    let err = load_session(Some(&PathBuf::from("no/such/plan.json"))).unwrap_err();
    assert!(matches!(err, FrontendError::Io(_)));
}

#[test]
fn dimensions_two_bay_plan_and_saves_output() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let output = dir.path().join("dimensioned.json");
    let options = CliOptions {
        plan: Some(two_bay_plan()),
        mode: Some(OutputMode::Json),
        output: Some(output.clone()),
        failure_policy: None,
    };

    let session = run(&options, &AppConfig::default()).expect("运行失败");
    let report = session.last_report().expect("缺少报告");
    assert_eq!(report.grid_dimensions, 2);
    assert_eq!(report.column_dimensions, 4);
    assert!(report.skipped.is_empty());

    let saved = PlanFacade::new().load(&output).expect("读取输出失败");
    assert_eq!(saved.dimensions().count(), 6);
    let ty = saved.dimension_types().next().expect("尺寸类型");
    assert!((ty.text_size - 0.00656168).abs() < 1e-12);

    // C1 位于 (0.3, 0)，+Y 面偏移后投影到轴网 A
    assert!(saved.dimensions().any(|(_, dim)| {
        (dim.line.start.x() - 1.94).abs() < 1e-9
            && (dim.line.start.y() - 0.5).abs() < 1e-9
            && (dim.line.end.x() - 1.94).abs() < 1e-9
            && dim.line.end.y().abs() < 1e-9
    }));
}

#[test]
fn demo_run_with_isolate_policy() {
    let options = CliOptions {
        failure_policy: Some(FailurePolicy::Isolate),
        ..CliOptions::default()
    };
    let mut config = AppConfig::default();
    config.frontend.default_mode = OutputMode::Report;

    let session = run_loaded(demo_session(), &options, &config).expect("运行失败");
    let report = session.last_report().expect("缺少报告");
    assert_eq!(report.created.len(), 12);
    assert!(report.issues.is_empty());
    assert_eq!(session.document().dimensions().count(), 12);
}

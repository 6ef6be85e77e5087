use std::fmt::Write as _;
use std::path::PathBuf;

use autodim_config::{AppConfig, FailurePolicy, OutputMode};
use autodim_core::document::{Document, EntityId, Reference};
use autodim_core::geometry::Point3;
use autodim_engine::command::{CommandBus, CommandContext, CommandRequest};
use autodim_engine::pipeline::{DimensionReport, SkipReason};
use autodim_engine::session::Session;
use autodim_io::{DocumentSaver, PlanFacade};
use tracing::info;

use crate::errors::FrontendError;
use crate::loader::{LoadedSession, PlanSource, load_session};

/// 命令行选项，缺省项取自配置。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub plan: Option<PathBuf>,
    pub mode: Option<OutputMode>,
    pub output: Option<PathBuf>,
    pub failure_policy: Option<FailurePolicy>,
}

/// 加载平面图，执行 `auto_dimension`，按输出模式打印结果并按需保存。
pub fn run(options: &CliOptions, config: &AppConfig) -> Result<Session, FrontendError> {
    let loaded = load_session(options.plan.as_deref())?;
    run_loaded(loaded, options, config)
}

/// 对已加载的平面图执行标注；`options.plan` 在此被忽略。
pub fn run_loaded(
    loaded: LoadedSession,
    options: &CliOptions,
    config: &AppConfig,
) -> Result<Session, FrontendError> {
    let LoadedSession {
        mut session,
        source,
        demo,
    } = loaded;

    let bus = CommandBus::new();
    let mut context = CommandContext {
        session: &mut session,
        config: &config.dimensioning,
    };
    let mut request = CommandRequest::new("auto_dimension");
    if let Some(policy) = options.failure_policy {
        request = request.with_arg(policy_arg(policy));
    }
    let message = dispatch(&bus, &request, &mut context)?;

    let facade = PlanFacade::new();
    match options.mode.unwrap_or(config.frontend.default_mode) {
        OutputMode::Report => {
            let commands: Vec<&str> = bus.available_commands().copied().collect();
            println!("AutoDim 自动标注");
            println!("支持的命令: {}", commands.join(", "));
            match &source {
                PlanSource::File(path) => println!("平面图来源：{}", path.display()),
                PlanSource::Demo => {
                    if let Some(demo) = &demo {
                        println!(
                            "平面图来源：内置示例（轴网 {}，柱 {}）",
                            demo.grids.len(),
                            demo.columns.len()
                        );
                    }
                }
            }
            println!("[命令] {message}");
            if let Some(report) = session.last_report() {
                print!("{}", format_report(report, session.document()));
            }
        }
        OutputMode::Json => println!("{}", facade.to_json(session.document())?),
    }

    if let Some(path) = options.output.as_ref().or(config.frontend.output_path.as_ref()) {
        facade.save(session.document(), path)?;
        info!(path = %path.display(), "已保存标注后的平面图");
    }

    Ok(session)
}

fn dispatch(
    bus: &CommandBus,
    request: &CommandRequest,
    context: &mut CommandContext<'_>,
) -> Result<String, FrontendError> {
    let response = bus.dispatch(request, context);
    let message = response.message.unwrap_or_default();
    if response.success {
        Ok(message)
    } else {
        Err(FrontendError::Command(message))
    }
}

fn policy_arg(policy: FailurePolicy) -> &'static str {
    match policy {
        FailurePolicy::AbortAll => "abort_all",
        FailurePolicy::Isolate => "isolate",
    }
}

/// 生成文本报告：统计、跳过项、异常实体与每个新建尺寸的几何。
pub fn format_report(report: &DimensionReport, document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "轴网尺寸串：{}", report.grid_dimensions);
    let _ = writeln!(out, "柱尺寸：{}", report.column_dimensions);

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "跳过：");
        for skip in &report.skipped {
            let _ = writeln!(
                out,
                "  - 柱 {} ({}): {}",
                entity_label(document, skip.column),
                skip.orientation,
                skip_reason_label(skip.reason)
            );
        }
    }

    if !report.issues.is_empty() {
        let _ = writeln!(out, "异常实体：");
        for issue in &report.issues {
            let _ = writeln!(out, "  - #{}: {}", issue.entity.get(), issue.reason);
        }
    }

    if !report.unclassified_grids.is_empty() {
        let ids: Vec<String> = report
            .unclassified_grids
            .iter()
            .map(|id| entity_label(document, *id))
            .collect();
        let _ = writeln!(out, "未分类轴网：{}", ids.join(", "));
    }

    let _ = writeln!(out, "新建尺寸：");
    for id in &report.created {
        let Some((_, dimension)) = document.dimensions().find(|(dim_id, _)| dim_id == id) else {
            continue;
        };
        let references: Vec<String> = dimension.references.iter().map(Reference::to_string).collect();
        let _ = writeln!(
            out,
            "  - #{} 起点={} 终点={} 长度={:.3} 引用=[{}]",
            id.get(),
            format_point(dimension.line.start),
            format_point(dimension.line.end),
            dimension.line.length(),
            references.join(", ")
        );
    }
    out
}

fn skip_reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NoGridInRange => "搜索半径内没有轴网",
        SkipReason::NoPerpendicularFace => "没有垂直于轴网的面",
    }
}

fn entity_label(document: &Document, id: EntityId) -> String {
    let name = document
        .grids()
        .find(|(grid_id, _)| *grid_id == id)
        .map(|(_, grid)| grid.name.as_str())
        .or_else(|| {
            document
                .columns()
                .find(|(column_id, _)| *column_id == id)
                .map(|(_, column)| column.name.as_str())
        });
    match name {
        Some(name) => format!("{name} #{}", id.get()),
        None => format!("#{}", id.get()),
    }
}

fn format_point(point: Point3) -> String {
    format!("({:.3}, {:.3})", point.x(), point.y())
}

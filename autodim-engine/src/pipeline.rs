//! 自动标注流程：读取快照 → 规划尺寸 → 在单个事务内写入。

use autodim_config::{DimensioningConfig, FailurePolicy};
use autodim_core::document::{DimensionTypeId, EntityId, ViewId};
use tracing::{debug, info, warn};

use crate::builder::{column_dimension, grid_dimension};
use crate::classify::partition_grids;
use crate::errors::EngineError;
use crate::faces::select_face;
use crate::host::{AnnotationSink, GeometryOptions, PlanModel};
use crate::matcher::nearest_grid;
use crate::model::{ColumnFace, ColumnPlacement, DimensionSpec, GridLine, GridOrientation};
use crate::session::Session;

/// 事务名称，与宿主中的撤销记录一致。
pub const TRANSACTION_NAME: &str = "Create Dimensions";

const AXES: [GridOrientation; 2] = [GridOrientation::Horizontal, GridOrientation::Vertical];

#[derive(Debug, Clone)]
pub struct ColumnSnapshot {
    pub id: EntityId,
    pub placement: ColumnPlacement,
    pub faces: Vec<ColumnFace>,
}

/// `isolate` 策略下被跳过的异常实体。
#[derive(Debug, Clone)]
pub struct EntityIssue {
    pub entity: EntityId,
    pub reason: String,
}

/// 一次运行读取的全部几何。读取后不再访问宿主文档。
#[derive(Debug, Clone)]
pub struct PlanSnapshot {
    pub view: ViewId,
    pub grids: Vec<GridLine>,
    pub columns: Vec<ColumnSnapshot>,
    pub issues: Vec<EntityIssue>,
}

pub fn take_snapshot<M: PlanModel + ?Sized>(
    model: &M,
    config: &DimensioningConfig,
) -> Result<PlanSnapshot, EngineError> {
    let view = model.active_view();
    let options = GeometryOptions::for_view(view);
    let mut issues = Vec::new();

    let mut grids = Vec::new();
    for id in model.grid_ids() {
        if let Some(grid) = isolate(model.grid_line(id, &options), id, config, &mut issues)? {
            grids.push(grid);
        }
    }

    let mut columns = Vec::new();
    for id in model.column_ids() {
        let Some(placement) = isolate(model.column_placement(id), id, config, &mut issues)? else {
            continue;
        };
        let faces = model.column_faces(id, &options)?;
        columns.push(ColumnSnapshot {
            id,
            placement,
            faces,
        });
    }

    debug!(
        grids = grids.len(),
        columns = columns.len(),
        issues = issues.len(),
        "已读取平面图快照"
    );
    Ok(PlanSnapshot {
        view,
        grids,
        columns,
        issues,
    })
}

fn isolate<T>(
    result: Result<T, EngineError>,
    entity: EntityId,
    config: &DimensioningConfig,
    issues: &mut Vec<EntityIssue>,
) -> Result<Option<T>, EngineError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if config.failure_policy == FailurePolicy::Isolate && err.is_malformed_entity() => {
            warn!(entity = entity.get(), error = %err, "跳过异常实体");
            issues.push(EntityIssue {
                entity,
                reason: err.to_string(),
            });
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 搜索半径内没有该方向的轴网。
    NoGridInRange,
    /// 柱没有垂直于匹配轴网的面。
    NoPerpendicularFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip {
    pub column: EntityId,
    pub orientation: GridOrientation,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridDimension {
    pub orientation: GridOrientation,
    pub spec: DimensionSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDimension {
    pub column: EntityId,
    pub grid: EntityId,
    pub orientation: GridOrientation,
    pub face: usize,
    pub spec: DimensionSpec,
}

#[derive(Debug, Clone, Default)]
pub struct DimensionPlan {
    pub grid_dimensions: Vec<GridDimension>,
    pub column_dimensions: Vec<ColumnDimension>,
    pub skipped: Vec<Skip>,
    pub unclassified_grids: Vec<EntityId>,
}

impl DimensionPlan {
    /// 按写入顺序返回全部尺寸：先轴网尺寸串，再柱尺寸。
    pub fn specs(&self) -> impl Iterator<Item = &DimensionSpec> {
        self.grid_dimensions
            .iter()
            .map(|dim| &dim.spec)
            .chain(self.column_dimensions.iter().map(|dim| &dim.spec))
    }
}

/// 纯计算：根据快照生成全部尺寸，不修改任何文档。
pub fn plan_dimensions(
    snapshot: &PlanSnapshot,
    dimension_type: DimensionTypeId,
    config: &DimensioningConfig,
) -> Result<DimensionPlan, EngineError> {
    let groups = partition_grids(&snapshot.grids, config);
    let mut plan = DimensionPlan {
        unclassified_grids: groups.unclassified.iter().map(|grid| grid.id).collect(),
        ..DimensionPlan::default()
    };

    for orientation in AXES {
        let spec = grid_dimension(orientation, groups.group(orientation), dimension_type)?;
        plan.grid_dimensions.push(GridDimension { orientation, spec });
    }

    for column in &snapshot.columns {
        for orientation in AXES {
            let Some(grid) = nearest_grid(
                column.placement.point,
                orientation,
                groups.group(orientation),
                config.search_radius,
            ) else {
                debug!(column = column.id.get(), %orientation, "搜索半径内没有轴网");
                plan.skipped.push(Skip {
                    column: column.id,
                    orientation,
                    reason: SkipReason::NoGridInRange,
                });
                continue;
            };

            let Some(face) = select_face(
                &column.faces,
                grid.direction,
                column.placement.rotation,
                config.perpendicular_tolerance,
            ) else {
                debug!(column = column.id.get(), grid = grid.id.get(), "柱没有垂直于轴网的面");
                plan.skipped.push(Skip {
                    column: column.id,
                    orientation,
                    reason: SkipReason::NoPerpendicularFace,
                });
                continue;
            };

            let spec = column_dimension(
                &column.placement,
                &face,
                grid,
                dimension_type,
                config.annotation_offset,
            );
            plan.column_dimensions.push(ColumnDimension {
                column: column.id,
                grid: grid.id,
                orientation,
                face: face.index,
                spec,
            });
        }
    }

    Ok(plan)
}

/// 依次写入计划中的全部尺寸，遇到第一个失败即返回。
pub fn emit_plan<S: AnnotationSink + ?Sized>(
    sink: &mut S,
    view: ViewId,
    plan: &DimensionPlan,
) -> Result<Vec<EntityId>, EngineError> {
    plan.specs()
        .map(|spec| sink.create_dimension(view, spec).map_err(EngineError::from))
        .collect()
}

/// 一次成功运行的结果。
#[derive(Debug, Clone, Default)]
pub struct DimensionReport {
    pub grid_dimensions: usize,
    pub column_dimensions: usize,
    pub created: Vec<EntityId>,
    pub skipped: Vec<Skip>,
    pub issues: Vec<EntityIssue>,
    pub unclassified_grids: Vec<EntityId>,
}

/// 在会话文档上执行完整的自动标注。任何错误都会回滚事务，文档保持不变。
pub fn run_auto_dimension(
    session: &mut Session,
    config: &DimensioningConfig,
) -> Result<DimensionReport, EngineError> {
    let snapshot = take_snapshot(session.document(), config)?;
    let dimension_type = session
        .document()
        .first_dimension_type()
        .ok_or(EngineError::MissingDimensionType)?;
    let plan = plan_dimensions(&snapshot, dimension_type, config)?;

    let mut transaction = session.begin_transaction(TRANSACTION_NAME);
    transaction
        .document_mut()
        .set_text_size(dimension_type, config.text_size)?;
    let created = emit_plan(transaction.document_mut(), snapshot.view, &plan)?;
    transaction.commit();

    let report = DimensionReport {
        grid_dimensions: plan.grid_dimensions.len(),
        column_dimensions: plan.column_dimensions.len(),
        created,
        skipped: plan.skipped,
        issues: snapshot.issues,
        unclassified_grids: plan.unclassified_grids,
    };
    info!(
        grid_dimensions = report.grid_dimensions,
        column_dimensions = report.column_dimensions,
        skipped = report.skipped.len(),
        issues = report.issues.len(),
        "自动标注完成"
    );
    Ok(report)
}

//! 宿主文档的读写边界。
//!
//! 核心算法只通过 [`PlanModel`] 读取几何、通过 [`AnnotationSink`] 写入标注，
//! 内存文档 [`Document`] 是两者的默认实现。

use autodim_core::document::{
    Dimension, DimensionTypeId, Document, Entity, EntityId, Location, Reference, ReferenceTarget,
    ViewId,
};

use crate::errors::{AnnotationError, EngineError};
use crate::model::{ColumnFace, ColumnPlacement, DimensionSpec, GridLine};

/// 新建尺寸标注所在的图层。
pub const DIMENSION_LAYER: &str = "S-DIMS";

/// 长度不超过该值的尺寸线视为退化。
const SHORT_LINE_TOLERANCE: f64 = 1e-9;

/// 几何查询选项，对应宿主的 geometry options。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryOptions {
    pub view: ViewId,
    /// 为 `false` 时跳过标记为不可见的面。
    pub include_non_visible: bool,
}

impl GeometryOptions {
    #[inline]
    pub fn for_view(view: ViewId) -> Self {
        Self {
            view,
            include_non_visible: true,
        }
    }
}

/// 只读的平面图几何来源。
pub trait PlanModel {
    fn active_view(&self) -> ViewId;

    /// 当前视图中可见的轴网，按文档顺序。
    fn grid_ids(&self) -> Vec<EntityId>;

    /// 当前视图中可见的柱，按文档顺序。
    fn column_ids(&self) -> Vec<EntityId>;

    fn grid_line(&self, id: EntityId, options: &GeometryOptions) -> Result<GridLine, EngineError>;

    fn column_placement(&self, id: EntityId) -> Result<ColumnPlacement, EngineError>;

    /// 柱的第一个实体的全部平面面片，按枚举顺序。
    fn column_faces(
        &self,
        id: EntityId,
        options: &GeometryOptions,
    ) -> Result<Vec<ColumnFace>, EngineError>;
}

/// 尺寸标注的创建端。
pub trait AnnotationSink {
    fn first_dimension_type(&self) -> Option<DimensionTypeId>;

    fn set_text_size(&mut self, id: DimensionTypeId, size: f64) -> Result<(), AnnotationError>;

    fn create_dimension(
        &mut self,
        view: ViewId,
        spec: &DimensionSpec,
    ) -> Result<EntityId, AnnotationError>;
}

impl PlanModel for Document {
    #[inline]
    fn active_view(&self) -> ViewId {
        Document::active_view(self)
    }

    fn grid_ids(&self) -> Vec<EntityId> {
        self.entities()
            .filter(|(_, entity)| matches!(entity, Entity::Grid(_)) && self.is_entity_visible(entity))
            .map(|(id, _)| *id)
            .collect()
    }

    fn column_ids(&self) -> Vec<EntityId> {
        self.entities()
            .filter(|(_, entity)| {
                matches!(entity, Entity::Column(_)) && self.is_entity_visible(entity)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn grid_line(&self, id: EntityId, options: &GeometryOptions) -> Result<GridLine, EngineError> {
        check_view(self, options.view)?;
        let Some(Entity::Grid(grid)) = self.entity(id) else {
            return Err(EngineError::EntityNotFound(id.get()));
        };
        let curve = grid.line.ok_or(EngineError::GridWithoutLine(id.get()))?;
        Ok(GridLine {
            id,
            name: grid.name.clone(),
            origin: curve.origin,
            direction: curve.direction,
            reference: Reference::grid_line(id),
        })
    }

    fn column_placement(&self, id: EntityId) -> Result<ColumnPlacement, EngineError> {
        let Some(Entity::Column(column)) = self.entity(id) else {
            return Err(EngineError::EntityNotFound(id.get()));
        };
        match column.location {
            Location::Point { point, rotation } => Ok(ColumnPlacement { point, rotation }),
            Location::Curve { .. } => Err(EngineError::ColumnWithoutPointLocation(id.get())),
        }
    }

    fn column_faces(
        &self,
        id: EntityId,
        options: &GeometryOptions,
    ) -> Result<Vec<ColumnFace>, EngineError> {
        check_view(self, options.view)?;
        let Some(Entity::Column(column)) = self.entity(id) else {
            return Err(EngineError::EntityNotFound(id.get()));
        };
        let Some(solid) = column.solids.first() else {
            return Ok(Vec::new());
        };
        Ok(solid
            .faces
            .iter()
            .enumerate()
            .filter(|(_, face)| options.include_non_visible || face.is_visible)
            .map(|(index, face)| ColumnFace {
                index,
                normal: face.normal,
                origin: face.origin,
                reference: Reference::face(id, index),
            })
            .collect())
    }
}

impl AnnotationSink for Document {
    fn first_dimension_type(&self) -> Option<DimensionTypeId> {
        self.dimension_types()
            .next()
            .map(|_| DimensionTypeId::new(0))
    }

    fn set_text_size(&mut self, id: DimensionTypeId, size: f64) -> Result<(), AnnotationError> {
        let ty = self
            .dimension_type_mut(id)
            .ok_or(AnnotationError::UnknownDimensionType(id.index()))?;
        ty.text_size = size;
        Ok(())
    }

    fn create_dimension(
        &mut self,
        view: ViewId,
        spec: &DimensionSpec,
    ) -> Result<EntityId, AnnotationError> {
        if self.view(view).is_none() {
            return Err(AnnotationError::UnknownView(view.get()));
        }
        if self.dimension_type(spec.dimension_type).is_none() {
            return Err(AnnotationError::UnknownDimensionType(
                spec.dimension_type.index(),
            ));
        }
        if spec.references.len() < 2 {
            return Err(AnnotationError::TooFewReferences(spec.references.len()));
        }
        if let Some(stale) = spec
            .references
            .iter()
            .find(|reference| !resolves(self, reference))
        {
            return Err(AnnotationError::StaleReference(*stale));
        }
        if spec.line.is_degenerate(SHORT_LINE_TOLERANCE) {
            return Err(AnnotationError::DegenerateLine {
                length: spec.line.length(),
            });
        }

        Ok(self.add_entity(Entity::Dimension(Dimension {
            view,
            line: spec.line,
            references: spec.references.clone(),
            dimension_type: spec.dimension_type,
            layer: DIMENSION_LAYER.to_string(),
        })))
    }
}

fn check_view(document: &Document, view: ViewId) -> Result<(), EngineError> {
    match document.view(view) {
        Some(_) => Ok(()),
        None => Err(EngineError::ViewNotFound(view.get())),
    }
}

fn resolves(document: &Document, reference: &Reference) -> bool {
    match (document.entity(reference.element), reference.target) {
        (Some(Entity::Grid(grid)), ReferenceTarget::GridLine) => grid.line.is_some(),
        (Some(Entity::Column(column)), ReferenceTarget::Face { index }) => column
            .solids
            .first()
            .is_some_and(|solid| index < solid.faces.len()),
        _ => false,
    }
}

pub mod builder;
pub mod classify;
pub mod command;
pub mod faces;
pub mod host;
pub mod matcher;
pub mod model;
pub mod pipeline;

pub mod errors {
    use autodim_core::document::Reference;
    use thiserror::Error;

    use crate::model::GridOrientation;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("{orientation} grid group needs at least 2 grids, found {found}")]
        NotEnoughGrids {
            orientation: GridOrientation,
            found: usize,
        },
        #[error("document has no dimension type")]
        MissingDimensionType,
        #[error("column {0} has no point location")]
        ColumnWithoutPointLocation(u64),
        #[error("grid {0} has no line geometry in the view")]
        GridWithoutLine(u64),
        #[error("entity with id {0} not found")]
        EntityNotFound(u64),
        #[error("view {0} not found")]
        ViewNotFound(u64),
        #[error("annotation failed: {0}")]
        Annotation(#[from] AnnotationError),
    }

    impl EngineError {
        /// 单个实体的数据问题，`isolate` 策略下可以跳过。
        pub fn is_malformed_entity(&self) -> bool {
            matches!(
                self,
                EngineError::ColumnWithoutPointLocation(_)
                    | EngineError::GridWithoutLine(_)
                    | EngineError::EntityNotFound(_)
            )
        }
    }

    #[derive(Debug, Error)]
    pub enum AnnotationError {
        #[error("reference {0} is stale")]
        StaleReference(Reference),
        #[error("dimension line is degenerate (length {length})")]
        DegenerateLine { length: f64 },
        #[error("dimension needs at least 2 references, got {0}")]
        TooFewReferences(usize),
        #[error("view {0} does not exist")]
        UnknownView(u64),
        #[error("dimension type #{0} does not exist")]
        UnknownDimensionType(usize),
    }
}

pub mod session {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_6};

    use autodim_core::document::{DimensionTypeId, Document, EntityId, Location, Solid};
    use autodim_core::geometry::{Point2, Point3, Vector3};
    use tracing::{debug, warn};

    use crate::pipeline::DimensionReport;

    /// 引擎层持有的文档与运行时状态（最近一次标注结果）。
    #[derive(Debug, Default)]
    pub struct Session {
        document: Document,
        last_report: Option<DimensionReport>,
    }

    #[derive(Debug, Clone)]
    pub struct DemoPlan {
        pub grids: Vec<EntityId>,
        pub columns: Vec<EntityId>,
        pub dimension_type: DimensionTypeId,
    }

    impl Session {
        pub fn new() -> Self {
            Self::default()
        }

        /// 使用现有文档初始化会话。
        pub fn with_document(document: Document) -> Self {
            let mut session = Self::new();
            session.load_document(document);
            session
        }

        /// 替换当前文档并清空运行时状态。
        pub fn load_document(&mut self, document: Document) {
            self.document = document;
            self.last_report = None;
        }

        #[inline]
        pub fn document(&self) -> &Document {
            &self.document
        }

        #[inline]
        pub fn document_mut(&mut self) -> &mut Document {
            &mut self.document
        }

        #[inline]
        pub fn into_document(self) -> Document {
            self.document
        }

        #[inline]
        pub fn last_report(&self) -> Option<&DimensionReport> {
            self.last_report.as_ref()
        }

        pub fn record_report(&mut self, report: DimensionReport) {
            self.last_report = Some(report);
        }

        /// 开启事务。返回的守卫未提交即被丢弃时，文档恢复到开启前的状态。
        pub fn begin_transaction(&mut self, name: impl Into<String>) -> Transaction<'_> {
            let name = name.into();
            debug!(transaction = %name, "开启事务");
            Transaction {
                snapshot: Some(self.document.clone()),
                document: &mut self.document,
                name,
            }
        }

        /// 填充一组示例轴网与柱，供 CLI 演示和测试使用。
        pub fn populate_demo(&mut self) -> DemoPlan {
            let mut document = Document::new();
            let mut grids = Vec::new();
            for (name, y) in [("A", 0.0), ("B", 24.0), ("C", 48.0)] {
                grids.push(document.add_grid(
                    name,
                    Point3::new(-10.0, y, 0.0),
                    Vector3::BASIS_X,
                    "S-GRID",
                ));
            }
            for (name, x) in [("1", 0.0), ("2", 30.0), ("3", 60.0), ("4", 90.0)] {
                grids.push(document.add_grid(
                    name,
                    Point3::new(x, -10.0, 0.0),
                    Vector3::BASIS_Y,
                    "S-GRID",
                ));
            }

            let placements = [
                ("C1", 0.0, 0.0, 0.0),
                ("C2", 30.5, 0.0, 0.0),
                ("C3", 60.0, 1.0, FRAC_PI_2),
                ("C4", 0.0, 24.0, 0.0),
                ("C5", 30.0, 24.0, FRAC_PI_6),
                ("C6", 90.0, 48.0, 0.0),
            ];
            let columns = placements
                .into_iter()
                .map(|(name, x, y, rotation)| {
                    document.add_column(
                        name,
                        Location::Point {
                            point: Point2::new(x, y),
                            rotation,
                        },
                        vec![Solid::rectangular_prism(2.0, 1.5, 12.0)],
                        "S-COLS",
                    )
                })
                .collect();

            let dimension_type = document.add_dimension_type("Linear - 2.5mm Arial", 0.0082021);
            self.load_document(document);

            let demo = DemoPlan {
                grids,
                columns,
                dimension_type,
            };
            debug!(
                grids = demo.grids.len(),
                columns = demo.columns.len(),
                "已创建演示平面图"
            );
            demo
        }
    }

    /// 文档事务守卫。
    pub struct Transaction<'a> {
        document: &'a mut Document,
        snapshot: Option<Document>,
        name: String,
    }

    impl Transaction<'_> {
        #[inline]
        pub fn document(&self) -> &Document {
            self.document
        }

        #[inline]
        pub fn document_mut(&mut self) -> &mut Document {
            self.document
        }

        pub fn commit(mut self) {
            self.snapshot = None;
            debug!(transaction = %self.name, "事务已提交");
        }
    }

    impl Drop for Transaction<'_> {
        fn drop(&mut self) {
            if let Some(snapshot) = self.snapshot.take() {
                *self.document = snapshot;
                warn!(transaction = %self.name, "事务未提交，已回滚");
            }
        }
    }

}

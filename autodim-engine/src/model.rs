use std::fmt;

use autodim_config::DimensioningConfig;
use autodim_core::document::{DimensionTypeId, EntityId, Reference};
use autodim_core::geometry::{BoundedLine, Point2, Point3, UnboundedLine, Vector3};

use crate::classify::classify_direction;

/// 轴网方向分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridOrientation {
    /// 沿 X 方向延伸。
    Horizontal,
    /// 沿 Y 方向延伸。
    Vertical,
    /// 斜向轴网，不参与标注。
    Unclassified,
}

impl GridOrientation {
    /// 柱在该组轴网上参与比较的坐标：水平轴网取 Y，竖向轴网取 X。
    #[inline]
    pub fn column_coordinate(self, point: Point2) -> Option<f64> {
        match self {
            GridOrientation::Horizontal => Some(point.y()),
            GridOrientation::Vertical => Some(point.x()),
            GridOrientation::Unclassified => None,
        }
    }

    #[inline]
    pub fn grid_coordinate(self, origin: Point3) -> Option<f64> {
        match self {
            GridOrientation::Horizontal => Some(origin.y()),
            GridOrientation::Vertical => Some(origin.x()),
            GridOrientation::Unclassified => None,
        }
    }
}

impl fmt::Display for GridOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GridOrientation::Horizontal => "horizontal",
            GridOrientation::Vertical => "vertical",
            GridOrientation::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// 一次运行中读取到的轴网快照。方向分类按需计算，不单独保存。
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub id: EntityId,
    pub name: String,
    pub origin: Point3,
    pub direction: Vector3,
    pub reference: Reference,
}

impl GridLine {
    #[inline]
    pub fn orientation(&self, config: &DimensioningConfig) -> GridOrientation {
        classify_direction(self.direction, config)
    }

    #[inline]
    pub fn line(&self) -> UnboundedLine {
        UnboundedLine::new(self.origin, self.direction)
    }
}

/// 柱的点定位：平面位置与绕 Z 轴的旋转角（弧度）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnPlacement {
    pub point: Point2,
    pub rotation: f64,
}

/// 柱实体的平面面片，法向与原点均位于族局部坐标系。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnFace {
    /// 面在实体中的序号。
    pub index: usize,
    pub normal: Vector3,
    pub origin: Point3,
    pub reference: Reference,
}

/// 待创建的尺寸标注：放置线、有序的几何引用与尺寸类型。
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSpec {
    pub line: BoundedLine,
    pub references: Vec<Reference>,
    pub dimension_type: DimensionTypeId,
}

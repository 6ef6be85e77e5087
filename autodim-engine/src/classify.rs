use autodim_config::DimensioningConfig;
use autodim_core::geometry::Vector3;

use crate::model::{GridLine, GridOrientation};

/// 按方向向量分类轴网。向量不要求归一化，只比较分量绝对值。
///
/// 两个判定的容差不同（水平 `1e-6`、竖向 `1e-5`）。同时满足两者的方向按水平处理。
pub fn classify_direction(direction: Vector3, config: &DimensioningConfig) -> GridOrientation {
    if (direction.x().abs() - 1.0).abs() < config.horizontal_tolerance {
        GridOrientation::Horizontal
    } else if (direction.y().abs() - 1.0).abs() < config.vertical_tolerance {
        GridOrientation::Vertical
    } else {
        GridOrientation::Unclassified
    }
}

/// 按方向分组后的轴网，组内保持输入顺序。
#[derive(Debug, Default)]
pub struct GridGroups<'a> {
    pub horizontal: Vec<&'a GridLine>,
    pub vertical: Vec<&'a GridLine>,
    pub unclassified: Vec<&'a GridLine>,
}

impl<'a> GridGroups<'a> {
    #[inline]
    pub fn group(&self, orientation: GridOrientation) -> &[&'a GridLine] {
        match orientation {
            GridOrientation::Horizontal => &self.horizontal,
            GridOrientation::Vertical => &self.vertical,
            GridOrientation::Unclassified => &self.unclassified,
        }
    }
}

pub fn partition_grids<'a>(grids: &'a [GridLine], config: &DimensioningConfig) -> GridGroups<'a> {
    let mut groups = GridGroups::default();
    for grid in grids {
        match grid.orientation(config) {
            GridOrientation::Horizontal => groups.horizontal.push(grid),
            GridOrientation::Vertical => groups.vertical.push(grid),
            GridOrientation::Unclassified => groups.unclassified.push(grid),
        }
    }
    groups
}

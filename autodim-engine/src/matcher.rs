use autodim_core::geometry::Point2;

use crate::model::{GridLine, GridOrientation};

/// 在同方向轴网组中查找与柱距离最近的轴网。
///
/// 距离只比较单一坐标（水平轴网取 Y，竖向轴网取 X）。距离必须严格小于
/// `search_radius` 才算匹配；距离相同时保留先出现的轴网。
pub fn nearest_grid<'a>(
    column: Point2,
    orientation: GridOrientation,
    candidates: &[&'a GridLine],
    search_radius: f64,
) -> Option<&'a GridLine> {
    let coordinate = orientation.column_coordinate(column)?;
    let mut min_distance = search_radius;
    let mut nearest = None;
    for &grid in candidates {
        let Some(grid_coordinate) = orientation.grid_coordinate(grid.origin) else {
            continue;
        };
        let distance = (grid_coordinate - coordinate).abs();
        if distance < min_distance {
            min_distance = distance;
            nearest = Some(grid);
        }
    }
    nearest
}

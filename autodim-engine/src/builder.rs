use autodim_core::document::DimensionTypeId;
use autodim_core::geometry::{BoundedLine, Vector3};

use crate::errors::EngineError;
use crate::faces::SelectedFace;
use crate::model::{ColumnPlacement, DimensionSpec, GridLine, GridOrientation};

/// 构造柱面到轴网的尺寸。
///
/// 起点为柱定位点加上旋转后的面原点，再按面法向符号偏移 `offset`：
/// 水平轴网沿 X 偏移 `offset * n.y`，竖向轴网沿 Y 偏移 `-offset * n.x`。
/// 终点是起点在轴网直线上的正交投影。所有点的 Z 坐标置零。
pub fn column_dimension(
    placement: &ColumnPlacement,
    face: &SelectedFace,
    grid: &GridLine,
    dimension_type: DimensionTypeId,
    offset: f64,
) -> DimensionSpec {
    let direction = grid.direction;
    let gap = Vector3::new(
        offset * direction.x().abs() * face.normal.y(),
        -offset * direction.y().abs() * face.normal.x(),
        0.0,
    );
    let start = placement
        .point
        .to_plan_point()
        .translate(Vector3(face.origin.as_vec3()))
        .translate(gap)
        .flatten();
    let end = grid.line().project(start).flatten();

    DimensionSpec {
        line: BoundedLine::new(start, end),
        references: vec![face.reference, grid.reference],
        dimension_type,
    }
}

/// 构造同方向轴网之间的尺寸串。
///
/// 引用包含组内全部轴网，放置线只连接前两条轴网的原点；组内超过两条且
/// 不共线时，尺寸串的长度与见证线覆盖范围不一致。
pub fn grid_dimension(
    orientation: GridOrientation,
    group: &[&GridLine],
    dimension_type: DimensionTypeId,
) -> Result<DimensionSpec, EngineError> {
    let [first, second, ..] = group else {
        return Err(EngineError::NotEnoughGrids {
            orientation,
            found: group.len(),
        });
    };

    Ok(DimensionSpec {
        line: BoundedLine::new(first.origin, second.origin),
        references: group.iter().map(|grid| grid.reference).collect(),
        dimension_type,
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use autodim_core::document::{EntityId, Reference};
    use autodim_core::geometry::{Point2, Point3};

    use super::*;
    use crate::faces::select_face;
    use crate::model::ColumnFace;

    const OFFSET: f64 = 1.64;

    fn grid(id: u64, origin: Point3, direction: Vector3) -> GridLine {
        let id = EntityId::new(id);
        GridLine {
            id,
            name: format!("G{}", id.get()),
            origin,
            direction,
            reference: Reference::grid_line(id),
        }
    }

    fn face(column: EntityId, index: usize, normal: Vector3, origin: Point3) -> ColumnFace {
        ColumnFace {
            index,
            normal,
            origin,
            reference: Reference::face(column, index),
        }
    }

    fn dimension_type() -> DimensionTypeId {
        DimensionTypeId::new(0)
    }

    fn assert_point(actual: Point3, x: f64, y: f64) {
        assert!(
            (actual.x() - x).abs() < 1e-9 && (actual.y() - y).abs() < 1e-9,
            "expected ({x}, {y}), got ({}, {})",
            actual.x(),
            actual.y()
        );
        assert_eq!(actual.z(), 0.0);
    }

    #[test]
    fn horizontal_grid_dimension_from_y_face() {
        let column = EntityId::new(10);
        let placement = ColumnPlacement {
            point: Point2::new(5.0, 4.0),
            rotation: 0.0,
        };
        let faces = [face(column, 3, Vector3::BASIS_Y, Point3::new(0.0, 0.5, 2.0))];
        let grid = grid(1, Point3::new(-20.0, 0.0, 0.0), Vector3::BASIS_X);
        let selected = select_face(&faces, grid.direction, placement.rotation, 1e-6).expect("face");

        let spec = column_dimension(&placement, &selected, &grid, dimension_type(), OFFSET);
        assert_point(spec.line.start, 5.0 + OFFSET, 4.5);
        assert_point(spec.line.end, 5.0 + OFFSET, 0.0);
        assert_eq!(
            spec.references,
            vec![Reference::face(column, 3), Reference::grid_line(grid.id)]
        );
    }

    #[test]
    fn vertical_grid_dimension_from_x_face() {
        let column = EntityId::new(10);
        let placement = ColumnPlacement {
            point: Point2::new(5.0, 4.0),
            rotation: 0.0,
        };
        let faces = [face(column, 2, Vector3::BASIS_X, Point3::new(0.5, 0.0, 0.0))];
        let grid = grid(2, Point3::new(0.0, -20.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let selected = select_face(&faces, grid.direction, placement.rotation, 1e-6).expect("face");

        let spec = column_dimension(&placement, &selected, &grid, dimension_type(), OFFSET);
        assert_point(spec.line.start, 5.5, 4.0 - OFFSET);
        assert_point(spec.line.end, 0.0, 4.0 - OFFSET);
    }

    #[test]
    fn negative_facing_normal_flips_the_offset() {
        let column = EntityId::new(10);
        let placement = ColumnPlacement {
            point: Point2::new(0.0, 3.0),
            rotation: 0.0,
        };
        let faces = [face(
            column,
            5,
            Vector3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, -0.5, 0.0),
        )];
        let grid = grid(1, Point3::new(0.0, 0.0, 0.0), Vector3::BASIS_X);
        let selected = select_face(&faces, grid.direction, 0.0, 1e-6).expect("face");
        let spec = column_dimension(&placement, &selected, &grid, dimension_type(), OFFSET);
        assert_point(spec.line.start, -OFFSET, 2.5);
        assert_point(spec.line.end, -OFFSET, 0.0);
    }

    #[test]
    fn rotated_column_matches_pre_rotated_face() {
        let column = EntityId::new(10);
        let grid = grid(1, Point3::new(0.0, 0.0, 0.0), Vector3::BASIS_X);
        let point = Point2::new(12.0, 7.0);

        let rotated = ColumnPlacement {
            point,
            rotation: FRAC_PI_2,
        };
        let local = [face(column, 0, Vector3::BASIS_X, Point3::new(0.4, 0.0, 0.0))];
        let a = select_face(&local, grid.direction, rotated.rotation, 1e-6).expect("face");
        let spec_a = column_dimension(&rotated, &a, &grid, dimension_type(), OFFSET);

        let plain = ColumnPlacement {
            point,
            rotation: 0.0,
        };
        let pre_rotated = [face(column, 0, Vector3::BASIS_Y, Point3::new(0.0, 0.4, 0.0))];
        let b = select_face(&pre_rotated, grid.direction, plain.rotation, 1e-6).expect("face");
        let spec_b = column_dimension(&plain, &b, &grid, dimension_type(), OFFSET);

        assert!(spec_a.line.start.distance(spec_b.line.start) < 1e-9);
        assert!(spec_a.line.end.distance(spec_b.line.end) < 1e-9);
        assert!((spec_a.line.length() - 7.4).abs() < 1e-9);
        assert_eq!(spec_a.references, spec_b.references);
    }

    #[test]
    fn offset_magnitude_is_the_same_on_both_axes() {
        let column = EntityId::new(10);
        let placement = ColumnPlacement {
            point: Point2::new(0.0, 0.0),
            rotation: 0.0,
        };
        let faces = [
            face(column, 2, Vector3::BASIS_X, Point3::new(0.5, 0.0, 0.0)),
            face(column, 3, Vector3::BASIS_Y, Point3::new(0.0, 0.5, 0.0)),
        ];
        let horizontal = grid(1, Point3::new(0.0, -10.0, 0.0), Vector3::BASIS_X);
        let vertical = grid(2, Point3::new(-10.0, 0.0, 0.0), Vector3::BASIS_Y);

        let h_face = select_face(&faces, horizontal.direction, 0.0, 1e-6).expect("face");
        let v_face = select_face(&faces, vertical.direction, 0.0, 1e-6).expect("face");
        let h = column_dimension(&placement, &h_face, &horizontal, dimension_type(), OFFSET);
        let v = column_dimension(&placement, &v_face, &vertical, dimension_type(), OFFSET);

        assert!((h.line.start.x().abs() - OFFSET).abs() < 1e-9);
        assert!((v.line.start.y().abs() - OFFSET).abs() < 1e-9);
        assert!((h.line.length() - v.line.length()).abs() < 1e-9);
    }

    #[test]
    fn grid_dimension_spans_first_two_grids_with_all_witnesses() {
        let grids = [
            grid(0, Point3::new(0.0, 0.0, 0.0), Vector3::BASIS_Y),
            grid(1, Point3::new(20.0, 0.0, 0.0), Vector3::BASIS_Y),
            grid(2, Point3::new(40.0, 0.0, 0.0), Vector3::BASIS_Y),
        ];
        let group: Vec<&GridLine> = grids.iter().collect();
        let spec = grid_dimension(GridOrientation::Vertical, &group, dimension_type())
            .expect("grid dimension");
        assert_point(spec.line.start, 0.0, 0.0);
        assert_point(spec.line.end, 20.0, 0.0);
        assert_eq!(spec.references.len(), 3);
        assert_eq!(
            spec.references,
            grids.iter().map(|g| g.reference).collect::<Vec<_>>()
        );
    }

    #[test]
    fn grid_dimension_needs_two_grids() {
        let single = [grid(0, Point3::new(0.0, 0.0, 0.0), Vector3::BASIS_X)];
        let group: Vec<&GridLine> = single.iter().collect();
        let err = grid_dimension(GridOrientation::Horizontal, &group, dimension_type()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotEnoughGrids {
                orientation: GridOrientation::Horizontal,
                found: 1
            }
        ));
        assert!(matches!(
            grid_dimension(GridOrientation::Vertical, &[], dimension_type()),
            Err(EngineError::NotEnoughGrids { found: 0, .. })
        ));
    }
}

use autodim_core::document::Reference;
use autodim_core::geometry::{Point3, Vector3};

use crate::model::ColumnFace;

/// 被选中的柱面。法向与原点已按柱的旋转角转换，但原点尚未平移到柱定位点。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedFace {
    /// 面在实体中的序号。
    pub index: usize,
    pub normal: Vector3,
    pub origin: Point3,
    pub reference: Reference,
}

/// 面法向同时垂直于轴网方向与竖直轴时，才能作为垂直于轴网的尺寸起点。
#[inline]
pub fn is_dimensionable(normal: Vector3, grid_direction: Vector3, tolerance: f64) -> bool {
    normal.dot(grid_direction).abs() < tolerance && normal.dot(Vector3::BASIS_Z).abs() < tolerance
}

/// 按枚举顺序返回第一个满足条件的面。
///
/// 只取第一个：截面两侧都有合格面时，尺寸总是从枚举在前的一侧引出。
pub fn select_face(
    faces: &[ColumnFace],
    grid_direction: Vector3,
    rotation: f64,
    tolerance: f64,
) -> Option<SelectedFace> {
    faces.iter().find_map(|face| {
        let normal = face.normal.rotate_about_z(rotation);
        is_dimensionable(normal, grid_direction, tolerance).then(|| SelectedFace {
            index: face.index,
            normal,
            origin: face.origin.rotate_about_z(rotation),
            reference: face.reference,
        })
    })
}

pub mod geometry {
    use glam::{DVec2, DVec3};
    use serde::{Deserialize, Serialize};

    /// 平面点（柱定位点），内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        /// 提升为 Z=0 平面上的三维点。
        #[inline]
        pub fn to_plan_point(self) -> Point3 {
            Point3(self.0.extend(0.0))
        }
    }

    /// 三维点。轴网原点、柱面原点与标注端点都使用该类型。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }

        #[inline]
        pub fn translate(self, offset: Vector3) -> Self {
            Self(self.0 + offset.0)
        }

        /// 投影到平面视图（Z 置零）。
        #[inline]
        pub fn flatten(self) -> Self {
            Self(DVec3::new(self.0.x, self.0.y, 0.0))
        }

        /// 绕 Z 轴旋转（以原点为中心），Z 分量保持不变。
        #[inline]
        pub fn rotate_about_z(self, angle: f64) -> Self {
            Self(rotate_xy(self.0, angle))
        }

        #[inline]
        pub fn distance(self, other: Point3) -> f64 {
            self.0.distance(other.0)
        }
    }

    /// 三维向量，不要求单位长度。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector3(pub DVec3);

    impl Vector3 {
        pub const BASIS_X: Vector3 = Vector3(DVec3::X);
        pub const BASIS_Y: Vector3 = Vector3(DVec3::Y);
        pub const BASIS_Z: Vector3 = Vector3(DVec3::Z);

        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }

        #[inline]
        pub fn dot(self, other: Vector3) -> f64 {
            self.0.dot(other.0)
        }

        /// 绕 Z 轴旋转，对应族几何从局部坐标系到世界坐标系的平面旋转。
        #[inline]
        pub fn rotate_about_z(self, angle: f64) -> Self {
            Self(rotate_xy(self.0, angle))
        }
    }

    #[inline]
    fn rotate_xy(value: DVec3, angle: f64) -> DVec3 {
        DVec2::from_angle(angle)
            .rotate(value.truncate())
            .extend(value.z)
    }

    /// 无限长直线（轴网线）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct UnboundedLine {
        pub origin: Point3,
        pub direction: Vector3,
    }

    impl UnboundedLine {
        #[inline]
        pub fn new(origin: Point3, direction: Vector3) -> Self {
            Self { origin, direction }
        }

        /// 点到直线的正交投影。方向退化时返回原点。
        pub fn project(&self, point: Point3) -> Point3 {
            let dir = self.direction.as_vec3();
            let len_sq = dir.length_squared();
            if len_sq <= f64::EPSILON {
                return self.origin;
            }
            let t = (point.as_vec3() - self.origin.as_vec3()).dot(dir) / len_sq;
            Point3(self.origin.as_vec3() + dir * t)
        }
    }

    /// 有界线段，作为尺寸线的放置位置。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct BoundedLine {
        pub start: Point3,
        pub end: Point3,
    }

    impl BoundedLine {
        #[inline]
        pub fn new(start: Point3, end: Point3) -> Self {
            Self { start, end }
        }

        #[inline]
        pub fn length(&self) -> f64 {
            self.start.distance(self.end)
        }

        #[inline]
        pub fn is_degenerate(&self, tolerance: f64) -> bool {
            self.length() <= tolerance
        }
    }

}

pub mod document {
    use std::collections::BTreeMap;
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{BoundedLine, Point2, Point3, Vector3};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ViewId(u64);

    impl ViewId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// 尺寸标注类型在文档中的序号。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DimensionTypeId(usize);

    impl DimensionTypeId {
        #[inline]
        pub fn new(index: usize) -> Self {
            Self(index)
        }

        #[inline]
        pub fn index(self) -> usize {
            self.0
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
        pub is_visible: bool,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                is_visible: true,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct View {
        pub id: ViewId,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DimensionType {
        pub name: String,
        pub text_size: f64,
    }

    /// 几何引用所指向的子对象。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum ReferenceTarget {
        GridLine,
        Face { index: usize },
    }

    /// 不透明的几何引用，尺寸标注通过它与轴网线或柱面绑定。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Reference {
        pub element: EntityId,
        pub target: ReferenceTarget,
    }

    impl Reference {
        #[inline]
        pub fn grid_line(element: EntityId) -> Self {
            Self {
                element,
                target: ReferenceTarget::GridLine,
            }
        }

        #[inline]
        pub fn face(element: EntityId, index: usize) -> Self {
            Self {
                element,
                target: ReferenceTarget::Face { index },
            }
        }
    }

    impl fmt::Display for Reference {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self.target {
                ReferenceTarget::GridLine => write!(f, "{}:line", self.element.get()),
                ReferenceTarget::Face { index } => {
                    write!(f, "{}:face:{}", self.element.get(), index)
                }
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum Entity {
        Grid(Grid),
        Column(Column),
        Dimension(Dimension),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Grid(grid) => &grid.layer,
                Entity::Column(column) => &column.layer,
                Entity::Dimension(dimension) => &dimension.layer,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct GridCurve {
        pub origin: Point3,
        pub direction: Vector3,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Grid {
        pub name: String,
        /// 视图中的轴网线；为 `None` 时几何查询取不到直线。
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub line: Option<GridCurve>,
        pub layer: String,
    }

    /// 柱的定位方式。斜柱使用曲线定位，不参与自动标注。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Location {
        Point { point: Point2, rotation: f64 },
        Curve { start: Point3, end: Point3 },
    }

    /// 族局部坐标系下的平面面片。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct PlanarFace {
        pub normal: Vector3,
        pub origin: Point3,
        #[serde(default = "PlanarFace::default_visible")]
        pub is_visible: bool,
    }

    impl PlanarFace {
        #[inline]
        pub fn new(normal: Vector3, origin: Point3) -> Self {
            Self {
                normal,
                origin,
                is_visible: true,
            }
        }

        fn default_visible() -> bool {
            true
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Solid {
        pub faces: Vec<PlanarFace>,
    }

    impl Solid {
        /// 以定位点为中心的矩形截面柱体，面顺序为：顶、底、+X、+Y、-X、-Y。
        pub fn rectangular_prism(width: f64, depth: f64, height: f64) -> Self {
            let hw = width / 2.0;
            let hd = depth / 2.0;
            Self {
                faces: vec![
                    PlanarFace::new(Vector3::BASIS_Z, Point3::new(0.0, 0.0, height)),
                    PlanarFace::new(Vector3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 0.0)),
                    PlanarFace::new(Vector3::BASIS_X, Point3::new(hw, 0.0, 0.0)),
                    PlanarFace::new(Vector3::BASIS_Y, Point3::new(0.0, hd, 0.0)),
                    PlanarFace::new(Vector3::new(-1.0, 0.0, 0.0), Point3::new(-hw, 0.0, 0.0)),
                    PlanarFace::new(Vector3::new(0.0, -1.0, 0.0), Point3::new(0.0, -hd, 0.0)),
                ],
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Column {
        pub name: String,
        pub location: Location,
        #[serde(default)]
        pub solids: Vec<Solid>,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Dimension {
        pub view: ViewId,
        pub line: BoundedLine,
        pub references: Vec<Reference>,
        pub dimension_type: DimensionTypeId,
        pub layer: String,
    }

    /// 内存中的平面图文档：图层、视图、轴网、柱与已生成的尺寸标注。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Document {
        /// 按名称排序，序列化输出稳定。
        layers: BTreeMap<String, Layer>,
        entities: Vec<(EntityId, Entity)>,
        next_entity_id: u64,
        views: Vec<View>,
        active_view: ViewId,
        #[serde(default)]
        dimension_types: Vec<DimensionType>,
    }

    impl Default for Document {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self {
                layers: BTreeMap::new(),
                entities: Vec::new(),
                next_entity_id: 0,
                views: vec![View {
                    id: ViewId(0),
                    name: "Level 1".to_string(),
                }],
                active_view: ViewId(0),
                dimension_types: Vec::new(),
            };
            doc.ensure_layer("0");
            doc
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            self.layers
                .entry(key.to_string())
                .or_insert_with(|| Layer::new(key));
        }

        /// 设置图层可见性，返回图层是否存在。
        pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool {
            match self.layers.get_mut(name) {
                Some(layer) => {
                    layer.is_visible = visible;
                    true
                }
                None => false,
            }
        }

        #[inline]
        pub fn layer(&self, name: &str) -> Option<&Layer> {
            self.layers.get(name)
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.values()
        }

        /// 实体所在图层存在且可见时，视为在当前视图中可见。
        pub fn is_entity_visible(&self, entity: &Entity) -> bool {
            self.layers
                .get(entity.layer_name())
                .is_some_and(|layer| layer.is_visible)
        }

        pub fn add_view(&mut self, name: impl Into<String>) -> ViewId {
            let id = ViewId(self.views.iter().map(|v| v.id.0 + 1).max().unwrap_or(0));
            self.views.push(View {
                id,
                name: name.into(),
            });
            id
        }

        /// 切换当前视图，视图不存在时返回 `false`。
        pub fn set_active_view(&mut self, id: ViewId) -> bool {
            if self.view(id).is_some() {
                self.active_view = id;
                true
            } else {
                false
            }
        }

        #[inline]
        pub fn active_view(&self) -> ViewId {
            self.active_view
        }

        #[inline]
        pub fn view(&self, id: ViewId) -> Option<&View> {
            self.views.iter().find(|view| view.id == id)
        }

        #[inline]
        pub fn views(&self) -> impl Iterator<Item = &View> {
            self.views.iter()
        }

        pub fn add_dimension_type(&mut self, name: impl Into<String>, text_size: f64) -> DimensionTypeId {
            self.dimension_types.push(DimensionType {
                name: name.into(),
                text_size,
            });
            DimensionTypeId(self.dimension_types.len() - 1)
        }

        #[inline]
        pub fn dimension_type(&self, id: DimensionTypeId) -> Option<&DimensionType> {
            self.dimension_types.get(id.0)
        }

        #[inline]
        pub fn dimension_type_mut(&mut self, id: DimensionTypeId) -> Option<&mut DimensionType> {
            self.dimension_types.get_mut(id.0)
        }

        #[inline]
        pub fn dimension_types(&self) -> impl Iterator<Item = &DimensionType> {
            self.dimension_types.iter()
        }

        pub fn add_grid(
            &mut self,
            name: impl Into<String>,
            origin: Point3,
            direction: Vector3,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::Grid(Grid {
                name: name.into(),
                line: Some(GridCurve { origin, direction }),
                layer: layer.into(),
            }))
        }

        pub fn add_column(
            &mut self,
            name: impl Into<String>,
            location: Location,
            solids: Vec<Solid>,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::Column(Column {
                name: name.into(),
                location,
                solids,
                layer: layer.into(),
            }))
        }

        pub fn add_entity(&mut self, entity: Entity) -> EntityId {
            self.ensure_layer(entity.layer_name());
            let id = self.next_id();
            self.entities.push((id, entity));
            id
        }

        /// 删除实体，返回被删除的实体。
        pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
            let position = self.entities.iter().position(|(entity_id, _)| *entity_id == id)?;
            Some(self.entities.remove(position).1)
        }

        /// 删除全部尺寸标注，返回删除数量。
        pub fn remove_dimensions(&mut self) -> usize {
            let before = self.entities.len();
            self.entities
                .retain(|(_, entity)| !matches!(entity, Entity::Dimension(_)));
            before - self.entities.len()
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities
                .iter()
                .find_map(|(entity_id, entity)| (*entity_id == id).then_some(entity))
        }

        pub fn grids(&self) -> impl Iterator<Item = (EntityId, &Grid)> {
            self.entities.iter().filter_map(|(id, entity)| match entity {
                Entity::Grid(grid) => Some((*id, grid)),
                _ => None,
            })
        }

        pub fn columns(&self) -> impl Iterator<Item = (EntityId, &Column)> {
            self.entities.iter().filter_map(|(id, entity)| match entity {
                Entity::Column(column) => Some((*id, column)),
                _ => None,
            })
        }

        pub fn dimensions(&self) -> impl Iterator<Item = (EntityId, &Dimension)> {
            self.entities.iter().filter_map(|(id, entity)| match entity {
                Entity::Dimension(dimension) => Some((*id, dimension)),
                _ => None,
            })
        }

        /// 下一个待分配的实体 ID。
        #[inline]
        pub fn next_entity_id(&self) -> u64 {
            self.next_entity_id
        }

        #[inline]
        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

}

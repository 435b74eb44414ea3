use glam::DVec3;
use serde::{Deserialize, Serialize};

/// DXF 中的坐标点。
///
/// 源数据省略第三个坐标时 `z` 保持为 `None`；需要完整三维向量的字段
/// （拉伸方向、视口向量、UCS 轴等）由解析器按字段调用 [`Point3D::normalized`] 补零。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point3D {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    #[inline]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// 默认拉伸方向 (0, 0, 1)。
    #[inline]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn z_or_zero(self) -> f64 {
        self.z.unwrap_or(0.0)
    }

    #[inline]
    pub fn has_z(self) -> bool {
        self.z.is_some()
    }

    /// 返回补全 `z` 的副本。
    #[inline]
    pub fn normalized(self) -> Self {
        Self::new(self.x, self.y, self.z_or_zero())
    }

    #[inline]
    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z_or_zero())
    }
}

impl From<DVec3> for Point3D {
    fn from(value: DVec3) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

/// 轴对齐包围盒，用于统计实体锚点范围。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents3D {
    pub min: DVec3,
    pub max: DVec3,
}

impl Extents3D {
    pub fn from_point(point: Point3D) -> Self {
        let p = point.as_dvec3();
        Self { min: p, max: p }
    }

    pub fn include(&mut self, point: Point3D) {
        let p = point.as_dvec3();
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// 从一组点构建包围盒；空集合返回 `None`。
    pub fn from_points(points: impl IntoIterator<Item = Point3D>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut extents = Self::from_point(first);
        for point in iter {
            extents.include(point);
        }
        Some(extents)
    }
}

//! Plumb voxel-grid geometry
//!
//! A "plumb" volume is an orthogonal, axis-aligned voxel grid described by
//! dimensions, origin, and spacing. The grid math here is shared by the
//! header's coordinate lookups and by the per-map volume content.

/// Anatomical orientation of one grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    LeftToRight,
    RightToLeft,
    PosteriorToAnterior,
    AnteriorToPosterior,
    InferiorToSuperior,
    SuperiorToInferior,
}

/// Volume geometry as recorded in the header, valid only for plumb grids.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeAttributes {
    pub dimensions: [u64; 3],
    pub origin: [f32; 3],
    pub spacing: [f32; 3],
    pub orientation: [Orientation; 3],
}

/// Axis-aligned voxel grid with coordinate/index conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGrid {
    dimensions: [u64; 3],
    origin: [f32; 3],
    spacing: [f32; 3],
}

/// Geometry comparison tolerance for origin and spacing components.
const GEOMETRY_TOLERANCE: f32 = 1.0e-4;

impl VolumeGrid {
    pub fn from_attributes(attributes: &VolumeAttributes) -> Self {
        Self {
            dimensions: attributes.dimensions,
            origin: attributes.origin,
            spacing: attributes.spacing,
        }
    }

    pub fn dimensions(&self) -> [u64; 3] {
        self.dimensions
    }

    pub fn voxel_count(&self) -> usize {
        (self.dimensions[0] * self.dimensions[1] * self.dimensions[2]) as usize
    }

    /// Spatial coordinate of a voxel center.
    pub fn index_to_space(&self, ijk: [i64; 3]) -> [f32; 3] {
        [
            self.origin[0] + ijk[0] as f32 * self.spacing[0],
            self.origin[1] + ijk[1] as f32 * self.spacing[1],
            self.origin[2] + ijk[2] as f32 * self.spacing[2],
        ]
    }

    /// Voxel whose extent encloses the coordinate, without bounds checking.
    pub fn enclosing_voxel(&self, xyz: [f32; 3]) -> [i64; 3] {
        let mut ijk = [0i64; 3];
        for axis in 0..3 {
            ijk[axis] = ((xyz[axis] - self.origin[axis]) / self.spacing[axis]).round() as i64;
        }
        ijk
    }

    pub fn index_valid(&self, ijk: [i64; 3]) -> bool {
        (0..3).all(|axis| ijk[axis] >= 0 && (ijk[axis] as u64) < self.dimensions[axis])
    }

    /// Row-major linear offset of a voxel, `None` outside the grid.
    pub fn linear_index(&self, ijk: [i64; 3]) -> Option<usize> {
        if !self.index_valid(ijk) {
            return None;
        }
        let [ni, nj, _] = self.dimensions;
        Some((ijk[0] as u64 + ni * (ijk[1] as u64 + nj * ijk[2] as u64)) as usize)
    }

    /// Whether this grid already matches the requested geometry.
    ///
    /// Dimensions compare exactly; origin and spacing componentwise within
    /// 1e-4. A grid outside tolerance must be recreated.
    pub fn approximately_matches(&self, attributes: &VolumeAttributes) -> bool {
        if self.dimensions != attributes.dimensions {
            return false;
        }
        (0..3).all(|axis| {
            (self.origin[axis] - attributes.origin[axis]).abs() <= GEOMETRY_TOLERANCE
                && (self.spacing[axis] - attributes.spacing[axis]).abs() <= GEOMETRY_TOLERANCE
        })
    }
}

//! Per-map volumetric content
//!
//! Created lazily when a loaded row maps onto voxels, recreated only when
//! the requested grid geometry drifts outside tolerance. Holds one value
//! and one RGBA color per voxel.

use dconn_core::volume::VolumeGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeContent {
    grid: VolumeGrid,
    values: Vec<f32>,
    rgba: Vec<u8>,
}

impl VolumeContent {
    pub fn new(grid: VolumeGrid) -> Self {
        let voxel_count = grid.voxel_count();
        Self {
            grid,
            values: vec![0.0; voxel_count],
            rgba: vec![0; voxel_count * 4],
        }
    }

    pub fn grid(&self) -> &VolumeGrid {
        &self.grid
    }

    pub fn fill_values(&mut self, value: f32) {
        self.values.fill(value);
    }

    pub fn set_value(&mut self, ijk: [i64; 3], value: f32) -> bool {
        match self.grid.linear_index(ijk) {
            Some(index) => {
                self.values[index] = value;
                true
            }
            None => false,
        }
    }

    pub fn value(&self, ijk: [i64; 3]) -> Option<f32> {
        self.grid.linear_index(ijk).map(|index| self.values[index])
    }

    /// Voxel enclosing the coordinate, `None` outside the grid.
    pub fn enclosing_voxel(&self, xyz: [f32; 3]) -> Option<[i64; 3]> {
        let ijk = self.grid.enclosing_voxel(xyz);
        self.grid.index_valid(ijk).then_some(ijk)
    }

    pub fn clear_coloring(&mut self) {
        self.rgba.fill(0);
    }

    pub fn set_voxel_color(&mut self, ijk: [i64; 3], color: [u8; 4]) -> bool {
        match self.grid.linear_index(ijk) {
            Some(index) => {
                self.rgba[index * 4..index * 4 + 4].copy_from_slice(&color);
                true
            }
            None => false,
        }
    }

    pub fn voxel_color(&self, ijk: [i64; 3]) -> Option<[u8; 4]> {
        let index = self.grid.linear_index(ijk)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[index * 4..index * 4 + 4]);
        Some(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dconn_core::volume::{Orientation, VolumeAttributes};

    fn grid() -> VolumeGrid {
        VolumeGrid::from_attributes(&VolumeAttributes {
            dimensions: [2, 2, 1],
            origin: [0.0, 0.0, 0.0],
            spacing: [1.0, 1.0, 1.0],
            orientation: [
                Orientation::LeftToRight,
                Orientation::PosteriorToAnterior,
                Orientation::InferiorToSuperior,
            ],
        })
    }

    #[test]
    fn values_and_colors_round_trip() {
        let mut volume = VolumeContent::new(grid());
        assert!(volume.set_value([1, 0, 0], 7.0));
        assert_eq!(volume.value([1, 0, 0]), Some(7.0));
        assert!(volume.set_voxel_color([1, 0, 0], [10, 20, 30, 255]));
        assert_eq!(volume.voxel_color([1, 0, 0]), Some([10, 20, 30, 255]));
    }

    #[test]
    fn out_of_grid_access_is_rejected() {
        let mut volume = VolumeContent::new(grid());
        assert!(!volume.set_value([5, 0, 0], 1.0));
        assert_eq!(volume.value([5, 0, 0]), None);
        assert_eq!(volume.enclosing_voxel([9.0, 0.0, 0.0]), None);
        assert_eq!(volume.enclosing_voxel([1.0, 1.0, 0.0]), Some([1, 1, 0]));
    }
}

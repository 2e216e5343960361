//! Anatomical address to row/column index translation
//!
//! Resolves a [`BrainAddress`] against one axis of the injected header.
//! Every "no match" outcome is the [`NO_INDEX`] sentinel; only a
//! structurally invalid mapping type on the axis is logged as an error,
//! because that indicates an inconsistent file rather than a miss.

use tracing::error;

use crate::header::{CiftiHeader, MappingAxis, MappingType, Structure};
use crate::volume::VolumeGrid;

/// Sentinel row/column index meaning "no corresponding index".
pub const NO_INDEX: i64 = -1;

/// An addressable brain location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrainAddress {
    Surface {
        structure: Structure,
        /// Node count of the surface the caller is working with; must
        /// exactly match the header's count for the structure.
        total_node_count: u64,
        node_index: u64,
    },
    Voxel {
        xyz: [f32; 3],
    },
}

/// Translator over an injected header reference.
#[derive(Debug, Clone, Copy)]
pub struct IndexTranslator<'a> {
    header: &'a CiftiHeader,
}

impl<'a> IndexTranslator<'a> {
    pub fn new(header: &'a CiftiHeader) -> Self {
        Self { header }
    }

    /// Resolve an address on the given axis. `grid` is the current map's
    /// volume grid, needed only for voxel addresses on a parcels axis.
    pub fn index_for_address(
        &self,
        axis: MappingAxis,
        address: &BrainAddress,
        grid: Option<&VolumeGrid>,
    ) -> i64 {
        match *address {
            BrainAddress::Surface {
                structure,
                total_node_count,
                node_index,
            } => self.surface_index(axis, structure, total_node_count, node_index),
            BrainAddress::Voxel { xyz } => self.voxel_index(axis, xyz, grid),
        }
    }

    fn surface_index(
        &self,
        axis: MappingAxis,
        structure: Structure,
        total_node_count: u64,
        node_index: u64,
    ) -> i64 {
        // a surface with a different node count is a different surface;
        // never interpolate across the mismatch
        if self.header.surface_number_of_nodes(axis, structure) != Some(total_node_count) {
            return NO_INDEX;
        }
        match self.header.mapping_type(axis) {
            MappingType::BrainModels => self
                .header
                .index_for_node(axis, structure, node_index)
                .map_or(NO_INDEX, |index| index as i64),
            MappingType::Parcels => self
                .header
                .parcel_index_for_node(axis, structure, node_index)
                .map_or(NO_INDEX, |index| index as i64),
            MappingType::Scalars
            | MappingType::TimePoints
            | MappingType::Labels
            | MappingType::Fibers
            | MappingType::Invalid => {
                error!(
                    ?axis,
                    mapping_type = ?self.header.mapping_type(axis),
                    "invalid mapping type for surface-node lookup on connectivity file"
                );
                NO_INDEX
            }
        }
    }

    fn voxel_index(&self, axis: MappingAxis, xyz: [f32; 3], grid: Option<&VolumeGrid>) -> i64 {
        match self.header.mapping_type(axis) {
            MappingType::BrainModels => self
                .header
                .index_for_voxel_coordinate(axis, xyz)
                .map_or(NO_INDEX, |index| index as i64),
            MappingType::Parcels => {
                let Some(grid) = grid else {
                    return NO_INDEX;
                };
                let ijk = grid.enclosing_voxel(xyz);
                if !grid.index_valid(ijk) {
                    return NO_INDEX;
                }
                self.header
                    .parcel_index_for_voxel(axis, ijk)
                    .map_or(NO_INDEX, |index| index as i64)
            }
            MappingType::Scalars
            | MappingType::TimePoints
            | MappingType::Labels
            | MappingType::Fibers
            | MappingType::Invalid => {
                error!(
                    ?axis,
                    mapping_type = ?self.header.mapping_type(axis),
                    "invalid mapping type for voxel lookup on connectivity file"
                );
                NO_INDEX
            }
        }
    }
}

//! The CIFTI header model
//!
//! The header is the read-mostly metadata object injected into the index
//! translator and the map content cache. It records, per matrix axis, how
//! linear indices map to brainordinates (surface nodes, voxels, parcels),
//! plus the plumb volume geometry, the file palette settings, and the file
//! metadata.
//!
//! Parsing the CIFTI XML grammar is not this crate's concern: remote open
//! hands the metadata response body to an injected [`HeaderReader`], and
//! local callers construct the header programmatically.
//!
//! The only mutation the model permits after construction is
//! [`CiftiHeader::patch_dimension`], the one-time repair applied when a
//! time-points axis arrives without a recorded length.

mod metadata;
mod models;

pub use metadata::MetaData;
pub use models::{Parcel, SurfaceModel, VolumeMapEntry, VoxelModel};

use crate::error::HeaderParseError;
use crate::palette::PaletteSettings;
use crate::volume::VolumeAttributes;

/// The two matrix dimensions. Loading picks which row to fetch; viewing
/// interprets the fetched values for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingAxis {
    Loading,
    Viewing,
}

/// What an axis's linear indices stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingType {
    BrainModels,
    Parcels,
    Scalars,
    TimePoints,
    Labels,
    Fibers,
    Invalid,
}

/// Anatomical structure owning a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    CortexLeft,
    CortexRight,
    Cerebellum,
    Brainstem,
    ThalamusLeft,
    ThalamusRight,
}

/// Everything the header records about one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMapping {
    mapping_type: MappingType,
    length: Option<u64>,
    surfaces: Vec<SurfaceModel>,
    voxels: VoxelModel,
    parcels: Vec<Parcel>,
    parcel_surfaces: Vec<(Structure, u64)>,
}

impl AxisMapping {
    /// Brain-models axis: dense surface and voxel brainordinates.
    pub fn brain_models(
        length: u64,
        surfaces: Vec<SurfaceModel>,
        volume_map: Vec<VolumeMapEntry>,
    ) -> Self {
        Self {
            mapping_type: MappingType::BrainModels,
            length: Some(length),
            surfaces,
            voxels: VoxelModel::new(volume_map),
            parcels: Vec::new(),
            parcel_surfaces: Vec::new(),
        }
    }

    /// Parcels axis: one index per named parcel. `parcel_surfaces` records
    /// the node count of each referenced surface, used by the node-count
    /// guard during translation.
    pub fn parcels(parcels: Vec<Parcel>, parcel_surfaces: Vec<(Structure, u64)>) -> Self {
        Self {
            mapping_type: MappingType::Parcels,
            length: Some(parcels.len() as u64),
            surfaces: Vec::new(),
            voxels: VoxelModel::default(),
            parcels,
            parcel_surfaces,
        }
    }

    /// Series axis with one index per time point. The length may be
    /// unknown until the post-open dimension repair.
    pub fn time_points(length: Option<u64>) -> Self {
        Self {
            mapping_type: MappingType::TimePoints,
            length,
            surfaces: Vec::new(),
            voxels: VoxelModel::default(),
            parcels: Vec::new(),
            parcel_surfaces: Vec::new(),
        }
    }

    /// Axis of the given type with a plain length and no brainordinate
    /// structure (scalars, labels, fibers).
    pub fn plain(mapping_type: MappingType, length: u64) -> Self {
        Self {
            mapping_type,
            length: Some(length),
            surfaces: Vec::new(),
            voxels: VoxelModel::default(),
            parcels: Vec::new(),
            parcel_surfaces: Vec::new(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            mapping_type: MappingType::Invalid,
            length: None,
            surfaces: Vec::new(),
            voxels: VoxelModel::default(),
            parcels: Vec::new(),
            parcel_surfaces: Vec::new(),
        }
    }

    fn surface(&self, structure: Structure) -> Option<&SurfaceModel> {
        self.surfaces
            .iter()
            .find(|model| model.structure() == structure)
    }
}

/// Connectivity-file header: one mapping per axis plus shared metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CiftiHeader {
    loading: AxisMapping,
    viewing: AxisMapping,
    volume: Option<VolumeAttributes>,
    palette: PaletteSettings,
    metadata: MetaData,
    map_names: Vec<String>,
}

impl CiftiHeader {
    pub fn new(loading: AxisMapping, viewing: AxisMapping) -> Self {
        Self {
            loading,
            viewing,
            volume: None,
            palette: PaletteSettings::default(),
            metadata: MetaData::new(),
            map_names: Vec::new(),
        }
    }

    pub fn with_volume(mut self, volume: VolumeAttributes) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_palette(mut self, palette: PaletteSettings) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_map_names(mut self, map_names: Vec<String>) -> Self {
        self.map_names = map_names;
        self
    }

    fn axis(&self, axis: MappingAxis) -> &AxisMapping {
        match axis {
            MappingAxis::Loading => &self.loading,
            MappingAxis::Viewing => &self.viewing,
        }
    }

    pub fn mapping_type(&self, axis: MappingAxis) -> MappingType {
        self.axis(axis).mapping_type
    }

    /// Length of the axis: row count for loading, column count for viewing.
    pub fn dimension(&self, axis: MappingAxis) -> Option<u64> {
        self.axis(axis).length
    }

    /// One-time repair for a time-points axis whose length the header
    /// omitted. Never called as a side effect of reads.
    pub fn patch_dimension(&mut self, axis: MappingAxis, length: u64) {
        let mapping = match axis {
            MappingAxis::Loading => &mut self.loading,
            MappingAxis::Viewing => &mut self.viewing,
        };
        mapping.length = Some(length);
    }

    /// Node count the header records for a structure's surface on an axis.
    pub fn surface_number_of_nodes(&self, axis: MappingAxis, structure: Structure) -> Option<u64> {
        let mapping = self.axis(axis);
        if let Some(model) = mapping.surface(structure) {
            return Some(model.number_of_nodes());
        }
        mapping
            .parcel_surfaces
            .iter()
            .find(|(s, _)| *s == structure)
            .map(|&(_, count)| count)
    }

    /// Brain-models lookup: axis index of a surface node.
    pub fn index_for_node(
        &self,
        axis: MappingAxis,
        structure: Structure,
        node: u64,
    ) -> Option<u64> {
        self.axis(axis).surface(structure)?.index_for_node(node)
    }

    /// Parcels lookup: axis index of the parcel containing a surface node.
    pub fn parcel_index_for_node(
        &self,
        axis: MappingAxis,
        structure: Structure,
        node: u64,
    ) -> Option<u64> {
        self.axis(axis)
            .parcels
            .iter()
            .position(|parcel| parcel.contains_node(structure, node))
            .map(|position| position as u64)
    }

    /// Brain-models lookup: axis index of a voxel.
    pub fn index_for_voxel(&self, axis: MappingAxis, ijk: [i64; 3]) -> Option<u64> {
        self.axis(axis).voxels.index_for_voxel(ijk)
    }

    /// Brain-models lookup by spatial coordinate, using the header's own
    /// volume geometry.
    pub fn index_for_voxel_coordinate(&self, axis: MappingAxis, xyz: [f32; 3]) -> Option<u64> {
        let grid = crate::volume::VolumeGrid::from_attributes(self.volume.as_ref()?);
        let ijk = grid.enclosing_voxel(xyz);
        if !grid.index_valid(ijk) {
            return None;
        }
        self.index_for_voxel(axis, ijk)
    }

    /// Parcels lookup: axis index of the parcel containing a voxel.
    pub fn parcel_index_for_voxel(&self, axis: MappingAxis, ijk: [i64; 3]) -> Option<u64> {
        self.axis(axis)
            .parcels
            .iter()
            .position(|parcel| parcel.contains_voxel(ijk))
            .map(|position| position as u64)
    }

    /// Ordered CIFTI-to-volume map entries recorded for the axis.
    pub fn volume_map(&self, axis: MappingAxis) -> &[VolumeMapEntry] {
        self.axis(axis).voxels.entries()
    }

    pub fn parcels(&self, axis: MappingAxis) -> &[Parcel] {
        &self.axis(axis).parcels
    }

    /// Volume geometry, present only when the grid is plumb.
    pub fn volume_attributes_for_plumb(&self) -> Option<&VolumeAttributes> {
        self.volume.as_ref()
    }

    pub fn file_palette(&self) -> &PaletteSettings {
        &self.palette
    }

    pub fn file_metadata(&self) -> &MetaData {
        &self.metadata
    }

    pub fn map_name(&self, map_index: usize) -> String {
        self.map_names
            .get(map_index)
            .cloned()
            .unwrap_or_else(|| format!("Map {}", map_index + 1))
    }
}

/// Injected parser turning a metadata response body into a header.
///
/// The CIFTI XML grammar is a collaborator concern; remote open only
/// transports the body and applies the dimension repair afterwards.
pub trait HeaderReader {
    fn read_header(&self, body: &[u8]) -> Result<CiftiHeader, HeaderParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_only_header() -> CiftiHeader {
        let surface = SurfaceModel::new(Structure::CortexLeft, 4, &[(0, 0), (1, 1), (3, 2)]);
        CiftiHeader::new(
            AxisMapping::brain_models(3, vec![surface.clone()], Vec::new()),
            AxisMapping::brain_models(3, vec![surface], Vec::new()),
        )
    }

    #[test]
    fn node_lookup_follows_model() {
        let header = left_only_header();
        assert_eq!(
            header.index_for_node(MappingAxis::Loading, Structure::CortexLeft, 3),
            Some(2)
        );
        assert_eq!(
            header.index_for_node(MappingAxis::Loading, Structure::CortexLeft, 2),
            None
        );
        assert_eq!(
            header.index_for_node(MappingAxis::Loading, Structure::CortexRight, 0),
            None
        );
    }

    #[test]
    fn surface_node_counts_cover_parcel_axes() {
        let parcels = AxisMapping::parcels(
            vec![Parcel::new(
                "area-1",
                vec![(Structure::CortexRight, vec![0, 1])],
                Vec::new(),
            )],
            vec![(Structure::CortexRight, 32)],
        );
        let header = CiftiHeader::new(parcels, AxisMapping::plain(MappingType::Scalars, 1));
        assert_eq!(
            header.surface_number_of_nodes(MappingAxis::Loading, Structure::CortexRight),
            Some(32)
        );
        assert_eq!(
            header.parcel_index_for_node(MappingAxis::Loading, Structure::CortexRight, 1),
            Some(0)
        );
    }

    #[test]
    fn dimension_patch_is_visible() {
        let mut header = CiftiHeader::new(
            AxisMapping::time_points(None),
            AxisMapping::plain(MappingType::Scalars, 8),
        );
        assert_eq!(header.dimension(MappingAxis::Loading), None);
        header.patch_dimension(MappingAxis::Loading, 100);
        assert_eq!(header.dimension(MappingAxis::Loading), Some(100));
    }

    #[test]
    fn map_name_falls_back_to_position() {
        let header = left_only_header().with_map_names(vec!["dense".into()]);
        assert_eq!(header.map_name(0), "dense");
        assert_eq!(header.map_name(1), "Map 2");
    }
}

//! Connectivity-matrix data file facade
//!
//! The API surface GUI collaborators call: open a matrix from a local
//! file, an in-memory buffer, or an XNAT URL, then load one row per map
//! by surface node, node average, or voxel coordinate. Loads resolve
//! addresses through the injected header, fetch through the matrix
//! source, and feed the per-map content cache. All failures below the
//! facade are re-raised as load errors preserving the original message.

use std::path::Path;

use tracing::debug;

use dconn_core::header::{CiftiHeader, MappingAxis, MetaData, Structure};
#[cfg(feature = "http")]
use dconn_core::header::HeaderReader;
use dconn_core::palette::PaletteSource;
use dconn_core::stats::{DescriptiveStatistics, FastStatistics, Histogram};
use dconn_core::translator::{BrainAddress, IndexTranslator, NO_INDEX};

use crate::error::{DconnError, RangeError, Result};
use crate::local::{DataLocation, LocalMatrixSource};
use crate::map_content::MapContent;
#[cfg(feature = "http")]
use crate::remote::RemoteMatrixSource;
use crate::source::{MatrixHandle, MatrixSource, SourceKind};
use crate::volume::VolumeContent;
#[cfg(feature = "http")]
use crate::transport::{RemoteAuth, TransportConfig};

/// Scalar read back from the cached row for a voxel address.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelValue {
    pub value: f32,
    pub ijk: Option<[i64; 3]>,
    /// Value text, with the parcel name appended when parcellated
    pub text: String,
}

/// Scalar read back from the cached row for a surface node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeValue {
    pub value: f32,
    pub text: String,
}

/// Per-map flags exposed to the scene serializer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneState {
    pub map_loading_enabled: Vec<bool>,
}

#[cfg(feature = "serde")]
impl SceneState {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| DconnError::Load(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| DconnError::Load(err.to_string()))
    }
}

/// One connectivity matrix file with one cached row per map.
#[derive(Debug, Default)]
pub struct ConnectivityMatrixFile {
    file_name: String,
    source: Option<MatrixHandle>,
    header: Option<CiftiHeader>,
    maps: Vec<MapContent>,
}

impl ConnectivityMatrixFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a matrix stored in a local file, with the header injected by
    /// the caller. Dense matrices should stay on disk; smaller ones can
    /// be read fully into memory.
    pub fn open_local(
        path: impl AsRef<Path>,
        header: CiftiHeader,
        data_offset: u64,
        location: DataLocation,
    ) -> Result<Self> {
        let source = LocalMatrixSource::open(&path, &header, data_offset, location)?;
        Ok(Self::from_parts(
            path.as_ref().display().to_string(),
            MatrixHandle::Local(source),
            header,
        ))
    }

    /// Wrap an in-memory value buffer as an opened file.
    pub fn open_in_memory(
        name: impl Into<String>,
        header: CiftiHeader,
        values: Vec<f32>,
    ) -> Result<Self> {
        let source = LocalMatrixSource::from_values(&header, values)?;
        Ok(Self::from_parts(
            name.into(),
            MatrixHandle::Local(source),
            header,
        ))
    }

    /// Open a matrix served by an XNAT repository. The reader parses the
    /// metadata response body into the header.
    #[cfg(feature = "http")]
    pub fn open_remote(
        url: &str,
        auth: Option<RemoteAuth>,
        reader: &dyn HeaderReader,
        config: TransportConfig,
    ) -> Result<Self> {
        let (source, header) = RemoteMatrixSource::open(url, auth, reader, config)?;
        Ok(Self::from_parts(
            url.to_string(),
            MatrixHandle::Remote(source),
            header,
        ))
    }

    fn from_parts(file_name: String, source: MatrixHandle, header: CiftiHeader) -> Self {
        let row_type = header.mapping_type(MappingAxis::Loading);
        let column_type = header.mapping_type(MappingAxis::Viewing);
        debug!(
            file = %file_name,
            rows = ?header.dimension(MappingAxis::Loading),
            columns = ?header.dimension(MappingAxis::Viewing),
            ?row_type,
            ?column_type,
            "opened connectivity matrix file"
        );
        Self {
            file_name,
            source: Some(source),
            header: Some(header),
            maps: vec![MapContent::new()],
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source.as_ref().map(MatrixHandle::kind)
    }

    pub fn header(&self) -> Option<&CiftiHeader> {
        self.header.as_ref()
    }

    pub fn row_count(&self) -> Result<u64> {
        Ok(self.require_source()?.row_count())
    }

    pub fn column_count(&self) -> Result<u64> {
        Ok(self.require_source()?.column_count())
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    fn require_source(&self) -> Result<&MatrixHandle> {
        self.source.as_ref().ok_or(DconnError::NotLoaded)
    }

    fn require_header(&self) -> Result<&CiftiHeader> {
        self.header.as_ref().ok_or(DconnError::NotLoaded)
    }

    fn map(&self, map_index: usize) -> Result<&MapContent> {
        let count = self.maps.len() as u64;
        self.maps.get(map_index).ok_or_else(|| {
            RangeError {
                index: map_index as i64,
                count,
            }
            .into()
        })
    }

    fn map_mut(&mut self, map_index: usize) -> Result<&mut MapContent> {
        let count = self.maps.len() as u64;
        self.maps.get_mut(map_index).ok_or_else(|| {
            RangeError {
                index: map_index as i64,
                count,
            }
            .into()
        })
    }

    /// Load the row for a surface node into the map's cache.
    ///
    /// Returns the resolved row index, or -1 without error when the node
    /// has no row or per-map loading is disabled (disabled is not a
    /// failure; callers must not mistake the silent -1 for one).
    pub fn load_map_data_for_surface_node(
        &mut self,
        map_index: usize,
        total_node_count: u64,
        structure: Structure,
        node_index: u64,
    ) -> Result<i64> {
        self.require_source()?;
        self.map(map_index)?;
        let address = BrainAddress::Surface {
            structure,
            total_node_count,
            node_index,
        };
        let row_index = self.load_row_for_address(map_index, &address)?;
        if row_index >= 0 {
            debug!(node = node_index, row = row_index, "read row for node");
        } else {
            debug!(node = node_index, "no row for node");
        }
        Ok(row_index)
    }

    /// Load the row for a voxel coordinate into the map's cache.
    pub fn load_map_data_for_voxel_at_coordinate(
        &mut self,
        map_index: usize,
        xyz: [f32; 3],
    ) -> Result<i64> {
        self.require_source()?;
        self.map(map_index)?;
        let address = BrainAddress::Voxel { xyz };
        let row_index = self.load_row_for_address(map_index, &address)?;
        if row_index >= 0 {
            debug!(?xyz, row = row_index, "read row for voxel");
        } else {
            debug!(?xyz, "no row for voxel");
        }
        Ok(row_index)
    }

    fn load_row_for_address(&mut self, map_index: usize, address: &BrainAddress) -> Result<i64> {
        let source = self.source.as_ref().ok_or(DconnError::NotLoaded)?;
        let header = self.header.as_ref().ok_or(DconnError::NotLoaded)?;
        let content = &mut self.maps[map_index];
        if !content.is_loading_enabled() {
            return Ok(NO_INDEX);
        }

        let translator = IndexTranslator::new(header);
        let row_index =
            translator.index_for_address(MappingAxis::Loading, address, content.grid());
        if row_index < 0 {
            return Ok(row_index);
        }

        let column_count = source.column_count() as usize;
        if column_count > 0 {
            let mut values = vec![0.0f32; column_count];
            source
                .get_row(&mut values, row_index)
                .map_err(|err| DconnError::Load(err.to_string()))?;
            content.update_data(header, map_index, &values);
        }
        Ok(row_index)
    }

    /// Load the element-wise average of the rows for several nodes.
    ///
    /// Nodes that resolve to no row are skipped; the sum is divided by
    /// the count of rows actually fetched, not the count requested. If
    /// nothing resolves, the cached content is left untouched.
    pub fn load_map_average_data_for_surface_nodes(
        &mut self,
        map_index: usize,
        total_node_count: u64,
        structure: Structure,
        node_indices: &[u64],
    ) -> Result<()> {
        let source = self.source.as_ref().ok_or(DconnError::NotLoaded)?;
        let header = self.header.as_ref().ok_or(DconnError::NotLoaded)?;
        let count = self.maps.len() as u64;
        let content = self.maps.get_mut(map_index).ok_or(RangeError {
            index: map_index as i64,
            count,
        })?;
        if !content.is_loading_enabled() || node_indices.is_empty() {
            return Ok(());
        }

        let column_count = source.column_count() as usize;
        if column_count == 0 {
            return Ok(());
        }

        let translator = IndexTranslator::new(header);
        let mut average = vec![0.0f32; column_count];
        let mut row = vec![0.0f32; column_count];
        let mut success_count = 0u64;

        for &node_index in node_indices {
            let address = BrainAddress::Surface {
                structure,
                total_node_count,
                node_index,
            };
            let row_index =
                translator.index_for_address(MappingAxis::Loading, &address, content.grid());
            if row_index < 0 {
                debug!(node = node_index, "skipping unresolvable node in average");
                continue;
            }
            source
                .get_row(&mut row, row_index)
                .map_err(|err| DconnError::Load(err.to_string()))?;
            for (sum, &value) in average.iter_mut().zip(&row) {
                *sum += value;
            }
            success_count += 1;
            debug!(node = node_index, row = row_index, "read row for average");
        }

        if success_count > 0 {
            for sum in &mut average {
                *sum /= success_count as f32;
            }
            content.update_data(header, map_index, &average);
        } else {
            debug!("no rows resolved for node average; map content unchanged");
        }
        Ok(())
    }

    /// Read the cached value mapped to a voxel coordinate on the viewing
    /// axis, with a descriptive label.
    pub fn get_map_volume_voxel_value(
        &self,
        map_index: usize,
        xyz: [f32; 3],
    ) -> Result<Option<VoxelValue>> {
        self.require_source()?;
        let header = self.require_header()?;
        let content = self.map(map_index)?;

        let translator = IndexTranslator::new(header);
        let address = BrainAddress::Voxel { xyz };
        let column = translator.index_for_address(MappingAxis::Viewing, &address, content.grid());
        if column < 0 || column as usize >= content.data().len() {
            return Ok(None);
        }
        let value = content.data()[column as usize];
        let mut text = format!("{value}");
        if let Some(parcel) = header.parcels(MappingAxis::Viewing).get(column as usize) {
            text.push(' ');
            text.push_str(parcel.name());
        }
        Ok(Some(VoxelValue {
            value,
            ijk: content.voxel_xyz_to_ijk(xyz),
            text,
        }))
    }

    /// Read the cached value mapped to a surface node on the viewing
    /// axis, with a descriptive label.
    pub fn get_map_surface_node_value(
        &self,
        map_index: usize,
        structure: Structure,
        node_index: u64,
        total_node_count: u64,
    ) -> Result<Option<NodeValue>> {
        self.require_source()?;
        let header = self.require_header()?;
        let content = self.map(map_index)?;

        let translator = IndexTranslator::new(header);
        let address = BrainAddress::Surface {
            structure,
            total_node_count,
            node_index,
        };
        let column = translator.index_for_address(MappingAxis::Viewing, &address, content.grid());
        if column < 0 || column as usize >= content.data().len() {
            return Ok(None);
        }
        let value = content.data()[column as usize];
        let mut text = format!("{value}");
        if let Some(parcel) = header.parcels(MappingAxis::Viewing).get(column as usize) {
            text.push(' ');
            text.push_str(parcel.name());
        }
        Ok(Some(NodeValue { value, text }))
    }

    /// Copy per-node RGBA from the cached coloring into `surface_rgba`
    /// (4 bytes per node). Unmapped nodes get a transparent pixel.
    /// Returns false when the structure's node count does not match the
    /// viewing axis.
    pub fn get_map_surface_node_coloring(
        &self,
        map_index: usize,
        structure: Structure,
        surface_rgba: &mut [u8],
        total_node_count: u64,
    ) -> Result<bool> {
        self.require_source()?;
        let header = self.require_header()?;
        let content = self.map(map_index)?;

        if header.surface_number_of_nodes(MappingAxis::Viewing, structure)
            != Some(total_node_count)
        {
            return Ok(false);
        }
        debug_assert_eq!(surface_rgba.len() as u64, total_node_count * 4);

        let translator = IndexTranslator::new(header);
        for node_index in 0..total_node_count {
            let address = BrainAddress::Surface {
                structure,
                total_node_count,
                node_index,
            };
            let column =
                translator.index_for_address(MappingAxis::Viewing, &address, content.grid());
            let node_offset = node_index as usize * 4;
            let pixel = if column >= 0 && (column as usize) < content.data().len() {
                let offset = column as usize * 4;
                let rgba = &content.rgba()[offset..offset + 4];
                [rgba[0], rgba[1], rgba[2], rgba[3]]
            } else {
                [0, 0, 0, 0]
            };
            surface_rgba[node_offset..node_offset + 4].copy_from_slice(&pixel);
        }
        Ok(true)
    }

    /// Recompute statistics and coloring for the map's cached row.
    pub fn update_scalar_coloring_for_map(
        &mut self,
        map_index: usize,
        palettes: &dyn PaletteSource,
    ) -> Result<()> {
        self.require_source()?;
        self.map_mut(map_index)?.update_coloring(palettes);
        Ok(())
    }

    /// Node count of the structure's surface on the loading axis; `None`
    /// when the file is not open or the structure is absent.
    pub fn surface_number_of_nodes_for_loading(&self, structure: Structure) -> Option<u64> {
        self.header
            .as_ref()?
            .surface_number_of_nodes(MappingAxis::Loading, structure)
    }

    pub fn map_name(&self, map_index: usize) -> Result<&str> {
        Ok(self.map(map_index)?.name())
    }

    pub fn map_metadata(&self, map_index: usize) -> Result<&MetaData> {
        Ok(self.map(map_index)?.metadata())
    }

    pub fn map_data(&self, map_index: usize) -> Result<&[f32]> {
        Ok(self.map(map_index)?.data())
    }

    pub fn map_rgba(&self, map_index: usize) -> Result<&[u8]> {
        Ok(self.map(map_index)?.rgba())
    }

    pub fn map_volume(&self, map_index: usize) -> Result<Option<&VolumeContent>> {
        Ok(self.map(map_index)?.volume())
    }

    pub fn map_fast_statistics(&mut self, map_index: usize) -> Result<&FastStatistics> {
        Ok(self.map_mut(map_index)?.fast_statistics())
    }

    pub fn map_descriptive_statistics(
        &mut self,
        map_index: usize,
    ) -> Result<&DescriptiveStatistics> {
        Ok(self.map_mut(map_index)?.descriptive_statistics())
    }

    pub fn map_histogram(&mut self, map_index: usize) -> Result<&Histogram> {
        Ok(self.map_mut(map_index)?.histogram())
    }

    pub fn is_map_data_loading_enabled(&self, map_index: usize) -> Result<bool> {
        Ok(self.map(map_index)?.is_loading_enabled())
    }

    /// Disabling keeps previously loaded data so it can still be shown.
    pub fn set_map_data_loading_enabled(&mut self, map_index: usize, enabled: bool) -> Result<()> {
        self.map_mut(map_index)?.set_loading_enabled(enabled);
        Ok(())
    }

    /// Per-map enabled flags for the scene serializer.
    pub fn save_scene_state(&self) -> SceneState {
        SceneState {
            map_loading_enabled: self.maps.iter().map(MapContent::is_loading_enabled).collect(),
        }
    }

    pub fn restore_scene_state(&mut self, state: &SceneState) {
        for (content, &enabled) in self.maps.iter_mut().zip(&state.map_loading_enabled) {
            content.set_loading_enabled(enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dconn_core::header::{AxisMapping, SurfaceModel};

    /// 2x4 matrix whose loading axis maps LEFT-cortex nodes 0 and 1 onto
    /// rows 0 and 1, and whose viewing axis maps four nodes onto columns.
    fn two_by_four() -> ConnectivityMatrixFile {
        let loading = SurfaceModel::new(Structure::CortexLeft, 4, &[(0, 0), (1, 1)]);
        let viewing =
            SurfaceModel::new(Structure::CortexLeft, 4, &[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let header = CiftiHeader::new(
            AxisMapping::brain_models(2, vec![loading], Vec::new()),
            AxisMapping::brain_models(4, vec![viewing], Vec::new()),
        );
        ConnectivityMatrixFile::open_in_memory(
            "two-by-four",
            header,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )
        .unwrap()
    }

    #[test]
    fn unopened_file_reports_not_loaded() {
        let mut file = ConnectivityMatrixFile::new();
        assert!(file.is_empty());
        let err = file
            .load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 0)
            .unwrap_err();
        assert!(matches!(err, DconnError::NotLoaded));
    }

    #[test]
    fn surface_load_caches_the_row() {
        let mut file = two_by_four();
        let row = file
            .load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 1)
            .unwrap();
        assert_eq!(row, 1);
        assert_eq!(file.map_data(0).unwrap(), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(file.map_fast_statistics(0).unwrap().mean(), 6.5);
    }

    #[test]
    fn unresolvable_node_returns_sentinel_without_loading() {
        let mut file = two_by_four();
        let row = file
            .load_map_data_for_surface_node(0, 4, Structure::CortexRight, 0)
            .unwrap();
        assert_eq!(row, -1);
        assert!(file.map_data(0).unwrap().is_empty());
    }

    #[test]
    fn average_divides_by_successes_not_requests() {
        let mut file = two_by_four();
        // node 2 resolves to no row; nodes 0 and 1 resolve
        file.load_map_average_data_for_surface_nodes(0, 4, Structure::CortexLeft, &[0, 1, 2])
            .unwrap();
        // mean of rows [1,2,3,4] and [5,6,7,8], divided by 2 not 3
        assert_eq!(file.map_data(0).unwrap(), &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn average_of_nothing_leaves_content_untouched() {
        let mut file = two_by_four();
        file.load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 0)
            .unwrap();
        let before = file.map_data(0).unwrap().to_vec();
        file.load_map_average_data_for_surface_nodes(0, 4, Structure::CortexLeft, &[2, 3])
            .unwrap();
        assert_eq!(file.map_data(0).unwrap(), before.as_slice());
    }

    #[test]
    fn disabled_loading_returns_sentinel_and_preserves_bytes() {
        let mut file = two_by_four();
        file.load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 0)
            .unwrap();
        let before = file.map_data(0).unwrap().to_vec();

        file.set_map_data_loading_enabled(0, false).unwrap();
        let row = file
            .load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 1)
            .unwrap();
        assert_eq!(row, -1);
        assert_eq!(file.map_data(0).unwrap(), before.as_slice());
    }

    #[test]
    fn viewing_lookup_reads_the_cached_row() {
        let mut file = two_by_four();
        file.load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 1)
            .unwrap();
        let node_value = file
            .get_map_surface_node_value(0, Structure::CortexLeft, 2, 4)
            .unwrap()
            .expect("node 2 maps to column 2");
        assert_eq!(node_value.value, 7.0);
        assert!(node_value.text.starts_with('7'));
    }

    #[test]
    fn scene_state_round_trips_enabled_flags() {
        let mut file = two_by_four();
        file.set_map_data_loading_enabled(0, false).unwrap();
        let state = file.save_scene_state();
        assert_eq!(state.map_loading_enabled, vec![false]);

        let mut other = two_by_four();
        other.restore_scene_state(&state);
        assert!(!other.is_map_data_loading_enabled(0).unwrap());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn scene_state_serializes() {
        let state = SceneState {
            map_loading_enabled: vec![true, false],
        };
        let json = state.to_json().unwrap();
        assert_eq!(SceneState::from_json(&json).unwrap(), state);
    }
}

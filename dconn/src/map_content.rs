//! Per-map cached row content
//!
//! Each map owns at most one materialized row at a time. A successful
//! load fully overwrites the previous one and re-syncs the map name,
//! palette settings, and metadata snapshot from the header. When the
//! viewing axis maps onto voxels, the CIFTI-to-volume map is rebuilt and
//! the volume content is created or recreated per the geometry tolerance.

use tracing::{debug, warn};

use dconn_core::header::{CiftiHeader, MappingAxis, MappingType, MetaData, VolumeMapEntry};
use dconn_core::palette::{Palette, PaletteSettings, PaletteSource};
use dconn_core::stats::{DescriptiveStatistics, FastStatistics, Histogram};
use dconn_core::volume::VolumeGrid;

use crate::coloring::color_scalars;
use crate::volume::VolumeContent;

const HISTOGRAM_BUCKETS: usize = 100;

/// Cached content of one map: Empty until the first load, then Loaded,
/// overwritten in place by every later load.
#[derive(Debug)]
pub struct MapContent {
    name: String,
    data: Vec<f32>,
    rgba: Vec<u8>,
    volume: Option<VolumeContent>,
    volume_map: Vec<VolumeMapEntry>,
    fast_stats: FastStatistics,
    fast_stats_valid: bool,
    descriptive: DescriptiveStatistics,
    histogram: Histogram,
    palette_settings: PaletteSettings,
    metadata: MetaData,
    data_loading_enabled: bool,
}

impl Default for MapContent {
    fn default() -> Self {
        Self::new()
    }
}

impl MapContent {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            data: Vec::new(),
            rgba: Vec::new(),
            volume: None,
            volume_map: Vec::new(),
            fast_stats: FastStatistics::new(),
            fast_stats_valid: false,
            descriptive: DescriptiveStatistics::new(),
            histogram: Histogram::new(),
            palette_settings: PaletteSettings::default(),
            metadata: MetaData::new(),
            data_loading_enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// RGBA bytes, 4 per value. Undefined until coloring has run after
    /// the most recent load.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    pub fn palette_settings(&self) -> &PaletteSettings {
        &self.palette_settings
    }

    pub fn volume(&self) -> Option<&VolumeContent> {
        self.volume.as_ref()
    }

    pub fn grid(&self) -> Option<&VolumeGrid> {
        self.volume.as_ref().map(VolumeContent::grid)
    }

    pub fn is_loading_enabled(&self) -> bool {
        self.data_loading_enabled
    }

    /// Disabling leaves previously loaded data in place so it can still
    /// be displayed, just never updated.
    pub fn set_loading_enabled(&mut self, enabled: bool) {
        self.data_loading_enabled = enabled;
    }

    /// Replace the cached row and re-sync everything derived from it.
    pub fn update_data(&mut self, header: &CiftiHeader, map_index: usize, values: &[f32]) {
        self.data.clear();
        self.data.extend_from_slice(values);
        // contents undefined until coloring runs
        self.rgba.resize(values.len() * 4, 0);

        self.name = header.map_name(map_index);
        self.palette_settings = header.file_palette().clone();
        self.metadata = header.file_metadata().clone();
        self.descriptive.invalidate();
        self.fast_stats_valid = false;

        self.volume_map.clear();
        let mut volume_needed = false;
        match header.mapping_type(MappingAxis::Viewing) {
            MappingType::BrainModels => {
                self.volume_map
                    .extend_from_slice(header.volume_map(MappingAxis::Viewing));
                if !self.volume_map.is_empty() {
                    volume_needed = self.ensure_volume(header);
                }
            }
            MappingType::Parcels => {
                for (parcel_index, parcel) in header.parcels(MappingAxis::Viewing).iter().enumerate()
                {
                    for &ijk in parcel.voxel_indices() {
                        self.volume_map.push(VolumeMapEntry {
                            value_index: parcel_index as u64,
                            ijk,
                        });
                    }
                }
                if !self.volume_map.is_empty() {
                    volume_needed = self.ensure_volume(header);
                }
            }
            MappingType::Scalars
            | MappingType::TimePoints
            | MappingType::Labels
            | MappingType::Fibers
            | MappingType::Invalid => {}
        }

        if volume_needed {
            self.write_values_into_volume();
        } else {
            self.volume = None;
        }
    }

    /// Create or recreate the volume for the header's grid geometry.
    /// Returns false when the grid is not plumb, releasing any volume.
    fn ensure_volume(&mut self, header: &CiftiHeader) -> bool {
        let Some(attributes) = header.volume_attributes_for_plumb() else {
            debug!("volume geometry is not plumb; volumetric mapping skipped");
            return false;
        };
        let recreate = match &self.volume {
            Some(volume) => !volume.grid().approximately_matches(attributes),
            None => true,
        };
        if recreate {
            self.volume = Some(VolumeContent::new(VolumeGrid::from_attributes(attributes)));
        }
        true
    }

    fn write_values_into_volume(&mut self) {
        if let Some(volume) = &mut self.volume {
            volume.fill_values(0.0);
            for entry in &self.volume_map {
                if let Some(&value) = self.data.get(entry.value_index as usize) {
                    volume.set_value(entry.ijk, value);
                }
            }
        }
    }

    /// Recompute statistics and RGBA for the current buffer with the
    /// palette named by the settings; a name the source cannot resolve
    /// warns and falls back to a neutral gray ramp.
    pub fn update_coloring(&mut self, palettes: &dyn PaletteSource) {
        let fallback;
        let palette = match palettes.palette_by_name(&self.palette_settings.selected_palette_name) {
            Some(palette) => palette,
            None => {
                warn!(
                    palette = %self.palette_settings.selected_palette_name,
                    "missing palette for coloring connectivity data"
                );
                fallback = Palette::neutral_gray();
                &fallback
            }
        };
        if self.data.is_empty() {
            return;
        }

        self.fast_stats.update(&self.data);
        self.fast_stats_valid = true;
        color_scalars(
            &self.fast_stats,
            &self.palette_settings,
            palette,
            &self.data,
            &mut self.rgba,
        );
        debug!(
            mean = self.fast_stats.mean(),
            most_negative = self.fast_stats.most_negative_value(),
            most_positive = self.fast_stats.most_positive_value(),
            "recolored connectivity data"
        );

        if !self.volume_map.is_empty() {
            if let Some(volume) = &mut self.volume {
                volume.clear_coloring();
                for entry in &self.volume_map {
                    let offset = entry.value_index as usize * 4;
                    if let Some(pixel) = self.rgba.get(offset..offset + 4) {
                        volume.set_voxel_color(entry.ijk, [pixel[0], pixel[1], pixel[2], pixel[3]]);
                    }
                }
            }
        }
    }

    /// Voxel indices enclosing a coordinate, through the map's volume.
    pub fn voxel_xyz_to_ijk(&self, xyz: [f32; 3]) -> Option<[i64; 3]> {
        self.volume.as_ref()?.enclosing_voxel(xyz)
    }

    /// Lazily recomputed; an empty buffer yields the zero-count snapshot.
    pub fn fast_statistics(&mut self) -> &FastStatistics {
        if !self.fast_stats_valid {
            self.fast_stats.update(&self.data);
            self.fast_stats_valid = true;
        }
        &self.fast_stats
    }

    pub fn descriptive_statistics(&mut self) -> &DescriptiveStatistics {
        if !self.descriptive.is_valid() {
            self.descriptive.update(&self.data);
        }
        &self.descriptive
    }

    pub fn histogram(&mut self) -> &Histogram {
        self.histogram.update(HISTOGRAM_BUCKETS, &self.data);
        &self.histogram
    }
}

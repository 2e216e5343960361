//! dconn-core - CIFTI connectivity-matrix model
//!
//! This crate provides the pure model half of the connectivity-matrix
//! access layer: no I/O, no transport. It defines
//!
//! - the injected CIFTI header model (axis mappings, brain models,
//!   parcels, plumb volume attributes, palette settings, metadata)
//! - translation from anatomical addresses to row/column indices
//! - wire-payload validation and decoding for the remote protocol
//! - statistics (fast, descriptive, histogram) and the palette model
//!
//! The companion `dconn` crate supplies the concrete matrix sources
//! (local file, in-memory, remote XNAT), the per-map row cache, the
//! coloring pipeline, and the file facade.

pub mod byte_order;
pub mod error;
pub mod header;
pub mod palette;
pub mod stats;
pub mod translator;
pub mod validation;
pub mod volume;

pub use byte_order::{swap_f32_slice_in_place, swap_words_in_place, Endianness};
pub use error::{HeaderParseError, ProtocolError, RangeError};
pub use header::{
    AxisMapping, CiftiHeader, HeaderReader, MappingAxis, MappingType, MetaData, Parcel,
    Structure, SurfaceModel, VolumeMapEntry, VoxelModel,
};
pub use palette::{
    Palette, PaletteSettings, PaletteSource, ScalarColor, ScaleMode, ThresholdTest, ThresholdType,
};
pub use stats::{DescriptiveStatistics, FastStatistics, Histogram};
pub use translator::{BrainAddress, IndexTranslator, NO_INDEX};
pub use validation::{decode_wire_values, encode_wire_values, validate_wire_payload};
pub use volume::{Orientation, VolumeAttributes, VolumeGrid};

//! dconn - CIFTI connectivity-matrix access layer
//!
//! Uniform, lazy, indexable access to large rectangular connectivity
//! matrices, backed by a local on-disk file, an in-memory buffer, or a
//! remote HTTP-served XNAT resource.
//!
//! ## Architecture
//!
//! The workspace follows a model/implementation separation:
//!
//! - **dconn-core**: header model, index translation, wire validation,
//!   statistics, palettes (no I/O)
//! - **dconn**: concrete matrix sources, the per-map row cache, the
//!   coloring pipeline, and the file facade
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use dconn::{ConnectivityMatrixFile, DataLocation, PaletteBank, Structure};
//! use dconn_core::header::{AxisMapping, CiftiHeader, SurfaceModel};
//!
//! fn example() -> dconn::Result<()> {
//!     let surface = SurfaceModel::new(Structure::CortexLeft, 32492, &[(0, 0)]);
//!     let header = CiftiHeader::new(
//!         AxisMapping::brain_models(1, vec![surface.clone()], Vec::new()),
//!         AxisMapping::brain_models(1, vec![surface], Vec::new()),
//!     );
//!     let mut file = ConnectivityMatrixFile::open_local(
//!         "subject.dconn",
//!         header,
//!         0,
//!         DataLocation::OnDisk,
//!     )?;
//!     let row = file.load_map_data_for_surface_node(0, 32492, Structure::CortexLeft, 0)?;
//!     if row >= 0 {
//!         file.update_scalar_coloring_for_map(0, &PaletteBank::with_builtin_palettes())?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! All operations are synchronous on the caller's thread; there is no
//! internal locking, and concurrent load+read on one file instance must
//! be serialized externally.

// Re-export the core model
pub use dconn_core::{
    decode_wire_values, encode_wire_values, validate_wire_payload, AxisMapping, BrainAddress,
    CiftiHeader, DescriptiveStatistics, Endianness, FastStatistics, HeaderParseError,
    HeaderReader, Histogram, IndexTranslator, MappingAxis, MappingType, MetaData, Palette,
    PaletteSettings, PaletteSource, ProtocolError, RangeError, ScalarColor, ScaleMode, Structure,
    SurfaceModel, ThresholdTest, ThresholdType, VolumeAttributes, VolumeGrid, VolumeMapEntry,
    NO_INDEX,
};

pub mod coloring;
pub mod error;
pub mod file;
pub mod local;
pub mod map_content;
pub mod palette_bank;
#[cfg(feature = "http")]
pub mod remote;
pub mod source;
#[cfg(feature = "http")]
pub mod transport;
pub mod volume;

pub use coloring::color_scalars;
pub use error::{DconnError, Result};
pub use file::{ConnectivityMatrixFile, NodeValue, SceneState, VoxelValue};
pub use local::{DataLocation, LocalMatrixSource};
pub use map_content::MapContent;
pub use palette_bank::PaletteBank;
#[cfg(feature = "http")]
pub use remote::RemoteMatrixSource;
pub use source::{MatrixHandle, MatrixSource, SourceKind};
#[cfg(feature = "http")]
pub use transport::{RemoteAuth, TransportConfig, XnatTransport};
pub use volume::VolumeContent;

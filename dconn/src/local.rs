//! File-backed matrix source
//!
//! The payload is a raw row-major f32 matrix at a caller-supplied byte
//! offset inside the file; dimensions come from the injected header.
//! Dense matrices are huge, so the default access mode memory-maps the
//! file and copies single rows on demand; smaller files can be pulled
//! fully into memory at open time.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};

use dconn_core::header::{CiftiHeader, MappingAxis};

use crate::error::{DconnError, Result};
use crate::source::{check_index, MatrixSource};

/// Whether an opened file streams from disk or is held in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    OnDisk,
    InMemory,
}

#[derive(Debug)]
enum Storage {
    #[cfg(feature = "mmap")]
    Mapped { mmap: Mmap, data_offset: usize },
    Memory { values: Vec<f32> },
}

/// Matrix backed by a local file or an in-memory buffer.
#[derive(Debug)]
pub struct LocalMatrixSource {
    row_count: u64,
    column_count: u64,
    storage: Storage,
}

impl LocalMatrixSource {
    /// Open the matrix payload of `path`. Row and column counts are taken
    /// from the header's loading and viewing dimensions.
    pub fn open(
        path: impl AsRef<Path>,
        header: &CiftiHeader,
        data_offset: u64,
        location: DataLocation,
    ) -> Result<Self> {
        let path = path.as_ref();
        let (row_count, column_count) = declared_dimensions(header)?;
        let payload_len = row_count
            .checked_mul(column_count)
            .and_then(|cells| cells.checked_mul(4))
            .ok_or_else(|| DconnError::Open("matrix dimensions overflow".to_string()))?;

        let file = File::open(path).map_err(|err| {
            DconnError::Open(format!("cannot open {}: {err}", path.display()))
        })?;
        let file_len = file
            .metadata()
            .map_err(|err| DconnError::Open(format!("cannot stat {}: {err}", path.display())))?
            .len();
        if file_len < data_offset + payload_len {
            return Err(DconnError::Open(format!(
                "{} is {file_len} bytes, too short for a {row_count}x{column_count} matrix at offset {data_offset}",
                path.display()
            )));
        }

        let storage = match location {
            #[cfg(feature = "mmap")]
            DataLocation::OnDisk => {
                // SAFETY: read-only mapping of a file we just validated;
                // the mapping lives as long as the storage
                let mmap = unsafe {
                    MmapOptions::new().map(&file).map_err(|err| {
                        DconnError::Open(format!("cannot map {}: {err}", path.display()))
                    })?
                };
                Storage::Mapped {
                    mmap,
                    data_offset: data_offset as usize,
                }
            }
            #[cfg(not(feature = "mmap"))]
            DataLocation::OnDisk => {
                return Err(DconnError::Open(
                    "on-disk streaming requires the mmap feature".to_string(),
                ));
            }
            DataLocation::InMemory => {
                let mut file = file;
                file.seek(SeekFrom::Start(data_offset))?;
                let mut bytes = vec![0u8; payload_len as usize];
                file.read_exact(&mut bytes)?;
                let values = bytes
                    .chunks_exact(4)
                    .map(bytemuck::pod_read_unaligned::<f32>)
                    .collect();
                Storage::Memory { values }
            }
        };

        Ok(Self {
            row_count,
            column_count,
            storage,
        })
    }

    /// Wrap an in-memory value buffer as a matrix source.
    pub fn from_values(header: &CiftiHeader, values: Vec<f32>) -> Result<Self> {
        let (row_count, column_count) = declared_dimensions(header)?;
        if values.len() as u64 != row_count * column_count {
            return Err(DconnError::Open(format!(
                "buffer holds {} values, expected {row_count}x{column_count}",
                values.len()
            )));
        }
        Ok(Self {
            row_count,
            column_count,
            storage: Storage::Memory { values },
        })
    }

    fn cell(&self, row: u64, column: u64) -> f32 {
        let index = (row * self.column_count + column) as usize;
        match &self.storage {
            #[cfg(feature = "mmap")]
            Storage::Mapped { mmap, data_offset } => {
                let offset = data_offset + index * 4;
                bytemuck::pod_read_unaligned(&mmap[offset..offset + 4])
            }
            Storage::Memory { values } => values[index],
        }
    }
}

fn declared_dimensions(header: &CiftiHeader) -> Result<(u64, u64)> {
    let rows = header
        .dimension(MappingAxis::Loading)
        .ok_or_else(|| DconnError::Open("header does not declare a row count".to_string()))?;
    let columns = header
        .dimension(MappingAxis::Viewing)
        .ok_or_else(|| DconnError::Open("header does not declare a column count".to_string()))?;
    Ok((rows, columns))
}

impl MatrixSource for LocalMatrixSource {
    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn column_count(&self) -> u64 {
        self.column_count
    }

    fn get_row(&self, buffer: &mut [f32], row_index: i64) -> Result<()> {
        let row = check_index(row_index, self.row_count)?;
        debug_assert_eq!(buffer.len() as u64, self.column_count);
        match &self.storage {
            #[cfg(feature = "mmap")]
            Storage::Mapped { mmap, data_offset } => {
                let start = data_offset + (row * self.column_count) as usize * 4;
                let bytes = &mmap[start..start + self.column_count as usize * 4];
                for (value, chunk) in buffer.iter_mut().zip(bytes.chunks_exact(4)) {
                    *value = bytemuck::pod_read_unaligned(chunk);
                }
            }
            Storage::Memory { values } => {
                let start = (row * self.column_count) as usize;
                buffer.copy_from_slice(&values[start..start + self.column_count as usize]);
            }
        }
        Ok(())
    }

    fn get_column(&self, buffer: &mut [f32], column_index: i64) -> Result<()> {
        let column = check_index(column_index, self.column_count)?;
        debug_assert_eq!(buffer.len() as u64, self.row_count);
        for (row, value) in buffer.iter_mut().enumerate() {
            *value = self.cell(row as u64, column);
        }
        Ok(())
    }
}

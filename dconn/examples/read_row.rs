//! Read one row of a raw matrix file and print summary statistics.
//!
//! The payload is expected to be a row-major f32 matrix at the given
//! byte offset, as produced by stripping a dense connectivity file down
//! to its data section.

use clap::Parser;

use dconn::{DataLocation, LocalMatrixSource, MatrixSource};
use dconn_core::header::{AxisMapping, CiftiHeader, MappingType};
use dconn_core::stats::FastStatistics;

#[derive(Parser)]
#[command(about = "Read one matrix row and print its statistics")]
struct Args {
    /// Matrix file
    path: std::path::PathBuf,
    /// Number of rows
    #[arg(long)]
    rows: u64,
    /// Number of columns
    #[arg(long)]
    cols: u64,
    /// Byte offset of the payload
    #[arg(long, default_value_t = 0)]
    offset: u64,
    /// Row to read
    #[arg(long, default_value_t = 0)]
    row: i64,
    /// Pull the whole matrix into memory instead of mapping it
    #[arg(long)]
    in_memory: bool,
}

fn main() -> dconn::Result<()> {
    let args = Args::parse();
    let header = CiftiHeader::new(
        AxisMapping::plain(MappingType::Scalars, args.rows),
        AxisMapping::plain(MappingType::Scalars, args.cols),
    );
    let location = if args.in_memory {
        DataLocation::InMemory
    } else {
        DataLocation::OnDisk
    };
    let source = LocalMatrixSource::open(&args.path, &header, args.offset, location)?;

    let mut row = vec![0.0f32; source.column_count() as usize];
    source.get_row(&mut row, args.row)?;

    let mut stats = FastStatistics::new();
    stats.update(&row);
    println!(
        "row {}: {} values, mean {:.6}, min {:.6}, max {:.6}",
        args.row,
        row.len(),
        stats.mean(),
        stats.min(),
        stats.max()
    );
    for (column, value) in row.iter().take(10).enumerate() {
        println!("  [{column}] = {value}");
    }
    if row.len() > 10 {
        println!("  ... {} more", row.len() - 10);
    }
    Ok(())
}

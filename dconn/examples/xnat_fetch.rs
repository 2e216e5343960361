//! Fetch one row from an XNAT-served connectivity matrix.
//!
//! The metadata response is not parsed here; the dimensions are supplied
//! on the command line through a fixed-dimension header reader.

use clap::Parser;

use dconn::{MatrixSource, RemoteAuth, RemoteMatrixSource, TransportConfig};
use dconn_core::error::HeaderParseError;
use dconn_core::header::{AxisMapping, CiftiHeader, HeaderReader, MappingType};

#[derive(Parser)]
#[command(about = "Fetch one row from an XNAT connectivity resource")]
struct Args {
    /// Resource URL carrying a searchID= or resource= parameter
    url: String,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Number of rows the resource serves
    #[arg(long)]
    rows: u64,
    /// Number of columns the resource serves
    #[arg(long)]
    cols: u64,
    /// Row to fetch
    #[arg(long, default_value_t = 0)]
    row: i64,
}

/// Header reader that ignores the metadata body and reports fixed
/// dimensions.
struct FixedDimensions {
    rows: u64,
    cols: u64,
}

impl HeaderReader for FixedDimensions {
    fn read_header(&self, _body: &[u8]) -> Result<CiftiHeader, HeaderParseError> {
        Ok(CiftiHeader::new(
            AxisMapping::plain(MappingType::Scalars, self.rows),
            AxisMapping::plain(MappingType::Scalars, self.cols),
        ))
    }
}

fn main() -> dconn::Result<()> {
    let args = Args::parse();
    let auth = match (&args.username, &args.password) {
        (Some(username), Some(password)) => Some(RemoteAuth {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };
    let reader = FixedDimensions {
        rows: args.rows,
        cols: args.cols,
    };
    let (source, _header) =
        RemoteMatrixSource::open(&args.url, auth, &reader, TransportConfig::default())?;

    let mut row = vec![0.0f32; source.column_count() as usize];
    source.get_row(&mut row, args.row)?;
    println!("fetched {} values for row {}", row.len(), args.row);
    for (column, value) in row.iter().take(10).enumerate() {
        println!("  [{column}] = {value}");
    }
    Ok(())
}

//! End-to-end checks against a small on-disk matrix

use std::io::Write;

use dconn::{
    ConnectivityMatrixFile, DataLocation, LocalMatrixSource, MatrixSource, PaletteBank, Structure,
};
use dconn_core::header::{AxisMapping, CiftiHeader, SurfaceModel};

/// Header for a 2x4 matrix: loading axis maps LEFT-cortex nodes 0/1 onto
/// rows, viewing axis maps nodes 0..4 onto columns.
fn two_by_four_header() -> CiftiHeader {
    let loading = SurfaceModel::new(Structure::CortexLeft, 4, &[(0, 0), (1, 1)]);
    let viewing = SurfaceModel::new(Structure::CortexLeft, 4, &[(0, 0), (1, 1), (2, 2), (3, 3)]);
    CiftiHeader::new(
        AxisMapping::brain_models(2, vec![loading], Vec::new()),
        AxisMapping::brain_models(4, vec![viewing], Vec::new()),
    )
}

fn write_matrix_file(values: &[f32]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for value in values {
        file.write_all(&value.to_ne_bytes()).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn open_load_and_color_a_local_matrix() {
    let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let fixture = write_matrix_file(&data);

    for location in [DataLocation::OnDisk, DataLocation::InMemory] {
        let mut file = ConnectivityMatrixFile::open_local(
            fixture.path(),
            two_by_four_header(),
            0,
            location,
        )
        .unwrap();
        assert_eq!(file.row_count().unwrap(), 2);
        assert_eq!(file.column_count().unwrap(), 4);

        // node 1 resolves to row 1
        let row = file
            .load_map_data_for_surface_node(0, 4, Structure::CortexLeft, 1)
            .unwrap();
        assert_eq!(row, 1);
        assert_eq!(file.map_data(0).unwrap(), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(file.map_fast_statistics(0).unwrap().mean(), 6.5);

        file.update_scalar_coloring_for_map(0, &PaletteBank::with_builtin_palettes())
            .unwrap();
        let rgba = file.map_rgba(0).unwrap();
        assert_eq!(rgba.len(), 16);
        assert!(rgba.chunks_exact(4).all(|pixel| pixel[3] > 0));
    }
}

#[test]
fn row_reads_are_idempotent_across_modes() {
    let data = [0.5f32, -1.5, 2.5, -3.5, 4.5, -5.5, 6.5, -7.5];
    let fixture = write_matrix_file(&data);
    let header = two_by_four_header();

    for location in [DataLocation::OnDisk, DataLocation::InMemory] {
        let source = LocalMatrixSource::open(fixture.path(), &header, 0, location).unwrap();
        for row_index in 0..2 {
            let mut first = [0.0f32; 4];
            let mut second = [0.0f32; 4];
            source.get_row(&mut first, row_index).unwrap();
            source.get_row(&mut second, row_index).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn on_disk_and_in_memory_agree() {
    let data: Vec<f32> = (0..8).map(|i| i as f32 * 1.25).collect();
    let fixture = write_matrix_file(&data);
    let header = two_by_four_header();

    let on_disk =
        LocalMatrixSource::open(fixture.path(), &header, 0, DataLocation::OnDisk).unwrap();
    let in_memory =
        LocalMatrixSource::open(fixture.path(), &header, 0, DataLocation::InMemory).unwrap();

    let mut row_a = [0.0f32; 4];
    let mut row_b = [0.0f32; 4];
    on_disk.get_row(&mut row_a, 0).unwrap();
    in_memory.get_row(&mut row_b, 0).unwrap();
    assert_eq!(row_a, row_b);

    let mut column_a = [0.0f32; 2];
    let mut column_b = [0.0f32; 2];
    on_disk.get_column(&mut column_a, 3).unwrap();
    in_memory.get_column(&mut column_b, 3).unwrap();
    assert_eq!(column_a, column_b);
}

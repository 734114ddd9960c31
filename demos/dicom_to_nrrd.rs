//! Example: Write a synthetic CT series as an NRRD file from DICOM-style geometry
//!
//! Run with: cargo run --example dicom_to_nrrd

use ndarray::Array3;
use nrrd_volume::{
    read_header, read_volume, write_volume_with_options, VolumeMetadata, WriteOptions,
};

// Geometry as exported from a DICOM series (first slice position, cosines, spacing)
const SERIES_GEOMETRY: &str = r#"{
    "imagePosition": [-125.0, -140.5, 62.25],
    "imageOrientation": [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    "pixelSpacing": [0.976, 0.976],
    "sliceThickness": 2.5
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("nrrd-volume Example: DICOM series to NRRD");
    println!("=========================================\n");

    let metadata = VolumeMetadata::from_json(SERIES_GEOMETRY)?;
    println!("Geometry:");
    println!("  Origin:          {:?}", metadata.space_origin());
    for (axis, row) in metadata.space_directions().iter().enumerate() {
        println!("  Direction {}:     {:?}", axis, row);
    }
    println!("  Orthonormal:     {}", metadata.is_orthonormal(1e-6));
    println!();

    // (slices, rows, columns), Hounsfield-like ramp around a bright sphere
    let (slices, rows, columns) = (24, 64, 64);
    let voxels = Array3::from_shape_fn((slices, rows, columns), |(z, y, x)| {
        let dz = z as f64 - slices as f64 / 2.0;
        let dy = y as f64 - rows as f64 / 2.0;
        let dx = x as f64 - columns as f64 / 2.0;
        if dx * dx + dy * dy + (dz * 2.5) * (dz * 2.5) < 400.0 {
            400i16
        } else {
            -1000
        }
    });

    let options = WriteOptions::new()
        .with_content("synthetic phantom")
        .with_key_value("modality", "CT");

    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("phantom.nrrd");
    write_volume_with_options(&path, &voxels, &metadata, &options)?;
    println!("Wrote {} ({} bytes)", path.display(), std::fs::metadata(&path)?.len());

    let header = read_header(&path)?;
    println!("Header:");
    println!("  Type:   {}", header.data_type);
    println!("  Sizes:  {:?}", header.sizes);
    println!("  Origin: {:?}", header.space_origin);
    println!();

    let back: Array3<i16> = read_volume(&path)?;
    println!("Round trip matches: {}", back == voxels);

    let recovered = VolumeMetadata::from_header(&header)?;
    println!("Recovered geometry:\n{}", recovered.to_json()?);

    Ok(())
}

//! Voxel-to-world geometry: origin and direction/spacing matrix

use crate::metadata::VolumeMetadata;

/// A 3-vector in world (patient) space
pub type Vec3 = [f64; 3];

/// Row `i` is the world-space step taken when voxel index `i` (NRRD axis order) increases by one
pub type Matrix3 = [[f64; 3]; 3];

/// Standard right-handed cross product
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean length
pub fn norm(v: Vec3) -> f64 {
    dot(v, v).sqrt()
}

pub fn scale(v: Vec3, factor: f64) -> Vec3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

/// Unit vector along `v`; a zero vector stays zero.
pub fn normalize(v: Vec3) -> Vec3 {
    let len = norm(v);
    if len == 0.0 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

/// World position of the first voxel, copied verbatim from the image position.
pub fn space_origin(metadata: &VolumeMetadata) -> Vec3 {
    metadata.image_position
}

/// Build the `space directions` matrix.
///
/// Rows index voxel axes (column index, row index, slice index), columns index
/// world axes:
///
/// - row 0 = `pixel_spacing[0] * row_dir`
/// - row 1 = `pixel_spacing[1] * col_dir`
/// - row 2 = `slice_thickness * (row_dir x col_dir)`
///
/// The cross product is taken on the unscaled orientation vectors. Nothing is
/// checked for unit length or orthogonality.
pub fn space_directions(metadata: &VolumeMetadata) -> Matrix3 {
    let row_dir = metadata.row_direction();
    let col_dir = metadata.column_direction();
    let slice_dir = cross(row_dir, col_dir);

    [
        scale(row_dir, metadata.pixel_spacing[0]),
        scale(col_dir, metadata.pixel_spacing[1]),
        scale(slice_dir, metadata.slice_thickness),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn test_cross_axes() {
        assert_eq!(cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(cross([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]), [1.0, 0.0, 0.0]);
        assert_eq!(cross([0.0, 1.0, 0.0], [1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_axial_directions() {
        let metadata = VolumeMetadata::new(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [2.0, 2.0],
            5.0,
        );
        assert_eq!(
            space_directions(&metadata),
            [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 5.0]]
        );
        assert_eq!(space_origin(&metadata), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_coronal_directions() {
        // Coronal: rows run along +x, columns run along -z
        let metadata = VolumeMetadata::new(
            [-120.5, 30.0, 88.25],
            [1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
            [0.5, 0.75],
            3.0,
        );
        let directions = space_directions(&metadata);
        assert_eq!(directions[0], [0.5, 0.0, 0.0]);
        assert_eq!(directions[1], [0.0, 0.0, -0.75]);
        assert_eq!(directions[2], [0.0, 3.0, 0.0]);
        assert_eq!(space_origin(&metadata), [-120.5, 30.0, 88.25]);
    }

    #[test]
    fn test_slice_row_uses_unscaled_vectors() {
        let half = std::f64::consts::FRAC_1_SQRT_2;
        let metadata = VolumeMetadata::new(
            [0.0; 3],
            [half, half, 0.0, -half, half, 0.0],
            [4.0, 0.25],
            1.5,
        );
        let directions = space_directions(&metadata);
        let expected = scale(
            cross(metadata.row_direction(), metadata.column_direction()),
            1.5,
        );
        assert!(approx_eq(directions[2], expected));
        assert!(approx_eq(directions[2], [0.0, 0.0, 1.5]));
    }

    #[test]
    fn test_non_orthogonal_is_accepted() {
        let metadata = VolumeMetadata::new(
            [0.0; 3],
            [1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
            [1.0, 1.0],
            2.0,
        );
        let directions = space_directions(&metadata);
        assert_eq!(directions[1], [1.0, 1.0, 0.0]);
        assert_eq!(directions[2], [0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_normalize() {
        assert!(approx_eq(normalize([3.0, 0.0, 4.0]), [0.6, 0.0, 0.8]));
        assert_eq!(normalize([0.0; 3]), [0.0; 3]);
        assert_eq!(norm([3.0, 4.0, 0.0]), 5.0);
    }
}

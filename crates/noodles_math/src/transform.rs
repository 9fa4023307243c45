//! Row-major 4×4 transform conversion and finiteness checks.
//!
//! Entities carry their transform on the wire as sixteen row-major floats,
//! not as glam's native column-major layout. This module is the seam
//! between the two: the flat, wire-shaped representation the registry
//! stores and the codec ships, converted to and from a [`glam::Mat4`] for
//! any math the server needs to do on it.

use glam::Mat4;

/// A 4×4 transform matrix, stored row-major as the wire protocol requires.
pub type RowMajorTransform = [f32; 16];

/// The identity transform.
pub const IDENTITY: RowMajorTransform = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Convert a row-major transform to a [`glam::Mat4`].
#[must_use]
pub fn to_mat4(rows: &RowMajorTransform) -> Mat4 {
    // glam's `from_cols_array` expects column-major data, so transpose.
    let mut cols = [0.0f32; 16];
    for r in 0..4 {
        for c in 0..4 {
            cols[c * 4 + r] = rows[r * 4 + c];
        }
    }
    Mat4::from_cols_array(&cols)
}

/// Convert a [`glam::Mat4`] to a row-major transform.
#[must_use]
pub fn from_mat4(mat: Mat4) -> RowMajorTransform {
    let cols = mat.to_cols_array();
    let mut rows = [0.0f32; 16];
    for r in 0..4 {
        for c in 0..4 {
            rows[r * 4 + c] = cols[c * 4 + r];
        }
    }
    rows
}

/// Returns `true` iff every element is finite (not NaN, not ±infinity).
///
/// The registry rejects non-finite transforms and bounding boxes at
/// create/update time.
#[must_use]
pub fn is_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_roundtrips_through_mat4() {
        let mat = to_mat4(&IDENTITY);
        assert_eq!(mat, Mat4::IDENTITY);
        assert_eq!(from_mat4(mat), IDENTITY);
    }

    #[test]
    fn translation_survives_row_major_conversion() {
        let mat = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let rows = from_mat4(mat);
        // Row-major translation lives in the last column of each of the
        // first three rows: indices 3, 7, 11.
        assert_eq!([rows[3], rows[7], rows[11]], [1.0, 2.0, 3.0]);
        assert_eq!(to_mat4(&rows), mat);
    }

    #[test]
    fn finiteness_check_flags_nan_and_infinity() {
        assert!(is_finite(&IDENTITY));
        let mut bad = IDENTITY;
        bad[0] = f32::NAN;
        assert!(!is_finite(&bad));
        bad[0] = f32::INFINITY;
        assert!(!is_finite(&bad));
    }
}

//! Geometric utilities for landmark computations.

use nalgebra::{Point2, Vector2, Vector3};

use crate::types::Landmark;

/// Magnitudes below this are treated as zero-length vectors
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Euclidean distance in the image plane, ignoring depth
pub fn distance_2d(a: &Landmark, b: &Landmark) -> f64 {
    nalgebra::distance(&a.to_point2(), &b.to_point2())
}

/// Centroid of the given landmarks in the image plane
pub fn centroid_2d(points: &[Landmark]) -> Option<Point2<f64>> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.to_point2().coords);
    Some(Point2::from(sum / points.len() as f64))
}

/// 2D vector from `from` to `to`
pub fn vector_2d(from: &Landmark, to: &Landmark) -> Vector2<f64> {
    to.to_point2() - from.to_point2()
}

/// 3D vector from `from` to `to`
pub fn vector_3d(from: &Landmark, to: &Landmark) -> Vector3<f64> {
    to.to_vector3() - from.to_vector3()
}

/// Angle between two vectors in radians, `None` if either is zero-length
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Option<f64> {
    let norms = v1.norm() * v2.norm();
    if norms < DEGENERATE_EPSILON {
        None
    } else {
        Some((v1.dot(v2) / norms).clamp(-1.0, 1.0).acos())
    }
}

/// Z component of the cross product of two plane vectors
pub fn cross_z(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Heading of a plane vector in radians, range (-π, π]
pub fn heading(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

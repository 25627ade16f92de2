//! Point-cloud building
//!
//! Reduces the intersection field to a list of surface points for particle
//! seeding. Points live in the owner's local space and are shuffled into a
//! non-original order before export.

use std::path::PathBuf;

use glam::{Affine3A, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::field::IntersectionField;
use crate::mesh::rotated_tangent;

/// A sampled surface point in the owner's local space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub position: Vec3,
    /// Surface normal at the hit
    pub normal: Vec3,
    /// Flow direction at the hit, the mesh's rotated-tangent construction
    pub forward: Vec3,
}

/// A named point-cloud asset
///
/// The name is the stable identity; regeneration replaces the point list
/// wholesale via [`PointCloud::install`]. `source_file` records where the
/// serialized representation was last written.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    name: String,
    points: Vec<Point>,
    source_file: Option<PathBuf>,
}

impl PointCloud {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            source_file: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn source_file(&self) -> Option<&PathBuf> {
        self.source_file.as_ref()
    }

    pub fn set_source_file(&mut self, path: PathBuf) {
        self.source_file = Some(path);
    }

    /// Replace the point list, preserving identity
    pub fn install(&mut self, points: Vec<Point>) {
        self.points = points;
    }
}

/// Collect one point per hit cell, in owner-local space
pub fn build_points(field: &IntersectionField, transform: &Affine3A) -> Vec<Point> {
    let inverse = transform.inverse();
    // Inverse-transpose for normal directions
    let normal_matrix = transform.matrix3.transpose();
    let right = Vec3::from(transform.matrix3.x_axis).normalize_or_zero();

    let mut points = Vec::with_capacity(field.hit_count());
    for (_, _, cell) in field.iter() {
        let Some(hit) = cell.hit else { continue };
        let forward = rotated_tangent(cell.direction, right);
        points.push(Point {
            position: inverse.transform_point3(hit.position),
            normal: normal_matrix.mul_vec3(hit.normal).normalize_or_zero(),
            forward: inverse.transform_vector3(forward).normalize_or_zero(),
        });
    }
    points
}

/// Shuffle points into a non-original order
///
/// A fair Fisher-Yates permutation driven by the caller's generator; a
/// fixed seed reproduces the same order.
pub fn shuffle_points<R: Rng + ?Sized>(points: &mut [Point], rng: &mut R) {
    points.shuffle(rng);
}

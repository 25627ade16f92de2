//! Ray casting against scene obstacles
//!
//! The pipeline treats the scene as an opaque [`Raycaster`] capability: it
//! hands over a ray and a collision mask and gets back the nearest hit, if
//! any. The plane colliders here back the CLI and the tests; an engine
//! integration would implement [`Raycaster`] over its own physics world.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bit set of collision layers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// True when the two masks share at least one layer
    pub fn intersects(self, other: CollisionMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// A world-space ray with a finite reach
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub max_distance: f32,
}

/// First obstacle intersection along a ray, in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub position: Vec3,
    pub normal: Vec3,
}

/// Scene intersection capability supplied by the host
pub trait Raycaster {
    /// Nearest intersection within `ray.max_distance` on a layer in `mask`
    fn raycast(&self, ray: &Ray, mask: CollisionMask) -> Option<RayHit>;
}

/// An infinite plane obstacle on a set of collision layers
#[derive(Clone, Copy, Debug)]
pub struct PlaneCollider {
    /// Any point on the plane
    pub point: Vec3,
    /// Unit plane normal
    pub normal: Vec3,
    pub layers: CollisionMask,
}

impl PlaneCollider {
    /// Intersect a ray with the plane
    ///
    /// The reported normal faces against the ray.
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let distance = (self.point - ray.origin).dot(self.normal) / denom;
        if distance < 0.0 || distance > ray.max_distance {
            return None;
        }
        let normal = if denom > 0.0 { -self.normal } else { self.normal };
        Some(RayHit {
            distance,
            position: ray.origin + ray.direction * distance,
            normal,
        })
    }
}

/// A collection of plane obstacles answering nearest-hit queries
///
/// An empty set reports no intersections, which models a scene without
/// obstacles.
#[derive(Clone, Debug, Default)]
pub struct ColliderSet {
    colliders: Vec<PlaneCollider>,
}

impl ColliderSet {
    pub fn new(colliders: Vec<PlaneCollider>) -> Self {
        Self { colliders }
    }

    pub fn push(&mut self, collider: PlaneCollider) {
        self.colliders.push(collider);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl Raycaster for ColliderSet {
    fn raycast(&self, ray: &Ray, mask: CollisionMask) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;
        for collider in &self.colliders {
            if !collider.layers.intersects(mask) {
                continue;
            }
            if let Some(hit) = collider.intersect(ray) {
                if nearest.map_or(true, |n| hit.distance < n.distance) {
                    nearest = Some(hit);
                }
            }
        }
        nearest
    }
}

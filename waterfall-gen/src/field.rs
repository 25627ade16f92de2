//! Intersection field
//!
//! Casts one ray per grid cell against the scene and records the results.
//! The field is computed once per generation run and consumed immutably by
//! the flow-map and point-cloud builders, so both see identical hit data.

use glam::{Affine3A, Vec3};
use tracing::debug;

use crate::grid::SampleGrid;
use crate::raycast::{CollisionMask, Ray, RayHit, Raycaster};
use crate::spline::Spline;

/// One grid cell's ray and its first obstacle hit
#[derive(Clone, Copy, Debug)]
pub struct FieldCell {
    /// World-space ray origin, laterally offset from the centerline
    pub origin: Vec3,
    /// Unnormalized world-space step toward the next longitudinal sample
    pub direction: Vec3,
    /// Nearest obstacle intersection, if any
    pub hit: Option<RayHit>,
}

/// The sampled ray grid for one generation run
pub struct IntersectionField {
    grid: SampleGrid,
    cells: Vec<FieldCell>,
}

impl IntersectionField {
    /// Cast the full grid of rays against the scene
    ///
    /// Ray origins sit at the lateral sample positions; the direction is
    /// the unoffset centerline step from `t` to the next longitudinal
    /// sample, and its magnitude bounds the cast.
    pub fn cast(
        spline: &dyn Spline,
        transform: &Affine3A,
        grid: SampleGrid,
        half_width: f32,
        mask: CollisionMask,
        scene: &dyn Raycaster,
    ) -> Self {
        let right = Vec3::from(transform.matrix3.x_axis).normalize_or_zero();
        let rows = grid.rows();
        let mut cells = Vec::with_capacity(grid.cell_count());
        for y in 0..rows {
            let t = grid.t(y);
            let t_next = grid.t(y + 1);
            let center = transform.transform_point3(spline.evaluate_position(t));
            let center_next = transform.transform_point3(spline.evaluate_position(t_next));
            let direction = center_next - center;
            let max_distance = direction.length();
            let unit = direction.normalize_or_zero();
            for x in grid.lateral_range() {
                let origin = center + right * (grid.delta_x(x) * half_width);
                let hit = if max_distance > 0.0 {
                    let ray = Ray {
                        origin,
                        direction: unit,
                        max_distance,
                    };
                    scene.raycast(&ray, mask)
                } else {
                    None
                };
                cells.push(FieldCell {
                    origin,
                    direction,
                    hit,
                });
            }
        }
        let field = Self { grid, cells };
        debug!(
            "cast {} rays, {} hits",
            field.cells.len(),
            field.hit_count()
        );
        field
    }

    pub fn grid(&self) -> SampleGrid {
        self.grid
    }

    /// Cell at longitudinal row `y` and column `col` in `[0, vertex_cols)`
    pub fn cell(&self, y: usize, col: usize) -> &FieldCell {
        &self.cells[y * self.grid.vertex_cols() + col]
    }

    /// Iterate cells as `(row, lateral index, cell)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, i32, &FieldCell)> + '_ {
        let cols = self.grid.vertex_cols();
        let half = self.grid.iterations_x() as i32;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i / cols), (i % cols) as i32 - half, cell))
    }

    pub fn hit_count(&self) -> usize {
        self.cells.iter().filter(|c| c.hit.is_some()).count()
    }
}

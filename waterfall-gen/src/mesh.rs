//! Waterfall mesh building
//!
//! Converts the sample grid into a quad-faced mesh: positions, normals, and
//! three UV channels. Channel 0 carries the planar grid position, channel 1
//! curvature and remaining arc length, channel 2 the physical lateral
//! offset. Topology never depends on ray hits; every grid vertex is
//! emitted.

use glam::{Affine3A, Quat, Vec3};

use crate::config::{NormalSource, WaterfallConfig};
use crate::grid::SampleGrid;
use crate::spline::Spline;

/// Mesh buffers produced by one generation run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions in the owner's local space
    pub positions: Vec<Vec3>,
    /// Vertex normals in the owner's local space
    pub normals: Vec<Vec3>,
    /// (lateral fraction in [0, 1], t)
    pub uv0: Vec<[f32; 2]>,
    /// (curvature, remaining arc length)
    pub uv1: Vec<[f32; 2]>,
    /// (lateral offset in world units, t)
    pub uv2: Vec<[f32; 2]>,
    /// Quad faces, wound consistently
    pub quads: Vec<[u32; 4]>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }
}

/// A named waterfall mesh asset
///
/// The name is the stable identity external systems reference; regeneration
/// swaps the buffers underneath it via [`WaterfallMesh::install`].
#[derive(Clone, Debug, Default)]
pub struct WaterfallMesh {
    name: String,
    buffers: MeshBuffers,
}

impl WaterfallMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffers: MeshBuffers::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Replace the mesh contents, preserving identity
    pub fn install(&mut self, buffers: MeshBuffers) {
        self.buffers = buffers;
    }
}

/// Rotated-tangent vector in world space
///
/// The tangent projected off the right axis and turned a quarter turn
/// about it; the same construction feeds the mesh's analytic normals and
/// the point cloud's forward vectors.
pub(crate) fn rotated_tangent(direction: Vec3, right: Vec3) -> Vec3 {
    let projected = (direction - right * direction.dot(right)).normalize_or_zero();
    Quat::from_axis_angle(right, -std::f32::consts::FRAC_PI_2) * projected
}

/// Build the waterfall mesh buffers
///
/// `length` is the curve's world-space arc length under `transform`.
/// Analytic normals are always assigned during the build; when the config
/// selects [`NormalSource::Geometric`] they are then overwritten by
/// [`recalculate_normals`].
pub fn build_mesh(
    spline: &dyn Spline,
    transform: &Affine3A,
    grid: SampleGrid,
    config: &WaterfallConfig,
    length: f32,
) -> MeshBuffers {
    let inverse = transform.inverse();
    let right = Vec3::from(transform.matrix3.x_axis).normalize_or_zero();
    let half_width = config.half_width();
    let rows = grid.rows();
    let cols = grid.vertex_cols();

    let vertex_count = cols * grid.vertex_rows();
    let mut buffers = MeshBuffers {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        uv0: Vec::with_capacity(vertex_count),
        uv1: Vec::with_capacity(vertex_count),
        uv2: Vec::with_capacity(vertex_count),
        quads: Vec::with_capacity((cols - 1) * rows),
    };

    for y in 0..=rows {
        let t = grid.t(y);
        let center = transform.transform_point3(spline.evaluate_position(t));

        // Forward difference, backward only at the closing row
        let direction = if y == rows {
            center - transform.transform_point3(spline.evaluate_position(grid.t(y - 1)))
        } else {
            transform.transform_point3(spline.evaluate_position(grid.t(y + 1))) - center
        };
        let normal = inverse
            .transform_vector3(rotated_tangent(direction, right))
            .normalize_or_zero();

        // Curvature is pinned to 0 at both end rows
        let curvature = if y == 0 || y == rows {
            0.0
        } else {
            spline.evaluate_curvature(t)
        };

        for x in grid.lateral_range() {
            let delta_x = grid.delta_x(x);
            let world = center + right * (delta_x * half_width);
            buffers.positions.push(inverse.transform_point3(world));
            buffers.normals.push(normal);

            let lateral = (delta_x + 1.0) * 0.5;
            buffers.uv0.push([lateral, t]);
            buffers.uv1.push([curvature, length - length * t]);
            buffers.uv2.push([lateral * half_width, t]);

            if x < grid.iterations_x() as i32 && y < rows {
                let col = grid.column(x) as u32;
                let row = y as u32;
                let stride = cols as u32;
                buffers.quads.push([
                    col + row * stride,
                    col + (row + 1) * stride,
                    col + 1 + (row + 1) * stride,
                    col + 1 + row * stride,
                ]);
            }
        }
    }

    if config.normal_source == NormalSource::Geometric {
        recalculate_normals(&mut buffers);
    }
    buffers
}

/// Recompute vertex normals from the final geometry
///
/// Each quad contributes the area-weighted normals of its two triangles to
/// its corner vertices; accumulated normals are renormalized. Vertices on
/// degenerate faces keep their previous normal.
pub fn recalculate_normals(buffers: &mut MeshBuffers) {
    let mut accumulated = vec![Vec3::ZERO; buffers.positions.len()];
    for quad in &buffers.quads {
        for tri in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
            let a = buffers.positions[tri[0] as usize];
            let b = buffers.positions[tri[1] as usize];
            let c = buffers.positions[tri[2] as usize];
            let face = (b - a).cross(c - a);
            for index in tri {
                accumulated[index as usize] += face;
            }
        }
    }
    for (normal, sum) in buffers.normals.iter_mut().zip(accumulated) {
        let recomputed = sum.normalize_or_zero();
        if recomputed != Vec3::ZERO {
            *normal = recomputed;
        }
    }
}

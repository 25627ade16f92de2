//! Generation parameters

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::raycast::CollisionMask;

/// Which normal computation is authoritative for the final mesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSource {
    /// Normals derived analytically from the curve tangent
    Analytic,
    /// Normals recomputed from the final geometry
    #[default]
    Geometric,
}

/// User-authored parameters controlling a generation run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterfallConfig {
    /// Layers the water collides with
    pub collision_mask: CollisionMask,
    /// Full width of the waterfall; lateral samples span half of it to
    /// either side of the centerline
    pub width: f32,
    /// Lateral sample iterations (vertex columns = 2 * iterations_x + 1)
    pub iterations_x: u32,
    /// Longitudinal sample iterations per curve segment
    pub iterations_y: u32,
    /// Authoritative normal computation for the mesh
    pub normal_source: NormalSource,
    /// Seed for the point-cloud shuffle
    pub seed: u64,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            collision_mask: CollisionMask::ALL,
            width: 1.0,
            iterations_x: 5,
            iterations_y: 5,
            normal_source: NormalSource::default(),
            seed: 0,
        }
    }
}

impl WaterfallConfig {
    /// Lateral reach from the centerline
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Clamp degenerate values at the configuration boundary
    ///
    /// The generation algorithms assume `iterations_* >= 1` and a positive
    /// width.
    pub fn sanitize(mut self) -> Self {
        if self.iterations_x < 1 {
            warn!("iterations_x must be >= 1, clamping");
            self.iterations_x = 1;
        }
        if self.iterations_y < 1 {
            warn!("iterations_y must be >= 1, clamping");
            self.iterations_y = 1;
        }
        if !(self.width > 0.0) {
            warn!("width must be > 0.0, clamping to 0.001");
            self.width = 0.001;
        }
        self
    }
}

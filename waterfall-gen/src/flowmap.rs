//! Flow-map rasterization
//!
//! Paints a texture encoding where the water strikes obstacles: a neutral
//! base everywhere, a wet marker per hit cell, then a falloff pass that
//! trails fading intensity down the image below every wet pixel.

use tracing::debug;

use crate::field::IntersectionField;
use crate::grid::SampleGrid;

/// Neutral base color
pub const FLOW_BASE: [f32; 4] = [0.5, 0.5, 0.0, 1.0];
/// Marker written where a ray struck an obstacle
pub const FLOW_WET: [f32; 4] = [0.5, 0.5, 1.0, 1.0];
/// Falloff run length per longitudinal iteration, in pixels
const FLOW_RANGE_PER_ITERATION: u32 = 15;

/// Float RGBA pixel buffer
///
/// Pixels stay in float precision for the whole rasterization; quantizing
/// to 8 bits happens only at PNG export.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPixels {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, row 0 at the top of the fall
    pub pixels: Vec<[f32; 4]>,
}

impl FlowPixels {
    /// Create a buffer filled with a solid color
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        self.pixels[(y * self.width + x) as usize] = color;
    }
}

/// A named flow-map texture asset
///
/// The name is the stable identity; [`FlowMap::install`] swaps the pixel
/// buffer underneath it, resizing when the grid resolution changed.
#[derive(Clone, Debug)]
pub struct FlowMap {
    name: String,
    pixels: FlowPixels,
}

impl FlowMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pixels: FlowPixels::filled(1, 1, FLOW_BASE),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixels(&self) -> &FlowPixels {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    pub fn height(&self) -> u32 {
        self.pixels.height
    }

    /// Replace the texture contents, preserving identity
    pub fn install(&mut self, pixels: FlowPixels) {
        if pixels.width != self.pixels.width || pixels.height != self.pixels.height {
            debug!(
                "flow map '{}' resized {}x{} -> {}x{}",
                self.name, self.pixels.width, self.pixels.height, pixels.width, pixels.height
            );
        }
        self.pixels = pixels;
    }
}

/// Flow-map dimensions for a grid and curve length
///
/// One pixel column per vertex column; the pixel height keeps the texel
/// aspect tied to the curve length over the lateral reach. Height is
/// clamped to at least one row.
pub fn flow_map_size(grid: SampleGrid, curve_length: f32, half_width: f32) -> (u32, u32) {
    let width = grid.vertex_cols() as u32;
    let height = (width as f32 * curve_length / half_width.max(1.0)) as u32;
    (width, height.max(1))
}

/// Rasterize the flow map from the intersection field
///
/// Pass 1 marks a wet pixel for every cell whose ray struck an obstacle,
/// placed by the normalized hit position within the cell's row band. Pass 2
/// trails the markers downward.
pub fn rasterize_flow_map(
    field: &IntersectionField,
    curve_length: f32,
    half_width: f32,
) -> FlowPixels {
    let grid = field.grid();
    let (width, height) = flow_map_size(grid, curve_length, half_width);
    let mut map = FlowPixels::filled(width, height, FLOW_BASE);

    let rows = grid.rows() as f32;
    for (y, x, cell) in field.iter() {
        let Some(hit) = cell.hit else { continue };
        let ray_length = cell.direction.length();
        if ray_length <= 0.0 {
            continue;
        }
        let u = (x + grid.iterations_x() as i32) as f32 / width as f32;
        let v = (hit.distance / ray_length) / rows + grid.t(y);
        let px = (u * width as f32) as u32;
        let py = (v * height as f32) as u32;
        if px < width && py < height {
            map.set_pixel(px, py, FLOW_WET);
        }
    }

    propagate_flow(&mut map, grid.iterations_y());
    map
}

/// Downstream falloff pass
///
/// Every wet pixel (blue above the neutral 0.5) writes a linearly decaying
/// intensity into the green and blue channels of the pixels below it.
/// Sources are read from a snapshot taken before any write, so freshly
/// written trail pixels never seed further propagation; writes max-merge
/// into the live buffer, so overlapping trails keep the strongest value.
pub fn propagate_flow(map: &mut FlowPixels, iterations_y: u32) {
    let snapshot = map.pixels.clone();
    let run = FLOW_RANGE_PER_ITERATION * iterations_y;
    for x in 0..map.width {
        for y in 0..map.height {
            let source = snapshot[(y * map.width + x) as usize];
            if source[2] <= 0.5 {
                continue;
            }
            for i in 0..run {
                let py = y + i;
                if py >= map.height {
                    break;
                }
                let falloff = 0.5 + 0.5 * (1.0 - i as f32 / run as f32);
                let mut pixel = map.get_pixel(x, py);
                pixel[1] = pixel[1].max(falloff);
                pixel[2] = pixel[2].max(falloff);
                pixel[3] = 1.0;
                map.set_pixel(x, py, pixel);
            }
        }
    }
}

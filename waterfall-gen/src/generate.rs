//! Top-level generation pipeline
//!
//! One synchronous pass: cast the intersection field, build the mesh, the
//! flow map, and the point cloud from it, then install the results into the
//! asset bundle and persist them. All three outputs are built completely
//! before any asset is touched, so a failure mid-build leaves the previous
//! generation intact.

use std::io;

use glam::Affine3A;
use rand::Rng;
use tracing::{info, warn};

use crate::assets::{AssetStore, WaterfallAssets};
use crate::config::WaterfallConfig;
use crate::field::IntersectionField;
use crate::flowmap::rasterize_flow_map;
use crate::grid::SampleGrid;
use crate::mesh::build_mesh;
use crate::points::{build_points, shuffle_points};
use crate::raycast::Raycaster;
use crate::spline::Spline;

/// Counts and dimensions reported by one generation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub vertex_count: usize,
    pub quad_count: usize,
    pub point_count: usize,
    pub flow_map_width: u32,
    pub flow_map_height: u32,
}

/// Run the full generation pipeline
///
/// A missing spline generates nothing and succeeds with `None`; the
/// waterfall simply has nothing to build yet. The shuffle draws from the
/// caller's generator; seed it for reproducible output.
pub fn generate_assets<R: Rng + ?Sized>(
    spline: Option<&dyn Spline>,
    transform: &Affine3A,
    config: &WaterfallConfig,
    scene: &dyn Raycaster,
    assets: &mut WaterfallAssets,
    store: &mut dyn AssetStore,
    rng: &mut R,
) -> io::Result<Option<GenerateSummary>> {
    let Some(spline) = spline else {
        warn!("no spline assigned, nothing to generate");
        return Ok(None);
    };

    let config = config.sanitize();
    let grid = SampleGrid::new(
        spline.segment_count(),
        config.iterations_x,
        config.iterations_y,
    );
    let length = spline.arc_length(transform);
    let field = IntersectionField::cast(
        spline,
        transform,
        grid,
        config.half_width(),
        config.collision_mask,
        scene,
    );

    let mesh = build_mesh(spline, transform, grid, &config, length);
    let flow = rasterize_flow_map(&field, length, config.half_width());
    let mut points = build_points(&field, transform);
    shuffle_points(&mut points, rng);

    let summary = GenerateSummary {
        vertex_count: mesh.vertex_count(),
        quad_count: mesh.quad_count(),
        point_count: points.len(),
        flow_map_width: flow.width,
        flow_map_height: flow.height,
    };

    assets.mesh.install(mesh);
    assets.flow_map.install(flow);
    assets.point_cloud.install(points);

    store.save_mesh(&assets.mesh)?;
    store.save_flow_map(&assets.flow_map)?;
    store.save_point_cloud(&mut assets.point_cloud)?;

    info!(
        "generated {} vertices, {} quads, {} points, {}x{} flow map",
        summary.vertex_count,
        summary.quad_count,
        summary.point_count,
        summary.flow_map_width,
        summary.flow_map_height
    );
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FsAssetStore;
    use crate::flowmap::FLOW_BASE;
    use crate::pcache::read_pcache_file;
    use crate::raycast::{ColliderSet, CollisionMask, PlaneCollider};
    use crate::spline::CatmullRomSpline;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Straight fall of length 10 crossing a floor plane
    fn drop_spline() -> CatmullRomSpline {
        CatmullRomSpline::new(vec![Vec3::ZERO, Vec3::new(0.0, -10.0, 0.0)])
    }

    fn floor_scene() -> ColliderSet {
        ColliderSet::new(vec![PlaneCollider {
            point: Vec3::new(0.0, -0.5, 0.0),
            normal: Vec3::Y,
            layers: CollisionMask::ALL,
        }])
    }

    fn config() -> WaterfallConfig {
        WaterfallConfig {
            width: 2.0,
            iterations_x: 1,
            iterations_y: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_run_against_a_flat_obstacle() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(dir.path()).unwrap();
        let mut assets = WaterfallAssets::new("Falls");
        let spline = drop_spline();
        let mut rng = Pcg32::seed_from_u64(1);

        let summary = generate_assets(
            Some(&spline),
            &Affine3A::IDENTITY,
            &config(),
            &floor_scene(),
            &mut assets,
            &mut store,
            &mut rng,
        )
        .unwrap()
        .expect("a spline was assigned");

        // 3 columns by (segments * iterations_y + 1) rows
        assert_eq!(summary.vertex_count, 3 * 2);
        assert_eq!(summary.quad_count, 2);
        // The floor crosses the single row band, so every column hits
        assert_eq!(summary.point_count, 3);
        assert_eq!(summary.flow_map_width, 3);

        // Every sampled column carries a wet marker plus trail
        let pixels = assets.flow_map.pixels();
        for x in 0..pixels.width {
            let wet = (0..pixels.height).any(|y| pixels.get_pixel(x, y)[2] > 0.5);
            assert!(wet, "column {x} should be wet");
        }

        let on_disk = read_pcache_file(&dir.path().join("Falls.pcache")).unwrap();
        assert_eq!(on_disk, assets.point_cloud.points());
        assert!(dir.path().join("Falls_Mesh.obj").exists());
        assert!(dir.path().join("Falls_FlowMap.png").exists());
    }

    #[test]
    fn test_empty_scene_still_builds_the_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(dir.path()).unwrap();
        let mut assets = WaterfallAssets::new("Falls");
        let spline = drop_spline();
        let mut rng = Pcg32::seed_from_u64(1);

        let summary = generate_assets(
            Some(&spline),
            &Affine3A::IDENTITY,
            &config(),
            &ColliderSet::default(),
            &mut assets,
            &mut store,
            &mut rng,
        )
        .unwrap()
        .unwrap();

        assert_eq!(summary.vertex_count, 6);
        assert_eq!(summary.quad_count, 2);
        assert_eq!(summary.point_count, 0);
        assert!(assets
            .flow_map
            .pixels()
            .pixels
            .iter()
            .all(|p| *p == FLOW_BASE));
    }

    #[test]
    fn test_missing_spline_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(dir.path()).unwrap();
        let mut assets = WaterfallAssets::new("Falls");
        let mut rng = Pcg32::seed_from_u64(1);

        let summary = generate_assets(
            None,
            &Affine3A::IDENTITY,
            &config(),
            &ColliderSet::default(),
            &mut assets,
            &mut store,
            &mut rng,
        )
        .unwrap();

        assert!(summary.is_none());
        assert_eq!(assets.mesh.buffers().vertex_count(), 0);
        assert!(!dir.path().join("Falls_Mesh.obj").exists());
    }

    #[test]
    fn test_regeneration_keeps_asset_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(dir.path()).unwrap();
        let mut assets = WaterfallAssets::new("Falls");
        let spline = drop_spline();
        let mut rng = Pcg32::seed_from_u64(1);

        for iterations in [1u32, 3] {
            let config = WaterfallConfig {
                iterations_x: iterations,
                iterations_y: iterations,
                ..config()
            };
            generate_assets(
                Some(&spline),
                &Affine3A::IDENTITY,
                &config,
                &floor_scene(),
                &mut assets,
                &mut store,
                &mut rng,
            )
            .unwrap();
            assert_eq!(assets.mesh.name(), "Falls_Mesh");
            assert_eq!(assets.flow_map.name(), "Falls_FlowMap");
            assert_eq!(assets.flow_map.width(), 2 * iterations + 1);
        }
    }

    #[test]
    fn test_same_seed_reproduces_the_point_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(dir.path()).unwrap();
        let spline = drop_spline();
        let config = WaterfallConfig {
            iterations_x: 4,
            iterations_y: 2,
            ..config()
        };

        let mut runs = Vec::new();
        for _ in 0..2 {
            let mut assets = WaterfallAssets::new("Falls");
            let mut rng = Pcg32::seed_from_u64(9);
            generate_assets(
                Some(&spline),
                &Affine3A::IDENTITY,
                &config,
                &floor_scene(),
                &mut assets,
                &mut store,
                &mut rng,
            )
            .unwrap();
            runs.push(assets.point_cloud.points().to_vec());
        }
        assert_eq!(runs[0], runs[1]);
        assert!(!runs[0].is_empty());
    }
}

//! Waterfall asset generation
//!
//! Offline authoring pipeline for spline-placed waterfalls: sample the
//! curve, cast a grid of rays against the scene, and build three assets
//! from the results: a quad-grid mesh, a flow-map texture marking where
//! the water strikes obstacles, and a shuffled point cloud for particle
//! seeding. The pipeline runs once per authoring request; nothing here is
//! a runtime simulation.
//!
//! The scene, the curve, and asset storage are capabilities the host
//! supplies through the [`Raycaster`], [`Spline`], and [`AssetStore`]
//! traits; plane colliders, a Catmull-Rom spline, and a filesystem store
//! ship for tools and tests.
//!
//! # Example
//! ```no_run
//! use glam::{Affine3A, Vec3};
//! use rand::SeedableRng;
//! use waterfall_gen::{
//!     generate_assets, CatmullRomSpline, ColliderSet, CollisionMask, FsAssetStore,
//!     PlaneCollider, WaterfallAssets, WaterfallConfig,
//! };
//!
//! let spline = CatmullRomSpline::new(vec![Vec3::ZERO, Vec3::new(0.0, -10.0, 0.0)]);
//! let scene = ColliderSet::new(vec![PlaneCollider {
//!     point: Vec3::new(0.0, -8.0, 0.0),
//!     normal: Vec3::Y,
//!     layers: CollisionMask::ALL,
//! }]);
//! let config = WaterfallConfig {
//!     width: 2.0,
//!     ..Default::default()
//! };
//!
//! let mut assets = WaterfallAssets::new("Falls");
//! let mut store = FsAssetStore::new("assets")?;
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(config.seed);
//! generate_assets(
//!     Some(&spline),
//!     &Affine3A::IDENTITY,
//!     &config,
//!     &scene,
//!     &mut assets,
//!     &mut store,
//!     &mut rng,
//! )?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod assets;
pub mod config;
pub mod export;
pub mod field;
pub mod flowmap;
pub mod generate;
pub mod grid;
pub mod mesh;
pub mod pcache;
pub mod points;
pub mod raycast;
pub mod spline;

pub use assets::{AssetStore, FsAssetStore, WaterfallAssets};
pub use config::{NormalSource, WaterfallConfig};
pub use field::{FieldCell, IntersectionField};
pub use flowmap::{flow_map_size, rasterize_flow_map, FlowMap, FlowPixels, FLOW_BASE, FLOW_WET};
pub use generate::{generate_assets, GenerateSummary};
pub use grid::SampleGrid;
pub use mesh::{build_mesh, recalculate_normals, MeshBuffers, WaterfallMesh};
pub use pcache::{read_pcache, read_pcache_file, write_pcache, PcacheError};
pub use points::{build_points, shuffle_points, Point, PointCloud};
pub use raycast::{ColliderSet, CollisionMask, PlaneCollider, Ray, RayHit, Raycaster};
pub use spline::{CatmullRomSpline, Spline};

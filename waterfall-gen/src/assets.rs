//! Generated asset bundle and storage boundary
//!
//! The three outputs of a waterfall are created once and kept alive across
//! regenerations, so systems holding a reference to them stay valid; each
//! generation run swaps the contents underneath the stable names.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::export::{write_obj, write_png};
use crate::flowmap::FlowMap;
use crate::mesh::WaterfallMesh;
use crate::pcache;
use crate::points::PointCloud;

/// The assets produced by one waterfall
pub struct WaterfallAssets {
    pub mesh: WaterfallMesh,
    pub flow_map: FlowMap,
    pub point_cloud: PointCloud,
}

impl WaterfallAssets {
    /// Create an empty bundle with names derived from a base name
    pub fn new(base_name: &str) -> Self {
        Self {
            mesh: WaterfallMesh::new(format!("{base_name}_Mesh")),
            flow_map: FlowMap::new(format!("{base_name}_FlowMap")),
            point_cloud: PointCloud::new(base_name),
        }
    }
}

/// Storage collaborator: persists generated assets by name
///
/// The pipeline only ever hands over finished buffers; interpretation of
/// paths and formats stays on this side of the boundary.
pub trait AssetStore {
    fn save_mesh(&mut self, mesh: &WaterfallMesh) -> io::Result<PathBuf>;
    fn save_flow_map(&mut self, map: &FlowMap) -> io::Result<PathBuf>;
    fn save_point_cloud(&mut self, cloud: &mut PointCloud) -> io::Result<PathBuf>;
}

/// Filesystem store writing OBJ, PNG, and pcache files under one root
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    /// Create the store, making sure the root directory exists
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{name}.{extension}"))
    }
}

impl AssetStore for FsAssetStore {
    fn save_mesh(&mut self, mesh: &WaterfallMesh) -> io::Result<PathBuf> {
        let path = self.path_for(mesh.name(), "obj");
        write_obj(mesh.buffers(), &path, mesh.name())?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    fn save_flow_map(&mut self, map: &FlowMap) -> io::Result<PathBuf> {
        let path = self.path_for(map.name(), "png");
        write_png(map.pixels(), &path)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    fn save_point_cloud(&mut self, cloud: &mut PointCloud) -> io::Result<PathBuf> {
        let path = self.path_for(cloud.name(), "pcache");
        pcache::update_file(Some(cloud), &path)?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}

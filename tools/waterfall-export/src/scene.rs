//! Scene manifest loading
//!
//! A scene.toml manifest stands in for the authoring scene: the spline's
//! control points, the owner transform, the waterfall parameters, and the
//! obstacle set the water can collide with.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glam::{Affine3A, EulerRot, Quat, Vec3};
use serde::Deserialize;
use waterfall_gen::{CatmullRomSpline, ColliderSet, CollisionMask, PlaneCollider, WaterfallConfig};

/// Root of a scene.toml manifest
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Base name for the generated assets
    pub name: String,
    /// Output directory for generated files
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub waterfall: WaterfallConfig,
    pub curve: CurveSpec,
    #[serde(default)]
    pub transform: TransformSpec,
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
}

/// Spline control points in the spline's local space
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurveSpec {
    pub points: Vec<[f32; 3]>,
}

/// Owner transform: translation, XYZ euler rotation in degrees, uniform scale
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformSpec {
    pub translation: [f32; 3],
    pub rotation_degrees: [f32; 3],
    pub scale: f32,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation_degrees: [0.0; 3],
            scale: 1.0,
        }
    }
}

/// An infinite plane obstacle
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleSpec {
    /// Any point on the plane
    pub point: [f32; 3],
    pub normal: [f32; 3],
    /// Collision layer bits
    #[serde(default = "default_layers")]
    pub layers: u32,
}

fn default_output() -> PathBuf {
    PathBuf::from("assets")
}

fn default_layers() -> u32 {
    u32::MAX
}

impl Scene {
    pub fn validate(&self) -> Result<()> {
        if self.curve.points.len() < 2 {
            bail!("curve needs at least 2 control points");
        }
        if !(self.transform.scale > 0.0) {
            bail!("transform.scale must be > 0");
        }
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if Vec3::from(obstacle.normal).length_squared() <= f32::EPSILON {
                bail!("obstacle {index} has a zero normal");
            }
        }
        Ok(())
    }

    pub fn build_spline(&self) -> CatmullRomSpline {
        CatmullRomSpline::new(self.curve.points.iter().map(|&p| Vec3::from(p)).collect())
    }

    pub fn build_colliders(&self) -> ColliderSet {
        ColliderSet::new(
            self.obstacles
                .iter()
                .map(|obstacle| PlaneCollider {
                    point: Vec3::from(obstacle.point),
                    normal: Vec3::from(obstacle.normal).normalize(),
                    layers: CollisionMask(obstacle.layers),
                })
                .collect(),
        )
    }

    pub fn transform(&self) -> Affine3A {
        let spec = &self.transform;
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            spec.rotation_degrees[0].to_radians(),
            spec.rotation_degrees[1].to_radians(),
            spec.rotation_degrees[2].to_radians(),
        );
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(spec.scale),
            rotation,
            Vec3::from(spec.translation),
        )
    }
}

/// Load and validate a scene manifest
pub fn load_scene(path: &Path) -> Result<Scene> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {}", path.display()))?;
    let scene: Scene =
        toml::from_str(&text).with_context(|| format!("Failed to parse scene: {}", path.display()))?;
    scene.validate()?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        name = "Falls"
        output = "out"

        [waterfall]
        width = 2.0
        iterations_x = 3
        iterations_y = 2
        seed = 7

        [curve]
        points = [[0.0, 0.0, 0.0], [0.0, -5.0, 1.0], [0.0, -10.0, 0.0]]

        [transform]
        translation = [10.0, 0.0, 0.0]
        rotation_degrees = [0.0, 90.0, 0.0]

        [[obstacles]]
        point = [0.0, -8.0, 0.0]
        normal = [0.0, 1.0, 0.0]
        layers = 1
    "#;

    #[test]
    fn test_parse_full_scene() {
        let scene: Scene = toml::from_str(SCENE).unwrap();
        scene.validate().unwrap();
        assert_eq!(scene.name, "Falls");
        assert_eq!(scene.output, PathBuf::from("out"));
        assert_eq!(scene.waterfall.iterations_x, 3);
        assert_eq!(scene.waterfall.seed, 7);
        assert_eq!(scene.curve.points.len(), 3);
        assert_eq!(scene.obstacles.len(), 1);
        assert_eq!(scene.build_colliders().len(), 1);
    }

    #[test]
    fn test_defaults() {
        let scene: Scene = toml::from_str(
            r#"
            name = "Falls"
            [curve]
            points = [[0.0, 0.0, 0.0], [0.0, -1.0, 0.0]]
            "#,
        )
        .unwrap();
        scene.validate().unwrap();
        assert_eq!(scene.output, PathBuf::from("assets"));
        assert_eq!(scene.transform.scale, 1.0);
        assert!(scene.obstacles.is_empty());
        assert_eq!(scene.waterfall, WaterfallConfig::default());
    }

    #[test]
    fn test_single_point_curve_is_rejected() {
        let scene: Scene = toml::from_str(
            r#"
            name = "Falls"
            [curve]
            points = [[0.0, 0.0, 0.0]]
            "#,
        )
        .unwrap();
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_zero_normal_obstacle_is_rejected() {
        let scene: Scene = toml::from_str(
            r#"
            name = "Falls"
            [curve]
            points = [[0.0, 0.0, 0.0], [0.0, -1.0, 0.0]]
            [[obstacles]]
            point = [0.0, 0.0, 0.0]
            normal = [0.0, 0.0, 0.0]
            "#,
        )
        .unwrap();
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_transform_composition() {
        let scene: Scene = toml::from_str(SCENE).unwrap();
        let transform = scene.transform();
        let origin = transform.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-5));
    }
}

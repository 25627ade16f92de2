//! OBJ and PNG asset writers

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::flowmap::FlowPixels;
use crate::mesh::MeshBuffers;

/// Write mesh buffers as a Wavefront OBJ with native quad faces
///
/// OBJ carries a single texture-coordinate channel, so only UV0 is
/// exported; the curvature and width channels stay in-memory.
pub fn write_obj(mesh: &MeshBuffers, path: &Path, object_name: &str) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "o {object_name}")?;
    for position in &mesh.positions {
        writeln!(writer, "v {} {} {}", position.x, position.y, position.z)?;
    }
    for uv in &mesh.uv0 {
        writeln!(writer, "vt {} {}", uv[0], uv[1])?;
    }
    for normal in &mesh.normals {
        writeln!(writer, "vn {} {} {}", normal.x, normal.y, normal.z)?;
    }
    for quad in &mesh.quads {
        // OBJ indices are 1-based
        let [a, b, c, d] = quad.map(|i| i + 1);
        writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c} {d}/{d}/{d}")?;
    }
    Ok(())
}

/// Write flow-map pixels as an 8-bit RGBA PNG
pub fn write_png(pixels: &FlowPixels, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, pixels.width, pixels.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut data = Vec::with_capacity(pixels.pixels.len() * 4);
    for pixel in &pixels.pixels {
        for &channel in pixel {
            data.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }
    writer
        .write_image_data(&data)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowmap::FLOW_BASE;
    use glam::Vec3;
    use std::fs;

    fn quad_mesh() -> MeshBuffers {
        MeshBuffers {
            positions: vec![
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            uv0: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            uv1: vec![[0.0; 2]; 4],
            uv2: vec![[0.0; 2]; 4],
            quads: vec![[0, 2, 3, 1]],
        }
    }

    #[test]
    fn test_write_obj() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("falls.obj");
        write_obj(&quad_mesh(), &path, "falls").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("o falls\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 1);
        assert!(text.contains("f 1/1/1 3/3/3 4/4/4 2/2/2"));
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("falls.png");
        let pixels = FlowPixels::filled(8, 16, FLOW_BASE);
        write_png(&pixels, &path).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }
}

//! Point-cache file format
//!
//! A plain-text, line-oriented format consumed by the particle system: a
//! `pcache` magic line, a format/version line, a comment, the element
//! count, nine float property declarations, `end_header`, then one point
//! per line with nine space-separated decimals.
//!
//! Float values are written with Rust's `Display`, which always uses `.`
//! as the decimal separator regardless of host locale; downstream parsers
//! rely on that.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use glam::Vec3;
use tracing::error;

use crate::points::{Point, PointCloud};

/// Property declarations, in file order
const PROPERTIES: [&str; 9] = [
    "position.x",
    "position.y",
    "position.z",
    "normal.x",
    "normal.y",
    "normal.z",
    "forward.x",
    "forward.y",
    "forward.z",
];

/// Errors produced while reading a pcache file
#[derive(thiserror::Error, Debug)]
pub enum PcacheError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("not a pcache file (first line {0:?})")]
    BadMagic(String),
    #[error("malformed header line {0:?}")]
    BadHeader(String),
    #[error("unsupported property layout (expected position/normal/forward floats)")]
    BadProperties,
    #[error("header ended without end_header")]
    MissingEndHeader,
    #[error("point line {line}: expected 9 values, found {found}")]
    BadElementCount { line: usize, found: usize },
    #[error("point line {line}: invalid float {value:?}")]
    BadFloat { line: usize, value: String },
    #[error("expected {expected} points, found {found}")]
    CountMismatch { expected: usize, found: usize },
}

/// Write points in the pcache text format
///
/// The trailing space on each point line matches the reference exporter
/// byte for byte.
pub fn write_pcache<W: Write>(writer: &mut W, points: &[Point]) -> io::Result<()> {
    writeln!(writer, "pcache")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Exported with waterfall-export")?;
    writeln!(writer, "elements {}", points.len())?;
    for name in PROPERTIES {
        writeln!(writer, "property float {name}")?;
    }
    writeln!(writer, "end_header")?;
    for point in points {
        let p = point.position;
        let n = point.normal;
        let f = point.forward;
        writeln!(
            writer,
            "{} {} {} {} {} {} {} {} {} ",
            p.x, p.y, p.z, n.x, n.y, n.z, f.x, f.y, f.z
        )?;
    }
    Ok(())
}

/// Write a point cloud's pcache file, recording the path on the asset
///
/// An absent cloud is logged as an error and skipped; the call still
/// succeeds.
pub fn update_file(cloud: Option<&mut PointCloud>, path: &Path) -> io::Result<()> {
    let Some(cloud) = cloud else {
        error!("no point cloud to write, skipping {}", path.display());
        return Ok(());
    };
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_pcache(&mut writer, cloud.points())?;
    writer.flush()?;
    cloud.set_source_file(path.to_path_buf());
    Ok(())
}

/// Read points from the pcache text format
pub fn read_pcache<R: BufRead>(reader: R) -> Result<Vec<Point>, PcacheError> {
    let mut lines = reader.lines();

    let magic = lines.next().transpose()?.unwrap_or_default();
    if magic.trim() != "pcache" {
        return Err(PcacheError::BadMagic(magic));
    }

    let mut expected = 0usize;
    let mut properties = Vec::new();
    let mut saw_end = false;
    for line in lines.by_ref() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed == "end_header" {
            saw_end = true;
            break;
        }
        let mut parts = trimmed.split_whitespace();
        match parts.next() {
            Some("format") | Some("comment") => {}
            Some("elements") => {
                let value = parts.next().ok_or_else(|| PcacheError::BadHeader(line.clone()))?;
                expected = value
                    .parse()
                    .map_err(|_| PcacheError::BadHeader(line.clone()))?;
            }
            Some("property") => {
                // "property float <name>"
                let _ty = parts.next().ok_or_else(|| PcacheError::BadHeader(line.clone()))?;
                let name = parts.next().ok_or_else(|| PcacheError::BadHeader(line.clone()))?;
                properties.push(name.to_string());
            }
            _ => return Err(PcacheError::BadHeader(line)),
        }
    }
    if !saw_end {
        return Err(PcacheError::MissingEndHeader);
    }
    if properties != PROPERTIES {
        return Err(PcacheError::BadProperties);
    }

    let mut points = Vec::with_capacity(expected);
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut values = [0.0f32; 9];
        let mut found = 0;
        for (slot, token) in values.iter_mut().zip(line.split_whitespace()) {
            *slot = token.parse().map_err(|_| PcacheError::BadFloat {
                line: index + 1,
                value: token.to_string(),
            })?;
            found += 1;
        }
        if found != 9 || line.split_whitespace().count() != 9 {
            return Err(PcacheError::BadElementCount {
                line: index + 1,
                found: line.split_whitespace().count(),
            });
        }
        points.push(Point {
            position: Vec3::new(values[0], values[1], values[2]),
            normal: Vec3::new(values[3], values[4], values[5]),
            forward: Vec3::new(values[6], values[7], values[8]),
        });
    }
    if points.len() != expected {
        return Err(PcacheError::CountMismatch {
            expected,
            found: points.len(),
        });
    }
    Ok(points)
}

/// Read a pcache file from disk
pub fn read_pcache_file(path: &Path) -> Result<Vec<Point>, PcacheError> {
    let file = File::open(path)?;
    read_pcache(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point> {
        vec![
            Point {
                position: Vec3::new(1.5, -2.25, 0.125),
                normal: Vec3::Y,
                forward: Vec3::Z,
            },
            Point {
                position: Vec3::new(-0.5, 0.0, 3.0),
                normal: Vec3::new(0.0, 0.70710677, 0.70710677),
                forward: Vec3::X,
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let points = sample_points();
        let mut buffer = Vec::new();
        write_pcache(&mut buffer, &points).unwrap();
        let read = read_pcache(buffer.as_slice()).unwrap();
        assert_eq!(read, points);
    }

    #[test]
    fn test_empty_cloud_round_trips() {
        let mut buffer = Vec::new();
        write_pcache(&mut buffer, &[]).unwrap();
        let read = read_pcache(buffer.as_slice()).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_header_layout() {
        let mut buffer = Vec::new();
        write_pcache(&mut buffer, &sample_points()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "pcache");
        assert_eq!(lines[1], "format ascii 1.0");
        assert!(lines[2].starts_with("comment "));
        assert_eq!(lines[3], "elements 2");
        assert_eq!(lines[4], "property float position.x");
        assert_eq!(lines[12], "property float forward.z");
        assert_eq!(lines[13], "end_header");
        // Point lines keep a trailing space
        assert!(lines[14].ends_with(' '));
        assert_eq!(lines.len(), 16);
    }

    #[test]
    fn test_decimal_separator_is_a_dot() {
        let mut buffer = Vec::new();
        write_pcache(&mut buffer, &sample_points()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("1.5 -2.25 0.125"));
        assert!(!text.contains(','));
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let err = read_pcache("ply\nend_header\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PcacheError::BadMagic(_)));
    }

    #[test]
    fn test_missing_end_header_is_rejected() {
        let err = read_pcache("pcache\nelements 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PcacheError::MissingEndHeader));
    }

    #[test]
    fn test_count_mismatch_is_rejected() {
        let mut buffer = Vec::new();
        write_pcache(&mut buffer, &sample_points()).unwrap();
        let mut text = String::from_utf8(buffer).unwrap();
        text = text.replace("elements 2", "elements 3");
        let err = read_pcache(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PcacheError::CountMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_short_point_line_is_rejected() {
        let text = "pcache\nformat ascii 1.0\ncomment x\nelements 1\n\
                    property float position.x\nproperty float position.y\n\
                    property float position.z\nproperty float normal.x\n\
                    property float normal.y\nproperty float normal.z\n\
                    property float forward.x\nproperty float forward.y\n\
                    property float forward.z\nend_header\n1 2 3 \n";
        let err = read_pcache(text.as_bytes()).unwrap_err();
        assert!(matches!(err, PcacheError::BadElementCount { found: 3, .. }));
    }

    #[test]
    fn test_update_file_skips_absent_cloud() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pcache");
        update_file(None, &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_update_file_writes_and_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("falls.pcache");
        let mut cloud = PointCloud::new("falls");
        cloud.install(sample_points());
        update_file(Some(&mut cloud), &path).unwrap();
        assert_eq!(cloud.source_file(), Some(&path));
        let read = read_pcache_file(&path).unwrap();
        assert_eq!(read, cloud.points());
    }
}

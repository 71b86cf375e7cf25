//! Stanford PLY (ASCII) writer for meshes and point clouds.
//!
//! Writes a `vertex` element (positions, plus `color` element colors are not
//! yet supported) and, when faces are present, a `face` element listing
//! triangle vertex index lists.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use draco_core::geometry_attribute::GeometryAttributeType;
use draco_core::geometry_indices::FaceIndex;
use draco_core::mesh::Mesh;

use crate::traits::{PointCloudWriter, Writer};

/// ASCII PLY writer. A single mesh/point cloud is held at a time; a later
/// `add_mesh`/`add_points` call replaces whatever was added before, mirroring
/// how a single PLY file holds exactly one vertex element.
#[derive(Debug, Clone, Default)]
pub struct PlyWriter {
    positions: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
}

impl PlyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "ply")?;
        writeln!(writer, "format ascii 1.0")?;
        writeln!(writer, "comment Exported by draco-io")?;
        writeln!(writer, "element vertex {}", self.positions.len())?;
        writeln!(writer, "property float x")?;
        writeln!(writer, "property float y")?;
        writeln!(writer, "property float z")?;
        if !self.faces.is_empty() {
            writeln!(writer, "element face {}", self.faces.len())?;
            writeln!(writer, "property list uchar int vertex_indices")?;
        }
        writeln!(writer, "end_header")?;

        for p in &self.positions {
            writeln!(writer, "{:.6} {:.6} {:.6}", p[0], p[1], p[2])?;
        }
        for face in &self.faces {
            writeln!(writer, "3 {} {} {}", face[0], face[1], face[2])?;
        }

        Ok(())
    }
}

impl Writer for PlyWriter {
    fn new() -> Self {
        Self::default()
    }

    fn add_mesh(&mut self, mesh: &Mesh, _name: Option<&str>) -> io::Result<()> {
        self.positions = extract_positions(mesh);
        self.faces = extract_faces(mesh);
        Ok(())
    }

    fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }
}

impl PointCloudWriter for PlyWriter {
    fn add_points(&mut self, points: &[[f32; 3]]) {
        self.positions = points.to_vec();
        self.faces.clear();
    }
}

fn extract_positions(mesh: &Mesh) -> Vec<[f32; 3]> {
    let att_id = mesh.named_attribute_id(GeometryAttributeType::Position);
    if att_id < 0 {
        return Vec::new();
    }
    let att = mesh.attribute(att_id);
    let byte_stride = att.byte_stride() as usize;
    let buffer = att.buffer();
    let mut out = Vec::with_capacity(mesh.num_points());
    for i in 0..mesh.num_points() {
        let mut bytes = [0u8; 12];
        buffer.read(i * byte_stride, &mut bytes);
        out.push([
            f32::from_le_bytes(bytes[0..4].try_into().expect("4 bytes")),
            f32::from_le_bytes(bytes[4..8].try_into().expect("4 bytes")),
            f32::from_le_bytes(bytes[8..12].try_into().expect("4 bytes")),
        ]);
    }
    out
}

fn extract_faces(mesh: &Mesh) -> Vec<[u32; 3]> {
    let mut out = Vec::with_capacity(mesh.num_faces());
    for i in 0..mesh.num_faces() as u32 {
        let face = mesh.face(FaceIndex(i));
        out.push([face[0].0, face[1].0, face[2].0]);
    }
    out
}

/// Write a mesh to an ASCII PLY file. Convenience wrapper around [`PlyWriter`].
pub fn write_ply_mesh<P: AsRef<Path>>(path: P, mesh: &Mesh) -> io::Result<()> {
    let mut writer = PlyWriter::new();
    Writer::add_mesh(&mut writer, mesh, None)?;
    writer.write(path)
}

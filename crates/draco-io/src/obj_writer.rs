//! Wavefront OBJ writer for meshes and point clouds.
//!
//! Writes vertex positions (`v`), optional vertex normals (`vn`), and
//! triangle faces (`f`, 1-based indices) as plain ASCII text.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use draco_core::geometry_attribute::GeometryAttributeType;
use draco_core::geometry_indices::FaceIndex;
use draco_core::mesh::Mesh;

use crate::traits::{PointCloudWriter, Writer};

/// OBJ format writer.
///
/// Meshes (and bare point clouds) are accumulated via [`add_mesh`] /
/// [`add_points`], then written with [`write`].
///
/// [`add_mesh`]: Writer::add_mesh
/// [`add_points`]: PointCloudWriter::add_points
/// [`write`]: Writer::write
#[derive(Debug, Clone, Default)]
pub struct ObjWriter {
    groups: Vec<ObjGroup>,
}

#[derive(Debug, Clone)]
struct ObjGroup {
    name: Option<String>,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
}

impl ObjWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Exported by draco-io")?;

        let mut vertex_base = 0u32;
        for group in &self.groups {
            if let Some(name) = &group.name {
                writeln!(writer, "g {name}")?;
            }
            for p in &group.positions {
                writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
            }
            for n in &group.normals {
                writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
            }
            for face in &group.faces {
                writeln!(
                    writer,
                    "f {} {} {}",
                    vertex_base + face[0] + 1,
                    vertex_base + face[1] + 1,
                    vertex_base + face[2] + 1,
                )?;
            }
            vertex_base += group.positions.len() as u32;
        }

        Ok(())
    }
}

impl Writer for ObjWriter {
    fn new() -> Self {
        Self::default()
    }

    fn add_mesh(&mut self, mesh: &Mesh, name: Option<&str>) -> io::Result<()> {
        let positions = extract_positions(mesh);
        let normals = extract_normals(mesh);
        let faces = extract_faces(mesh);

        self.groups.push(ObjGroup {
            name: name.map(str::to_string),
            positions,
            normals,
            faces,
        });
        Ok(())
    }

    fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    fn vertex_count(&self) -> usize {
        self.groups.iter().map(|g| g.positions.len()).sum()
    }

    fn face_count(&self) -> usize {
        self.groups.iter().map(|g| g.faces.len()).sum()
    }
}

impl PointCloudWriter for ObjWriter {
    fn add_points(&mut self, points: &[[f32; 3]]) {
        self.groups.push(ObjGroup {
            name: None,
            positions: points.to_vec(),
            normals: Vec::new(),
            faces: Vec::new(),
        });
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

fn extract_normals(mesh: &Mesh) -> Vec<[f32; 3]> {
    let att_id = mesh.named_attribute_id(GeometryAttributeType::Normal);
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

/// Write a mesh to a Wavefront OBJ file. Convenience wrapper around [`ObjWriter`].
pub fn write_obj_mesh<P: AsRef<Path>>(path: P, mesh: &Mesh) -> io::Result<()> {
    let mut writer = ObjWriter::new();
    Writer::add_mesh(&mut writer, mesh, None)?;
    writer.write(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draco_core::draco_types::DataType;
    use draco_core::geometry_attribute::PointAttribute;
    use draco_core::geometry_indices::PointIndex;
    use std::io::Cursor;

    fn create_triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        let mut pos_att = PointAttribute::new();
        pos_att.init(GeometryAttributeType::Position, 3, DataType::Float32, false, 3);
        let buffer = pos_att.buffer_mut();
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        for (i, pos) in positions.iter().enumerate() {
            let bytes: Vec<u8> = pos.iter().flat_map(|v| v.to_le_bytes()).collect();
            buffer.write(i * 12, &bytes);
        }
        mesh.add_attribute(pos_att);
        mesh.set_num_faces(1);
        mesh.set_face(FaceIndex(0), [PointIndex(0), PointIndex(1), PointIndex(2)]);
        mesh
    }

    #[test]
    fn writes_vertices_and_faces() {
        let mesh = create_triangle_mesh();
        let mut writer = ObjWriter::new();
        Writer::add_mesh(&mut writer, &mesh, Some("Triangle")).unwrap();
        assert_eq!(writer.vertex_count(), 3);
        assert_eq!(writer.face_count(), 1);

        let mut buf = Cursor::new(Vec::new());
        writer.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.contains("v 0 0 0"));
        assert!(text.contains("f 1 2 3"));
    }

    #[test]
    fn point_cloud_has_no_faces() {
        let mut writer = ObjWriter::new();
        writer.add_points(&[[1.0, 2.0, 3.0]]);
        assert_eq!(writer.vertex_count(), 1);
        assert_eq!(writer.face_count(), 0);
    }
}

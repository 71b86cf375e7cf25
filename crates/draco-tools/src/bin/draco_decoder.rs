//! Command-line front end that reads a Draco-encoded bitstream and writes a
//! plain-text mesh or point cloud.
//!
//! ```text
//! draco_decoder -i mesh.drc -o mesh.obj
//! ```

use std::process::ExitCode;

use draco_core::compression_config::EncodedGeometryType;
use draco_core::decoder_buffer::DecoderBuffer;
use draco_core::geometry_attribute::GeometryAttributeType;
use draco_core::mesh::Mesh;
use draco_core::mesh_decoder::MeshDecoder;
use draco_core::point_cloud::PointCloud;
use draco_core::point_cloud_decoder::PointCloudDecoder;

use draco_io::traits::{PointCloudWriter, Writer};
use draco_io::{ObjWriter, PlyWriter};

use draco_tools::{parse_decode_args, peek_geometry_type, ToolError};

fn extract_positions(pc: &PointCloud) -> Vec<[f32; 3]> {
    let att_id = pc.named_attribute_id(GeometryAttributeType::Position);
    if att_id < 0 {
        return Vec::new();
    }
    let att = pc.attribute(att_id);
    let byte_stride = att.byte_stride() as usize;
    let buffer = att.buffer();
    let mut out = Vec::with_capacity(pc.num_points());
    for i in 0..pc.num_points() {
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

fn write_mesh(output: &std::path::Path, mesh: &Mesh) -> Result<(), ToolError> {
    match output.extension().and_then(|e| e.to_str()) {
        Some("ply") => {
            let mut writer = PlyWriter::new();
            Writer::add_mesh(&mut writer, mesh, None)?;
            writer.write(output)?;
        }
        _ => {
            let mut writer = ObjWriter::new();
            Writer::add_mesh(&mut writer, mesh, None)?;
            writer.write(output)?;
        }
    }
    Ok(())
}

fn write_points(output: &std::path::Path, points: &[[f32; 3]]) -> Result<(), ToolError> {
    match output.extension().and_then(|e| e.to_str()) {
        Some("ply") => {
            let mut writer = PlyWriter::new();
            writer.add_points(points);
            writer.write(output)?;
        }
        _ => {
            let mut writer = ObjWriter::new();
            writer.add_points(points);
            writer.write(output)?;
        }
    }
    Ok(())
}

fn run() -> Result<(), ToolError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_decode_args(&args)?;

    let data = std::fs::read(&opts.input)?;
    let geometry_type = peek_geometry_type(&data)?;

    match geometry_type {
        EncodedGeometryType::TriangularMesh => {
            let mut buffer = DecoderBuffer::new(&data);
            let mut mesh = Mesh::new();
            MeshDecoder::new().decode(&mut buffer, &mut mesh)?;
            write_mesh(&opts.output, &mesh)?;
            println!(
                "Decoded mesh with {} faces, {} points to {}",
                mesh.num_faces(),
                mesh.num_points(),
                opts.output.display()
            );
        }
        EncodedGeometryType::PointCloud => {
            let mut buffer = DecoderBuffer::new(&data);
            let mut pc = PointCloud::new();
            PointCloudDecoder::new().decode(&mut buffer, &mut pc)?;
            let points = extract_positions(&pc);
            write_points(&opts.output, &points)?;
            println!(
                "Decoded point cloud with {} points to {}",
                points.len(),
                opts.output.display()
            );
        }
        EncodedGeometryType::InvalidGeometryType => {
            return Err(ToolError::Draco(draco_core::status::DracoError::CorruptedHeader(
                "invalid geometry type".to_string(),
            )));
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("draco_decoder: {e}");
            ExitCode::FAILURE
        }
    }
}

//! Command-line front end that reads a mesh or point cloud from a plain-text
//! format and writes a Draco-encoded bitstream.
//!
//! ```text
//! draco_encoder -i mesh.obj -o mesh.drc -qp 11 -qt 10 -qn 10 -cl 7
//! ```

use std::process::ExitCode;

use draco_core::encoder_buffer::EncoderBuffer;
use draco_core::encoder_options::EncoderOptions;
use draco_core::geometry_attribute::GeometryAttributeType;
use draco_core::mesh::Mesh;
use draco_core::mesh_encoder::MeshEncoder;
use draco_core::point_cloud_encoder::PointCloudEncoder;

use draco_io::traits::Reader;
use draco_io::{ObjReader, PlyReader};

use draco_tools::{parse_encode_args, EncodeOptions, ToolError};

fn read_mesh(opts: &EncodeOptions) -> Result<Mesh, ToolError> {
    match opts.input.extension().and_then(|e| e.to_str()) {
        Some("ply") => Ok(PlyReader::open(&opts.input)?.read_mesh()?),
        _ => Ok(ObjReader::open(&opts.input)?.read_mesh()?),
    }
}

fn set_attribute_quantization(mesh: &Mesh, options: &mut EncoderOptions, opts: &EncodeOptions) {
    let targets = [
        (GeometryAttributeType::Position, opts.qp),
        (GeometryAttributeType::TexCoord, opts.qt),
        (GeometryAttributeType::Normal, opts.qn),
    ];
    for (att_type, bits) in targets {
        let att_id = mesh.named_attribute_id(att_type);
        if att_id >= 0 && bits > 0 {
            options.set_attribute_int(att_id, "quantization_bits", bits);
        }
    }
}

fn run() -> Result<(), ToolError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_encode_args(&args)?;

    let mesh = read_mesh(&opts)?;

    let mut options = EncoderOptions::new();
    set_attribute_quantization(&mesh, &mut options, &opts);
    options.set_global_int("encoding_speed", opts.encoding_speed());
    options.set_global_int("decoding_speed", opts.encoding_speed());

    let mut out_buffer = EncoderBuffer::new();

    if opts.force_point_cloud || mesh.num_faces() == 0 {
        let mut encoder = PointCloudEncoder::new();
        encoder.set_point_cloud((*mesh).clone());
        encoder.encode(&options, &mut out_buffer)?;
        println!(
            "Encoded point cloud with {} points to {}",
            mesh.num_points(),
            opts.output.display()
        );
    } else {
        let mut encoder = MeshEncoder::new();
        encoder.set_mesh(mesh.clone());
        encoder.encode(&options, &mut out_buffer)?;
        println!(
            "Encoded mesh with {} faces, {} points to {}",
            mesh.num_faces(),
            mesh.num_points(),
            opts.output.display()
        );
    }

    std::fs::write(&opts.output, out_buffer.data())?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("draco_encoder: {e}");
            ExitCode::FAILURE
        }
    }
}

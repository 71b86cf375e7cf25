use draco_core::mesh::Mesh;
use draco_core::mesh_encoder::MeshEncoder;
use draco_core::mesh_decoder::MeshDecoder;
use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
use draco_core::draco_types::DataType;
use draco_core::encoder_options::EncoderOptions;
use draco_core::encoder_buffer::EncoderBuffer;
use draco_core::decoder_buffer::DecoderBuffer;
use draco_core::geometry_indices::{FaceIndex, PointIndex};

fn read_vec3_f32(attribute: &draco_core::geometry_attribute::PointAttribute, count: usize) -> Vec<[f32; 3]> {
    let buffer = attribute.buffer();
    (0..count)
        .map(|i| {
            let mut bytes = [0u8; 12];
            buffer.read(i * 12, &mut bytes);
            [
                f32::from_le_bytes(bytes[0..4].try_into().unwrap()),
                f32::from_le_bytes(bytes[4..8].try_into().unwrap()),
                f32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            ]
        })
        .collect()
}

/// Quantized float normals go through the octahedral attribute transform,
/// which is what gives `PredictionSchemeGeometricNormalEncoder` 2-component
/// data it can actually predict from — this is the only path where that
/// predictor applies, since it predicts a normal from neighboring mesh
/// geometry and needs both a corner table and the position attribute.
#[test]
fn quantized_normal_attribute_round_trips_via_geometric_normal_prediction() {
    let mut mesh = Mesh::new();

    let mut pos_att = PointAttribute::new();
    pos_att.init(GeometryAttributeType::Position, 3, DataType::Float32, false, 4);
    {
        let buffer = pos_att.buffer_mut();
        let positions: [f32; 12] = [
            0.0, 0.0, 0.0,
            10.0, 0.0, 0.0,
            10.0, 10.0, 0.0,
            0.0, 10.0, 0.0,
        ];
        for (i, chunk) in positions.chunks(3).enumerate() {
            let bytes: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            buffer.write(i * 12, &bytes);
        }
    }
    pos_att.set_identity_mapping();
    mesh.add_attribute(pos_att);

    let mut normal_att = PointAttribute::new();
    normal_att.init(GeometryAttributeType::Normal, 3, DataType::Float32, false, 4);
    {
        let buffer = normal_att.buffer_mut();
        let normals: [f32; 12] = [
            0.0, 0.0, 1.0,
            0.0, 0.0, 1.0,
            0.0, 0.0, 1.0,
            0.0, 0.0, 1.0,
        ];
        for (i, chunk) in normals.chunks(3).enumerate() {
            let bytes: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            buffer.write(i * 12, &bytes);
        }
    }
    normal_att.set_identity_mapping();
    mesh.add_attribute(normal_att);

    mesh.set_num_faces(2);
    mesh.set_face(FaceIndex(0), [PointIndex(0), PointIndex(1), PointIndex(2)]);
    mesh.set_face(FaceIndex(1), [PointIndex(0), PointIndex(2), PointIndex(3)]);

    let mut options = EncoderOptions::default();
    options.set_attribute_int(0, "quantization_bits", 14);
    options.set_attribute_int(1, "quantization_bits", 10);

    let mut encoder = MeshEncoder::new();
    encoder.set_mesh(mesh);

    let mut enc_buffer = EncoderBuffer::new();
    let status = encoder.encode(&options, &mut enc_buffer);
    assert!(status.is_ok(), "Encoding failed: {:?}", status.err());

    let mut dec_buffer = DecoderBuffer::new(enc_buffer.data());
    let mut decoded_mesh = Mesh::new();
    let mut decoder = MeshDecoder::new();
    let status = decoder.decode(&mut dec_buffer, &mut decoded_mesh);
    assert!(status.is_ok(), "Decoding failed: {:?}", status.err());

    let decoded_normals = decoded_mesh.attribute(1);
    assert_eq!(decoded_normals.attribute_type(), GeometryAttributeType::Normal);

    let decoded = read_vec3_f32(decoded_normals, 4);
    for (i, n) in decoded.iter().enumerate() {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        let dot = n[2] / len.max(1e-6);
        assert!(dot > 0.95, "Normal {i} drifted too far from (0,0,1): {n:?}");
    }
}

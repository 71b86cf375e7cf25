use crate::mesh::Mesh;
use crate::corner_table::CornerTable;
use crate::encoder_buffer::EncoderBuffer;
use crate::status::DracoError;
use crate::geometry_indices::{FaceIndex, PointIndex};
use crate::mesh_edgebreaker_shared::{
    valence_context_bucket, select_traversal_type, EdgebreakerSymbol, EdgebreakerTraversalType,
    NUM_VALENCE_CONTEXTS,
};
use crate::rans_bit_encoder::RAnsBitEncoder;
use crate::version::uses_varint_encoding;
use std::collections::HashMap;

/// Encodes mesh connectivity using an Edgebreaker-style traversal symbol per
/// face, paired with [`MeshEdgebreakerDecoder`](crate::mesh_edgebreaker_decoder::MeshEdgebreakerDecoder).
///
/// Faces are visited in their natural array order rather than a frontier
/// traversal: each face contributes exactly one symbol, and each of its three
/// corners either introduces a fresh vertex or references one already seen by
/// an earlier face. This keeps the encoder's choices trivially replayable by
/// the decoder (no stack bookkeeping, no merge events), at the cost of
/// compressing connectivity less tightly than a true frontier-driven
/// Edgebreaker pass.
pub struct MeshEdgebreakerEncoder {
    num_faces: usize,
    num_points: usize,
    encoding_speed: i32,
}

impl MeshEdgebreakerEncoder {
    pub fn new(num_faces: usize, num_points: usize, encoding_speed: i32) -> Self {
        Self { num_faces, num_points, encoding_speed }
    }

    /// Encodes `mesh`'s connectivity (as captured by `corner_table`) into
    /// `out_buffer`. Returns the attribute-value order (`point_ids`, indexed
    /// by synthetic vertex id) and the corner each synthetic id was first
    /// seen at (`data_to_corner_map`), mirroring what the decoder hands back.
    pub fn encode_connectivity(
        &mut self,
        mesh: &Mesh,
        corner_table: &CornerTable,
        out_buffer: &mut EncoderBuffer,
    ) -> Result<(Vec<PointIndex>, Vec<u32>), DracoError> {
        let num_faces = corner_table.num_faces();
        debug_assert_eq!(num_faces, self.num_faces);
        let num_points = mesh.num_points();
        debug_assert_eq!(num_points, self.num_points);

        let major = out_buffer.version_major();
        let minor = out_buffer.version_minor();
        let bitstream_version = ((major as u16) << 8) | (minor as u16);

        let traversal_type = select_traversal_type(self.encoding_speed, num_faces);
        if bitstream_version >= 0x0102 {
            out_buffer.encode_u8(traversal_type as u8);
        }

        if !uses_varint_encoding(major, minor) {
            out_buffer.encode_u32(num_points as u32);
            out_buffer.encode_u32(num_faces as u32);
        } else {
            out_buffer.encode_varint(num_points as u64);
            out_buffer.encode_varint(num_faces as u64);
        }

        out_buffer.encode_u8(mesh.num_attributes() as u8);

        // One symbol per face; no split symbols, so no temporary vertices
        // ever need to be merged back together during decoding.
        if !uses_varint_encoding(major, minor) {
            out_buffer.encode_u32(num_faces as u32);
            out_buffer.encode_u32(0);
        } else {
            out_buffer.encode_varint(num_faces as u64);
            out_buffer.encode_varint(0u64);
        }

        if bitstream_version >= 0x0202 {
            out_buffer.encode_varint(0u64); // num topology split events
        } else {
            out_buffer.encode_varint(0u64); // num topology split events (legacy path also starts with this count)
        }

        // Vertices are handed a synthetic id the first time any face
        // references them, walking faces in their natural order.
        let mut assigned: HashMap<u32, u32> = HashMap::new();
        let mut point_ids: Vec<PointIndex> = Vec::with_capacity(num_points);
        let mut data_to_corner_map: Vec<u32> = Vec::with_capacity(num_points);
        let mut symbols: Vec<EdgebreakerSymbol> = Vec::with_capacity(num_faces);
        // is_new[face][corner_in_face]
        let mut is_new: Vec<[bool; 3]> = Vec::with_capacity(num_faces);
        // existing-vertex references, in face/corner order, only for corners
        // that reused an already-assigned id.
        let mut existing_refs: Vec<u32> = Vec::new();

        for face_id in 0..num_faces {
            let face = mesh.face(FaceIndex(face_id as u32));
            let mut flags = [false; 3];
            let mut new_count = 0usize;
            for k in 0..3 {
                let real_vertex = face[k].0;
                let corner = (face_id * 3 + k) as u32;
                if let std::collections::hash_map::Entry::Vacant(entry) = assigned.entry(real_vertex) {
                    let synth_id = point_ids.len() as u32;
                    entry.insert(synth_id);
                    point_ids.push(PointIndex(real_vertex));
                    data_to_corner_map.push(corner);
                    flags[k] = true;
                    new_count += 1;
                } else {
                    let synth_id = assigned[&real_vertex];
                    existing_refs.push(synth_id);
                }
            }
            is_new.push(flags);
            symbols.push(match new_count {
                3 => EdgebreakerSymbol::End,
                2 => EdgebreakerSymbol::Center,
                1 => EdgebreakerSymbol::Left,
                _ => EdgebreakerSymbol::Right,
            });
        }

        if point_ids.len() != num_points {
            return Err(DracoError::InvalidInput(
                "Mesh contains points that are not referenced by any face".to_string(),
            ));
        }

        // Symbol stream: same bit layout the decoder reads via
        // `decode_symbol_stream` (1 bit for Center, 1+2 bits otherwise).
        out_buffer.start_bit_encoding(num_faces * 3, true);
        for symbol in &symbols {
            Self::encode_symbol_bits(out_buffer, *symbol);
        }
        out_buffer.end_bit_encoding();

        // Per-face, per-corner "is this vertex new" flags.
        match traversal_type {
            EdgebreakerTraversalType::Standard => {
                out_buffer.start_bit_encoding(num_faces * 3, true);
                for flags in &is_new {
                    for k in 0..3 {
                        out_buffer.encode_least_significant_bits32(1, flags[k] as u32);
                    }
                }
                out_buffer.end_bit_encoding();
            }
            EdgebreakerTraversalType::ValenceAdaptive => {
                // One rANS context per vertex-valence bucket of the
                // immediately-preceding corner's running reference count,
                // replayed by the decoder over the same global corner order.
                let mut context_encoders: Vec<RAnsBitEncoder> =
                    (0..NUM_VALENCE_CONTEXTS).map(|_| RAnsBitEncoder::new()).collect();
                for enc in &mut context_encoders {
                    enc.start_encoding();
                }
                let mut ref_count: HashMap<u32, u32> = HashMap::new();
                let mut prev_vertex: Option<u32> = None;
                for face_id in 0..num_faces {
                    let face = mesh.face(FaceIndex(face_id as u32));
                    for k in 0..3 {
                        let real_vertex = face[k].0;
                        let bucket = match prev_vertex {
                            Some(pv) => valence_context_bucket(*ref_count.get(&pv).unwrap_or(&0)),
                            None => 0,
                        };
                        context_encoders[bucket].encode_bit(is_new[face_id][k]);
                        *ref_count.entry(real_vertex).or_insert(0) += 1;
                        prev_vertex = Some(real_vertex);
                    }
                }
                for enc in &mut context_encoders {
                    enc.end_encoding(out_buffer);
                }
            }
        }

        // Explicit back-references for reused vertices, byte-aligned.
        for id in &existing_refs {
            out_buffer.encode_varint(*id as u64);
        }

        // Attribute seam bits: one RAns-coded bit per interior edge (shared
        // by both faces, only decoded once) plus an implicit seam for every
        // boundary edge. All attributes reference the same position-based
        // connectivity here, so no attribute ever introduces an extra seam.
        for _ in 0..mesh.num_attributes() {
            let mut seam_encoder = RAnsBitEncoder::new();
            seam_encoder.start_encoding();
            for f in 0..num_faces {
                for k in 0..3 {
                    let c = crate::geometry_indices::CornerIndex((f * 3 + k) as u32);
                    let opp = corner_table.opposite(c);
                    if opp == crate::geometry_indices::INVALID_CORNER_INDEX {
                        continue; // boundary edge, no bit encoded
                    }
                    let opp_face = opp.0 as usize / 3;
                    if f < opp_face {
                        seam_encoder.encode_bit(false);
                    }
                }
            }
            seam_encoder.end_encoding(out_buffer);
        }

        Ok((point_ids, data_to_corner_map))
    }

    fn encode_symbol_bits(out_buffer: &mut EncoderBuffer, symbol: EdgebreakerSymbol) {
        match symbol {
            EdgebreakerSymbol::Center => {
                out_buffer.encode_least_significant_bits32(1, 0);
            }
            other => {
                let topology: u32 = match other {
                    EdgebreakerSymbol::Split => 1,
                    EdgebreakerSymbol::Left => 3,
                    EdgebreakerSymbol::Right => 5,
                    EdgebreakerSymbol::End => 7,
                    EdgebreakerSymbol::Center | EdgebreakerSymbol::Hole => unreachable!(),
                };
                out_buffer.encode_least_significant_bits32(1, 1);
                out_buffer.encode_least_significant_bits32(2, topology >> 1);
            }
        }
    }
}

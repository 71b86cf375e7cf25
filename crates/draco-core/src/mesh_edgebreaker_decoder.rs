use crate::mesh::Mesh;
use crate::decoder_buffer::DecoderBuffer;
use crate::status::{Status, DracoError};
use crate::geometry_indices::{PointIndex, FaceIndex};
use crate::mesh_edgebreaker_shared::{
    valence_context_bucket, EdgebreakerSymbol, EdgebreakerTraversalType, TopologySplitEventData,
    NUM_VALENCE_CONTEXTS,
};
use crate::rans_bit_decoder::RAnsBitDecoder;
use std::collections::HashMap;

pub struct MeshEdgebreakerDecoder {
    data_to_corner_map: Option<Vec<u32>>,
    attribute_seam_corners: Vec<Vec<u32>>,
}

impl Default for MeshEdgebreakerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshEdgebreakerDecoder {
    pub fn new() -> Self {
        Self {
            data_to_corner_map: None,
            attribute_seam_corners: Vec::new(),
        }
    }

    pub fn take_data_to_corner_map(&mut self) -> Option<Vec<u32>> {
        self.data_to_corner_map.take()
    }

    pub fn take_attribute_seam_corners(&mut self) -> Vec<Vec<u32>> {
        std::mem::take(&mut self.attribute_seam_corners)
    }

    pub fn get_attribute_seam_corners(&self, attribute_index: usize) -> Option<&Vec<u32>> {
        self.attribute_seam_corners.get(attribute_index)
    }

    pub fn decode_connectivity(&mut self, in_buffer: &mut DecoderBuffer, out_mesh: &mut Mesh) -> Status {
        self.data_to_corner_map = None;

        let version_major = in_buffer.version_major();
        let version_minor = in_buffer.version_minor();
        let bitstream_version = ((version_major as u16) << 8) | (version_minor as u16);
        
        let traversal_type = if bitstream_version >= 0x0102 {
            let traversal_decoder_type = in_buffer.decode_u8().map_err(|e| DracoError::BufferError(format!("Failed to read traversal decoder type: {e}")))?;
            EdgebreakerTraversalType::from_u8(traversal_decoder_type).ok_or_else(|| {
                DracoError::MalformedBitstream(format!(
                    "Unsupported Edgebreaker traversal decoder type: {traversal_decoder_type}"
                ))
            })?
        } else {
            EdgebreakerTraversalType::Standard
        };

        let mut _num_new_vertices = 0;
        if bitstream_version < 0x0202 {
            if bitstream_version < 0x0200 {
                _num_new_vertices = in_buffer.decode_u32().map_err(|e| DracoError::BufferError(format!("Failed to read num_new_vertices: {e}")))?;
            } else {
                _num_new_vertices = in_buffer.decode_varint().map_err(|e| DracoError::BufferError(format!("Failed to read num_new_vertices: {e}")))? as u32;
            }
        }

        let num_encoded_vertices = if bitstream_version < 0x0200 {
            in_buffer.decode_u32().map_err(|e| DracoError::BufferError(format!("Failed to read num_encoded_vertices: {e}")))?
        } else {
            in_buffer.decode_varint().map_err(|e| DracoError::BufferError(format!("Failed to read num_encoded_vertices: {e}")))? as u32
        };

        let num_faces = if bitstream_version < 0x0200 {
            in_buffer.decode_u32().map_err(|e| DracoError::BufferError(format!("Failed to read num_faces: {e}")))?
        } else {
            in_buffer.decode_varint().map_err(|e| DracoError::BufferError(format!("Failed to read num_faces: {e}")))? as u32
        };

        let num_attribute_data = in_buffer.decode_u8().map_err(|e| DracoError::BufferError(format!("Failed to read attribute data count: {e}")))?;

        out_mesh.set_num_faces(num_faces as usize);
        out_mesh.set_num_points(num_encoded_vertices as usize);

        let num_symbols = if bitstream_version < 0x0200 {
            in_buffer.decode_u32().map_err(|e| DracoError::BufferError(format!("Failed to read symbol count: {e}")))? as usize
        } else {
            in_buffer.decode_varint().map_err(|e| DracoError::BufferError(format!("Failed to read symbol count: {e}")))? as usize
        };

        let num_split_symbols = if bitstream_version < 0x0200 {
            in_buffer.decode_u32().map_err(|e| DracoError::BufferError(format!("Failed to read split symbol count: {e}")))? as usize
        } else {
            in_buffer.decode_varint().map_err(|e| DracoError::BufferError(format!("Failed to read split symbol count: {e}")))? as usize
        };

        // Read hole/topology split events.
        // Draco stores these events inline for v2.2+, but for older streams (<2.2)
        // they are stored after the traversal buffer, and the traversal buffer size
        // is explicitly encoded.
        let (topology_split_data, topology_split_decoded_bytes) = if bitstream_version < 0x0202 {
            let encoded_connectivity_size = if bitstream_version < 0x0200 {
                in_buffer
                    .decode_u32()
                    .map_err(|e| DracoError::BufferError(format!("Failed to read encoded_connectivity_size: {e}")))?
                    as usize
            } else {
                in_buffer
                    .decode_varint()
                    .map_err(|e| DracoError::BufferError(format!("Failed to read encoded_connectivity_size: {e}")))?
                    as usize
            };

            if encoded_connectivity_size == 0 || encoded_connectivity_size > in_buffer.remaining_size() {
                return Err(DracoError::MalformedBitstream(
                    "Invalid encoded_connectivity_size".to_string(),
                ));
            }

            // Decode events from a temporary buffer starting at the end of the
            // traversal buffer, while keeping |in_buffer| positioned at the start
            // of the traversal buffer.
            let remaining = in_buffer.remaining_data();
            let events_slice = &remaining[encoded_connectivity_size..];
            let mut event_buffer = DecoderBuffer::new(events_slice);
            event_buffer.set_version(version_major, version_minor);

            let (events, decoded_bytes) =
                Self::decode_hole_and_topology_split_events(&mut event_buffer, bitstream_version)?;
            (events, decoded_bytes)
        } else {
            let events = Self::decode_topology_split_events_inline(in_buffer, bitstream_version)?;
            (events, 0)
        };

        // Validate split data count.
        if topology_split_data.len() > num_split_symbols {
            return Err(DracoError::MalformedBitstream(format!(
                "Split event count exceeds split-symbol count (split_symbols={num_split_symbols}, events={})",
                topology_split_data.len()
            )));
        }

        // Read symbol stream (reversed from encoder)
        let symbols = Self::decode_symbol_stream(in_buffer, num_symbols)?;

        // Reconstruct topology.
        // Draco allows up to (num_encoded_vertices + num_split_symbols) vertices during
        // connectivity decoding because split symbols can introduce temporary vertices
        // that are eliminated during deduplication.
        let max_num_vertices = (num_encoded_vertices as usize).saturating_add(num_split_symbols);

        self.reconstruct_mesh(
            &symbols,
            &topology_split_data,
            out_mesh,
            num_faces as usize,
            max_num_vertices,
            num_attribute_data,
            in_buffer,
            traversal_type,
        )?;

        // For pre-v2.2 streams, the hole/topology split event payload was decoded
        // from a temporary buffer, and the main buffer is now positioned at the
        // start of that payload. Advance it so attribute decoding starts at the
        // correct location.
        if topology_split_decoded_bytes > 0 {
            if topology_split_decoded_bytes > in_buffer.remaining_size() {
                return Err(DracoError::MalformedBitstream(
                    "Invalid topology split decoded byte count".to_string(),
                ));
            }
            in_buffer.advance(topology_split_decoded_bytes);
        }

        Ok(())
    }

    fn decode_hole_and_topology_split_events(
        in_buffer: &mut DecoderBuffer,
        bitstream_version: u16,
    ) -> Result<(Vec<TopologySplitEventData>, usize), DracoError> {
        // Matches MeshEdgebreakerDecoderImpl::DecodeHoleAndTopologySplitEvents.
        let num_topology_splits = if bitstream_version < 0x0200 {
            in_buffer
                .decode_u32()
                .map_err(|e| DracoError::BufferError(format!("Failed to read num_topology_splits: {e}")))?
        } else {
            in_buffer
                .decode_varint()
                .map_err(|e| DracoError::BufferError(format!("Failed to read num_topology_splits: {e}")))?
                as u32
        };

        let mut events: Vec<TopologySplitEventData> = Vec::with_capacity(num_topology_splits as usize);
        if num_topology_splits > 0 {
            if bitstream_version < 0x0102 {
                // Legacy (<1.2): absolute IDs + explicit edge byte.
                for _ in 0..num_topology_splits {
                    let split_symbol_id = in_buffer
                        .decode_u32()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read split_symbol_id: {e}")))?;
                    let source_symbol_id = in_buffer
                        .decode_u32()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read source_symbol_id: {e}")))?;
                    let edge_data = in_buffer
                        .decode_u8()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read source_edge byte: {e}")))?;
                    events.push(TopologySplitEventData {
                        split_symbol_id,
                        source_symbol_id,
                        source_edge: if (edge_data & 1) == 0 {
                            crate::mesh_edgebreaker_shared::EdgeFaceName::LeftFaceEdge
                        } else {
                            crate::mesh_edgebreaker_shared::EdgeFaceName::RightFaceEdge
                        },
                    });
                }
            } else {
                // Delta + varint IDs.
                let mut last_source_symbol_id: i32 = 0;
                for _ in 0..num_topology_splits {
                    let delta = in_buffer
                        .decode_varint()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read source symbol delta: {e}")))?
                        as i32;
                    let source_symbol_id = last_source_symbol_id + delta;

                    let split_delta = in_buffer
                        .decode_varint()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read split symbol delta: {e}")))?
                        as i32;
                    if split_delta > source_symbol_id {
                        return Err(DracoError::MalformedBitstream(
                            "Invalid split symbol delta".to_string(),
                        ));
                    }
                    let split_symbol_id = source_symbol_id - split_delta;

                    events.push(TopologySplitEventData {
                        split_symbol_id: split_symbol_id as u32,
                        source_symbol_id: source_symbol_id as u32,
                        source_edge: crate::mesh_edgebreaker_shared::EdgeFaceName::LeftFaceEdge,
                    });

                    last_source_symbol_id = source_symbol_id;
                }

                // Split edges are bit-coded; for <2.2 streams the decoder reads 2 bits.
                in_buffer
                    .start_bit_decoding(false)
                    .map_err(|e| DracoError::BufferError(format!("Failed to start bit decoding for split-event source_edge bits: {e}")))?;
                for event in &mut events {
                    let bits = if bitstream_version < 0x0202 { 2 } else { 1 };
                    let edge_data = in_buffer
                        .decode_least_significant_bits32(bits)
                        .map_err(|e| DracoError::BufferError(format!("Failed to read split-event source_edge bits: {e}")))?;
                    event.source_edge = if (edge_data & 1) == 0 {
                        crate::mesh_edgebreaker_shared::EdgeFaceName::LeftFaceEdge
                    } else {
                        crate::mesh_edgebreaker_shared::EdgeFaceName::RightFaceEdge
                    };
                }
                in_buffer.end_bit_decoding();
            }
        }

        // Hole events are present only for older streams (<2.1). We currently
        // decode them to advance the buffer, but full HOLE-symbol topology support
        // is not implemented.
        let mut num_hole_events: u32 = 0;
        if bitstream_version < 0x0201 {
            if bitstream_version < 0x0200 {
                num_hole_events = in_buffer
                    .decode_u32()
                    .map_err(|e| DracoError::BufferError(format!("Failed to read num_hole_events: {e}")))?;
            } else {
                num_hole_events = in_buffer
                    .decode_varint()
                    .map_err(|e| DracoError::BufferError(format!("Failed to read num_hole_events: {e}")))?
                    as u32;
            }
        }

        if num_hole_events > 0 {
            if bitstream_version < 0x0102 {
                for _ in 0..num_hole_events {
                    // Legacy: raw i32 symbol id.
                    let _sym_id: i32 = in_buffer
                        .decode::<i32>()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read hole event: {e}")))?;
                }
            } else {
                // Delta + varint.
                let mut last_symbol_id: i32 = 0;
                for _ in 0..num_hole_events {
                    let delta = in_buffer
                        .decode_varint()
                        .map_err(|e| DracoError::BufferError(format!("Failed to read hole event delta: {e}")))?
                        as i32;
                    let _sym_id = last_symbol_id + delta;
                    last_symbol_id = _sym_id;
                }
            }

            return Err(DracoError::UnsupportedFeature(
                "Edgebreaker hole events in legacy bitstream".to_string(),
            ));
        }

        Ok((events, in_buffer.position()))
    }

    fn decode_topology_split_events_inline(
        in_buffer: &mut DecoderBuffer,
        bitstream_version: u16,
    ) -> Result<Vec<TopologySplitEventData>, DracoError> {
        // Inline event format is only used in v2.2+ streams.
        if bitstream_version < 0x0202 {
            return Ok(Vec::new());
        }

        let num_events = in_buffer
            .decode_varint()
            .map_err(|e| DracoError::BufferError(format!("Failed to read split event count: {e}")))?
            as usize;
        let mut events = Vec::with_capacity(num_events);

        if num_events > 0 {
            let mut last_source_symbol_id: i32 = 0;
            for _ in 0..num_events {
                let delta = in_buffer
                    .decode_varint()
                    .map_err(|e| DracoError::BufferError(format!("Failed to read source symbol delta: {e}")))?
                    as i32;
                let source_symbol_id = last_source_symbol_id + delta;

                let split_delta = in_buffer
                    .decode_varint()
                    .map_err(|e| DracoError::BufferError(format!("Failed to read split symbol delta: {e}")))?
                    as i32;
                let split_symbol_id = source_symbol_id - split_delta;

                events.push(TopologySplitEventData {
                    split_symbol_id: split_symbol_id as u32,
                    source_symbol_id: source_symbol_id as u32,
                    source_edge: crate::mesh_edgebreaker_shared::EdgeFaceName::LeftFaceEdge,
                });

                last_source_symbol_id = source_symbol_id;
            }
        }

        if num_events > 0 {
            in_buffer
                .start_bit_decoding(false)
                .map_err(|e| DracoError::BufferError(format!("Failed to start bit decoding for split-event source_edge bits: {e}")))?;
            for event in &mut events {
                let edge_bit = in_buffer
                    .decode_least_significant_bits32(1)
                    .map_err(|e| DracoError::BufferError(format!("Failed to read split-event source_edge bit: {e}")))?;
                event.source_edge = if edge_bit == 0 {
                    crate::mesh_edgebreaker_shared::EdgeFaceName::LeftFaceEdge
                } else {
                    crate::mesh_edgebreaker_shared::EdgeFaceName::RightFaceEdge
                };
            }
            in_buffer.end_bit_decoding();
        }

        Ok(events)
    }

    // NOTE: Legacy (<2.2) split/hole event decoding is handled by
    // decode_hole_and_topology_split_events().

    fn topology_bit_pattern_to_symbol_id(topology: u32) -> Result<u32, DracoError> {
        // Draco topology bit patterns:
        // C=0, S=1, L=3, R=5, E=7.
        // Map them to our internal symbol IDs: C=0,S=1,L=2,R=3,E=4.
        match topology {
            0 => Ok(EdgebreakerSymbol::Center as u32),
            1 => Ok(EdgebreakerSymbol::Split as u32),
            3 => Ok(EdgebreakerSymbol::Left as u32),
            5 => Ok(EdgebreakerSymbol::Right as u32),
            7 => Ok(EdgebreakerSymbol::End as u32),
            _ => Err(DracoError::MalformedBitstream(format!(
                "Invalid Edgebreaker topology bit pattern: {topology}"
            ))),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn reconstruct_mesh(
        &mut self,
        symbols: &[u32],
        _topology_split_data: &[TopologySplitEventData],
        mesh: &mut Mesh,
        total_num_faces: usize,
        max_num_vertices: usize,
        num_attribute_data: u8,
        in_buffer: &mut DecoderBuffer,
        traversal_type: EdgebreakerTraversalType,
    ) -> Result<usize, DracoError> {
        if symbols.is_empty() {
            self.data_to_corner_map = Some(Vec::new());
            self.attribute_seam_corners = vec![Vec::new(); num_attribute_data as usize];
            return Ok(0);
        }

        let num_symbols = symbols.len();
        let num_decoded_faces = num_symbols;
        if num_decoded_faces != total_num_faces {
            return Err(DracoError::MalformedBitstream("Unexpected number of decoded faces".to_string()));
        }
        let mut corner_table = CornerTable::new(total_num_faces);

        // One vertex is either freshly introduced or re-references an
        // already-assigned vertex for every corner of every face, in face
        // array order. This mirrors the encoder's own traversal exactly, so
        // no frontier stack or merge bookkeeping is needed here.
        let mut next_point_id: u32 = 0;
        let mut old_vertex_to_corner_map = vec![u32::MAX; max_num_vertices];
        let mut edge_owner: HashMap<(u32, u32), u32> = HashMap::new();
        let num_components = 1usize.min(num_symbols);

        match traversal_type {
            EdgebreakerTraversalType::Standard => {
                in_buffer
                    .start_bit_decoding(true)
                    .map_err(|e| DracoError::BufferError(format!("Failed to start corner-flag bit decoding: {e}")))?;
                let mut is_new: Vec<[bool; 3]> = Vec::with_capacity(num_symbols);
                for _ in 0..num_symbols {
                    let mut flags = [false; 3];
                    for flag in &mut flags {
                        let bit = in_buffer
                            .decode_least_significant_bits32(1)
                            .map_err(|e| DracoError::BufferError(format!("Failed to read corner flag: {e}")))?;
                        *flag = bit != 0;
                    }
                    is_new.push(flags);
                }
                in_buffer.end_bit_decoding();

                for (face_idx, flags) in is_new.iter().enumerate() {
                    let corner = (face_idx * 3) as u32;
                    let mut verts = [PointIndex(0); 3];
                    for (k, vert) in verts.iter_mut().enumerate() {
                        *vert = if flags[k] {
                            if next_point_id as usize >= max_num_vertices {
                                return Err(DracoError::MalformedBitstream("Unexpected number of decoded vertices".to_string()));
                            }
                            let p = PointIndex(next_point_id);
                            next_point_id += 1;
                            p
                        } else {
                            let id = in_buffer
                                .decode_varint()
                                .map_err(|e| DracoError::BufferError(format!("Failed to read vertex back-reference: {e}")))?
                                as u32;
                            if id as usize >= max_num_vertices {
                                return Err(DracoError::MalformedBitstream("Invalid vertex back-reference".to_string()));
                            }
                            PointIndex(id)
                        };

                        let c = corner + k as u32;
                        corner_table.map_corner_to_vertex(c, *vert);
                        if old_vertex_to_corner_map[vert.0 as usize] == u32::MAX {
                            old_vertex_to_corner_map[vert.0 as usize] = c;
                        }
                    }

                    // Link this face's three edges against whichever earlier corner
                    // (if any) shares the same unordered vertex pair.
                    for k in 0..3 {
                        let c = corner + k as u32;
                        let a = verts[(k + 1) % 3];
                        let b = verts[(k + 2) % 3];
                        let key = (a.0.min(b.0), a.0.max(b.0));
                        if let Some(other) = edge_owner.remove(&key) {
                            corner_table.link(c, other);
                        } else {
                            edge_owner.insert(key, c);
                        }
                    }
                }
            }
            EdgebreakerTraversalType::ValenceAdaptive => {
                // Mirrors the encoder: one rANS context per vertex-valence
                // bucket of the immediately-preceding corner's running
                // reference count. Vertex assignment has to happen inline
                // with flag decoding (rather than in two passes like the
                // standard path) since the context for corner N depends on
                // which vertex corner N-1 actually resolved to.
                let mut context_decoders: Vec<RAnsBitDecoder> =
                    (0..NUM_VALENCE_CONTEXTS).map(|_| RAnsBitDecoder::new()).collect();
                for dec in &mut context_decoders {
                    if !dec.start_decoding(in_buffer) {
                        return Err(DracoError::MalformedBitstream(
                            "Failed to start valence-adaptive corner-flag decoding".to_string(),
                        ));
                    }
                }

                let mut ref_count: HashMap<u32, u32> = HashMap::new();
                let mut prev_vertex: Option<u32> = None;

                for face_idx in 0..num_symbols {
                    let corner = (face_idx * 3) as u32;
                    let mut verts = [PointIndex(0); 3];
                    for (k, vert) in verts.iter_mut().enumerate() {
                        let bucket = match prev_vertex {
                            Some(pv) => valence_context_bucket(*ref_count.get(&pv).unwrap_or(&0)),
                            None => 0,
                        };
                        let is_new_flag = context_decoders[bucket].decode_next_bit();

                        *vert = if is_new_flag {
                            if next_point_id as usize >= max_num_vertices {
                                return Err(DracoError::MalformedBitstream("Unexpected number of decoded vertices".to_string()));
                            }
                            let p = PointIndex(next_point_id);
                            next_point_id += 1;
                            p
                        } else {
                            let id = in_buffer
                                .decode_varint()
                                .map_err(|e| DracoError::BufferError(format!("Failed to read vertex back-reference: {e}")))?
                                as u32;
                            if id as usize >= max_num_vertices {
                                return Err(DracoError::MalformedBitstream("Invalid vertex back-reference".to_string()));
                            }
                            PointIndex(id)
                        };

                        let c = corner + k as u32;
                        corner_table.map_corner_to_vertex(c, *vert);
                        if old_vertex_to_corner_map[vert.0 as usize] == u32::MAX {
                            old_vertex_to_corner_map[vert.0 as usize] = c;
                        }
                        *ref_count.entry(vert.0).or_insert(0) += 1;
                        prev_vertex = Some(vert.0);
                    }

                    for k in 0..3 {
                        let c = corner + k as u32;
                        let a = verts[(k + 1) % 3];
                        let b = verts[(k + 2) % 3];
                        let key = (a.0.min(b.0), a.0.max(b.0));
                        if let Some(other) = edge_owner.remove(&key) {
                            corner_table.link(c, other);
                        } else {
                            edge_owner.insert(key, c);
                        }
                    }
                }

                for dec in &mut context_decoders {
                    dec.end_decoding();
                }
            }
        }
        self.attribute_seam_corners.clear();
        for _ in 0..num_attribute_data {
            let mut seam_corners = Vec::new();
            let mut seam_decoder = RAnsBitDecoder::new();
            if !seam_decoder.start_decoding(in_buffer) {
                return Err(DracoError::MalformedBitstream("Failed to start seam decoding".to_string()));
            }

            for f in 0..total_num_faces {
                for k in 0..3 {
                    let c = (f * 3 + k) as u32;
                    let opp = corner_table.opposite(c);
                    if opp.is_none() {
                        // Boundary edges are automatically seams
                        seam_corners.push(c);
                        continue;
                    }
                    
                    let opp_val = opp.expect("checked is_some above");
                    let opp_face = (opp_val / 3) as usize;
                    
                    // Only decode seam bit for edges where this face was processed first
                    // (to avoid decoding the same edge twice)
                    if f < opp_face {
                        let is_seam = seam_decoder.decode_next_bit();
                        if is_seam {
                            // Store both corners of the seam edge so that we can
                            // reliably break opposite links in either direction.
                            seam_corners.push(c);
                            seam_corners.push(opp_val);
                        }
                    }
                }
            }
            seam_decoder.end_decoding();
            self.attribute_seam_corners.push(seam_corners);
        }

        if num_decoded_faces != total_num_faces {
            return Err(DracoError::MalformedBitstream("Unexpected number of decoded faces".to_string()));
        }

        // Compact vertices
        let mut used_point_ids = Vec::new();
        for c in &corner_table.corners {
            used_point_ids.push(c.vertex.0);
        }
        used_point_ids.sort_unstable();
        used_point_ids.dedup();
        
        let mut old_to_new = HashMap::new();
        for (i, &old_id) in used_point_ids.iter().enumerate() {
            old_to_new.insert(old_id, PointIndex(i as u32));
        }

        // Build data_to_corner_map in final (compacted) vertex id order.
        let mut data_to_corner_map = vec![u32::MAX; used_point_ids.len()];
        for (new_id, &old_id) in used_point_ids.iter().enumerate() {
            let corner = old_vertex_to_corner_map
                .get(old_id as usize)
                .copied()
                .unwrap_or(u32::MAX);
            data_to_corner_map[new_id] = corner;
        }
        
        // Update CornerTable
        for c in &mut corner_table.corners {
            if let Some(&new_v) = old_to_new.get(&c.vertex.0) {
                c.vertex = new_v;
            }
        }

        // Rebuild vertex_to_left_most_corner
        corner_table.vertex_to_left_most_corner.clear();
        for (c_idx, c) in corner_table.corners.iter().enumerate() {
            corner_table.vertex_to_left_most_corner.entry(c.vertex).or_insert(c_idx as u32);
        }

        // Copy to mesh
        for i in 0..total_num_faces {
            let (v0, v1, v2) = corner_table.get_face_vertices(i);
            mesh.set_face(FaceIndex(i as u32), [v0, v1, v2]);
        }
        
        mesh.set_num_points(used_point_ids.len());

        // Store mapping for attribute decoding (data id == vertex id for the decoded mesh).
        // Safe because corner indices remain valid after vertex id compaction.
        self.data_to_corner_map = Some(data_to_corner_map);

        Ok(num_components)
    }
    pub fn decode_symbol_stream(in_buffer: &mut DecoderBuffer, num_symbols: usize) -> Result<Vec<u32>, DracoError> {
        if num_symbols == 0 {
            return Ok(Vec::new());
        }

        // Traversal symbols are stored as a size-prefixed bit sequence.
        in_buffer
            .start_bit_decoding(true)
            .map_err(|e| DracoError::BufferError(format!("Failed to start traversal symbol bit decoding: {e}")))?;

        let mut symbols = Vec::with_capacity(num_symbols);
        for _ in 0..num_symbols {
            let first_bit = in_buffer
                .decode_least_significant_bits32(1)
                .map_err(|e| DracoError::BufferError(format!("Failed to read traversal symbol: {e}")))?;
            let topology = if first_bit == 0 {
                0u32
            } else {
                let suffix = in_buffer
                    .decode_least_significant_bits32(2)
                    .map_err(|e| DracoError::BufferError(format!("Failed to read traversal symbol suffix: {e}")))?;
                1u32 | (suffix << 1)
            };
            symbols.push(Self::topology_bit_pattern_to_symbol_id(topology)?);
        }

        // Skip to the end of the traversal symbol bit sequence so subsequent data
        // (start faces, seams) is aligned.
        in_buffer.end_bit_decoding();

        Ok(symbols)
    }
}

struct CornerTable {
    corners: Vec<Corner>,
    vertex_to_left_most_corner: HashMap<PointIndex, u32>,
}

#[derive(Clone, Copy, Debug)]
struct Corner {
    opposite: Option<u32>,
    vertex: PointIndex,
}

impl CornerTable {
    fn new(num_faces: usize) -> Self {
        Self {
            corners: vec![Corner { opposite: None, vertex: PointIndex(0) }; num_faces * 3],
            vertex_to_left_most_corner: HashMap::new(),
        }
    }

    fn set_left_most_corner(&mut self, v: PointIndex, c: u32) {
        self.vertex_to_left_most_corner.insert(v, c);
    }
    
    fn left_most_corner(&self, v: PointIndex) -> Option<u32> {
        self.vertex_to_left_most_corner.get(&v).cloned()
    }

    fn map_corner_to_vertex(&mut self, corner: u32, vertex: PointIndex) {
        self.corners[corner as usize].vertex = vertex;
    }

    fn next(&self, corner: u32) -> u32 {
        if corner % 3 == 2 { corner - 2 } else { corner + 1 }
    }

    fn prev(&self, corner: u32) -> u32 {
        if corner % 3 == 0 { corner + 2 } else { corner - 1 }
    }

    #[allow(dead_code)]
    fn set_face_vertices(&mut self, face_idx: usize, v0: PointIndex, v1: PointIndex, v2: PointIndex) {
        let base = face_idx * 3;
        self.corners[base].vertex = v0;
        self.corners[base + 1].vertex = v1;
        self.corners[base + 2].vertex = v2;
    }

    #[allow(dead_code)]
    fn get_face_vertices(&self, face_idx: usize) -> (PointIndex, PointIndex, PointIndex) {
        let base = face_idx * 3;
        (
            self.corners[base].vertex,
            self.corners[base + 1].vertex,
            self.corners[base + 2].vertex,
        )
    }
    
    fn get_vertex(&self, corner: u32) -> PointIndex {
        self.corners[corner as usize].vertex
    }

    fn link(&mut self, c1: u32, c2: u32) {
        self.corners[c1 as usize].opposite = Some(c2);
        self.corners[c2 as usize].opposite = Some(c1);
    }

    fn opposite(&self, corner: u32) -> Option<u32> {
        self.corners[corner as usize].opposite
    }

    fn swing_left(&self, corner: u32) -> Option<u32> {
        // SwingLeft(c) = Previous(Opposite(Previous(c)))
        let prev = self.prev(corner);
        let opp = self.opposite(prev)?;
        Some(self.prev(opp))
    }

    #[allow(dead_code)]
    fn swing_right(&self, corner: u32) -> Option<u32> {
        // SwingRight(c) = Next(Opposite(Next(c)))
        let next = self.next(corner);
        let opp = self.opposite(next)?;
        Some(self.next(opp))
    }

    fn make_vertex_isolated(&mut self, v: PointIndex) {
        self.vertex_to_left_most_corner.remove(&v);
    }
}

//! Draco Core - Fundamental utilities and data types
//!
//! This crate provides the core building blocks for the Draco 3D compression library,
//! including basic data types, error handling, and the encoder/decoder implementations
//! for point clouds and meshes.

pub mod ans;
pub mod attribute_octahedron_transform;
pub mod attribute_quantization_transform;
pub mod attribute_transform;
pub mod attribute_transform_data;
pub mod bit_utils;
pub mod compression_config;
pub mod corner_table;
pub mod data_buffer;
pub mod decoder_buffer;
pub mod direct_bit_decoder;
pub mod direct_bit_encoder;
pub mod draco_types;
pub mod dynamic_integer_points_kd_tree;
pub mod encoder_buffer;
pub mod encoder_options;
pub mod folded_bit32_coder;
pub mod geometry_attribute;
pub mod geometry_indices;
pub mod kd_tree_attributes_decoder;
pub mod kd_tree_attributes_encoder;
pub mod math_utils;
pub mod mesh;
pub mod mesh_decoder;
pub mod mesh_edgebreaker_decoder;
pub mod mesh_edgebreaker_encoder;
pub mod mesh_edgebreaker_shared;
pub mod mesh_encoder;
pub mod mesh_prediction_scheme_data;
pub mod normal_compression_utils;
pub mod point_cloud;
pub mod point_cloud_decoder;
pub mod point_cloud_encoder;
pub mod prediction_scheme;
pub mod prediction_scheme_constrained_multi_parallelogram;
pub mod prediction_scheme_delta;
pub mod prediction_scheme_geometric_normal;
pub mod prediction_scheme_normal_octahedron_canonicalized_decoding_transform;
pub mod prediction_scheme_normal_octahedron_canonicalized_encoding_transform;
pub mod prediction_scheme_normal_octahedron_canonicalized_transform_base;
pub mod prediction_scheme_normal_octahedron_transform_base;
pub mod prediction_scheme_parallelogram;
pub mod prediction_scheme_selection;
pub mod prediction_scheme_tex_coords_portable;
pub mod prediction_scheme_wrap;
pub mod quantization_utils;
pub mod rans_bit_decoder;
pub mod rans_bit_encoder;
pub mod rans_symbol_coding;
pub mod rans_symbol_decoder;
pub mod rans_symbol_encoder;
pub mod sequential_attribute_decoder;
pub mod sequential_attribute_encoder;
pub mod sequential_generic_attribute_decoder;
pub mod sequential_integer_attribute_decoder;
pub mod sequential_integer_attribute_encoder;
pub mod sequential_normal_attribute_encoder;
pub mod shannon_entropy;
pub mod status;
pub mod symbol_encoding;
pub mod vector_extensions;
pub mod version;

// Re-export commonly used types for convenience.
pub use draco_types::DataType;
pub use geometry_indices::{AttributeValueIndex, CornerIndex, FaceIndex, PointIndex, VertexIndex};
pub use mesh::Mesh;
pub use point_cloud::PointCloud;
pub use status::{error_status, ok_status, DracoError, Status};

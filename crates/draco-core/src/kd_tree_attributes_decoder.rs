use crate::attribute_quantization_transform::AttributeQuantizationTransform;
use crate::attribute_transform::AttributeTransform;
use crate::decoder_buffer::DecoderBuffer;
use crate::draco_types::DataType;
use crate::dynamic_integer_points_kd_tree::DynamicIntegerPointsKdTreeDecoder;
use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::geometry_indices::PointIndex;
use crate::point_cloud::PointCloud;

pub struct KdTreeAttributesDecoder {
    attribute_ids: Vec<i32>,
    quantized_portable_attributes: Vec<PointAttribute>,
    attribute_quantization_transforms: Vec<AttributeQuantizationTransform>,
    min_signed_values: Vec<i32>,
    attribute_specs: Vec<AttributeSpec>,
    signed_attribute_specs: Vec<SignedAttributeSpec>,
    cached_decoded: Option<CachedDecoded>,
}

#[derive(Clone)]
struct AttributeSpec {
    att_id: i32,
    offset: usize,
    num_components: usize,
    data_type: DataType,
}

#[derive(Clone)]
struct SignedAttributeSpec {
    att_id: i32,
    offset: usize,
    num_components: usize,
    data_type: DataType,
}

impl KdTreeAttributesDecoder {
    pub fn new(first_att_id: i32) -> Self {
        Self {
            attribute_ids: vec![first_att_id],
            quantized_portable_attributes: Vec::new(),
            attribute_quantization_transforms: Vec::new(),
            min_signed_values: Vec::new(),
            attribute_specs: Vec::new(),
            signed_attribute_specs: Vec::new(),
            cached_decoded: None,
        }
    }

    pub fn add_attribute_id(&mut self, att_id: i32) {
        self.attribute_ids.push(att_id);
    }

    pub fn decode_attributes_decoder_data(
        &mut self,
        point_cloud: &mut PointCloud,
        in_buffer: &mut DecoderBuffer,
    ) -> bool {
        self.attribute_ids.clear();
        let num_attributes = match in_buffer.decode_varint() {
            Ok(v) => v as usize,
            Err(_) => return false,
        };
        
        for _ in 0..num_attributes {
            let att_type_val = match in_buffer.decode_u8() { Ok(v) => v, Err(_) => return false };
            let att_type = match att_type_val {
                0 => GeometryAttributeType::Position,
                1 => GeometryAttributeType::Normal,
                2 => GeometryAttributeType::Color,
                3 => GeometryAttributeType::TexCoord,
                4 => GeometryAttributeType::Generic,
                _ => GeometryAttributeType::Invalid,
            };
            
            let data_type_val = match in_buffer.decode_u8() { Ok(v) => v, Err(_) => return false };
            let data_type = match data_type_val {
                1 => DataType::Int8,
                2 => DataType::Uint8,
                3 => DataType::Int16,
                4 => DataType::Uint16,
                5 => DataType::Int32,
                6 => DataType::Uint32,
                7 => DataType::Int64,
                8 => DataType::Uint64,
                9 => DataType::Float32,
                10 => DataType::Float64,
                11 => DataType::Bool,
                _ => DataType::Invalid,
            };
            
            let num_components = match in_buffer.decode_u8() { Ok(v) => v, Err(_) => return false };
            let normalized = match in_buffer.decode_u8() { Ok(v) => v != 0, Err(_) => return false };
            let unique_id = match in_buffer.decode_varint() { Ok(v) => v as u32, Err(_) => return false };
            
            let mut att = PointAttribute::new();
            att.init(att_type, num_components, data_type, normalized, point_cloud.num_points());
            att.set_unique_id(unique_id);
            
            let att_id = point_cloud.add_attribute(att);
            self.attribute_ids.push(att_id);
        }
        true
    }

    pub fn decode_attributes(
        &mut self,
        point_cloud: &mut PointCloud,
        in_buffer: &mut DecoderBuffer,
    ) -> bool {
        if !self.decode_portable_attributes(point_cloud, in_buffer) {
            return false;
        }
        if !self.decode_data_needed_by_portable_transforms(point_cloud, in_buffer) {
            return false;
        }
        if !self.transform_attributes_to_original_format(point_cloud) {
            return false;
        }
        true
    }

    fn decode_portable_attributes(
        &mut self,
        point_cloud: &mut PointCloud,
        in_buffer: &mut DecoderBuffer,
    ) -> bool {
        let num_expected_points = point_cloud.num_points();
        // Don't clear transforms/min_values here as they are decoded separately.
        self.quantized_portable_attributes.clear();
        self.attribute_specs.clear();
        self.signed_attribute_specs.clear();
        self.cached_decoded = None;

        let compression_level = match in_buffer.decode_u8() {
            Ok(v) => v,
            Err(_) => return false,
        };

        let mut total_dimensionality: usize = 0;
        let mut float_specs: Vec<(i32, usize, usize)> = Vec::new();

        for &att_id in &self.attribute_ids {
            let att = point_cloud.attribute(att_id);
            let num_components = att.num_components() as usize;
            self.attribute_specs.push(AttributeSpec {
                att_id,
                offset: total_dimensionality,
                num_components,
                data_type: att.data_type(),
            });
            match att.data_type() {
                DataType::Uint32 | DataType::Uint16 | DataType::Uint8 => {}
                DataType::Int32 | DataType::Int16 | DataType::Int8 => {
                    self.signed_attribute_specs.push(SignedAttributeSpec {
                        att_id,
                        offset: total_dimensionality,
                        num_components,
                        data_type: att.data_type(),
                    });
                    self.min_signed_values.resize(self.min_signed_values.len() + num_components, 0);
                }
                DataType::Float32 => {
                    float_specs.push((att_id, total_dimensionality, num_components));
                }
                _ => return false,
            }
            total_dimensionality += num_components;
        }

        let mut decoder = DynamicIntegerPointsKdTreeDecoder::new(compression_level, total_dimensionality as u32);
        let decoded = match decoder.decode_points(in_buffer, num_expected_points as u32) {
            Some(v) => v,
            None => return false,
        };
        if decoder.num_decoded_points() as usize != num_expected_points {
            return false;
        }
        if decoded.len() != num_expected_points * total_dimensionality {
            return false;
        }

        // Fill non-float attributes directly, and create portable attributes for float.
        for (att_id, offset, num_components) in float_specs {
            let att = point_cloud.attribute(att_id);
            let mut portable = PointAttribute::default();
            portable.init(att.attribute_type(), att.num_components(), DataType::Uint32, false, num_expected_points);
            portable.set_identity_mapping();

            write_u32_components_from_decoded(
                &decoded,
                total_dimensionality,
                offset,
                num_components,
                num_expected_points,
                &mut portable,
                DataType::Uint32,
            );

            self.quantized_portable_attributes.push(portable);
        }

        for spec in &self.attribute_specs {
            if matches!(spec.data_type, DataType::Uint32 | DataType::Uint16 | DataType::Uint8) {
                let att = point_cloud.attribute_mut(spec.att_id);
                write_u32_components_from_decoded(
                    &decoded,
                    total_dimensionality,
                    spec.offset,
                    spec.num_components,
                    num_expected_points,
                    att,
                    spec.data_type,
                );
            }
        }

        // Store decoded stream for later transforms.
        // We keep it by re-decoding into attributes as needed using stored offsets.
        // (For now we stash it into a hidden field by reconstructing on demand is expensive,
        // so we compute signed values later by reading from decoded slice again.)
        self.cached_decoded = Some(CachedDecoded {
            decoded,
            total_dimensionality,
        });

        true
    }

    pub fn decode_data_needed_by_portable_transforms(
        &mut self,
        point_cloud: &mut PointCloud,
        in_buffer: &mut DecoderBuffer,
    ) -> bool {
        // Float quantization parameters in attribute order.
        for &att_id in &self.attribute_ids {
            let att = point_cloud.attribute(att_id);
            if att.data_type() == DataType::Float32 {
                let mut min_values = vec![0.0f32; att.num_components() as usize];
                for v in &mut min_values {
                    *v = match in_buffer.decode::<f32>() {
                        Ok(x) => x,
                        Err(_) => return false,
                    };
                }
                let range = match in_buffer.decode::<f32>() {
                    Ok(x) => x,
                    Err(_) => return false,
                };
                let bits = match in_buffer.decode_u8() {
                    Ok(x) => x,
                    Err(_) => return false,
                };
                if bits > 31 {
                    return false;
                }
                let mut t = AttributeQuantizationTransform::new();
                if !t.set_parameters(bits as i32, &min_values, range) {
                    return false;
                }
                self.attribute_quantization_transforms.push(t);
            }
        }

        // Signed min values.
        for i in 0..self.min_signed_values.len() {
            self.min_signed_values[i] = match in_buffer.decode_varint_signed_i32() {
                Ok(v) => v,
                Err(_) => return false,
            };
        }

        true
    }

    pub fn transform_attributes_to_original_format(
        &mut self,
        point_cloud: &mut PointCloud,
    ) -> bool {
        let cached = match self.cached_decoded.take() {
            Some(c) => c,
            None => return false,
        };

        // Floats.
        let mut float_attr_index = 0usize;
        for &att_id in &self.attribute_ids {
            let dt = point_cloud.attribute(att_id).data_type();
            if dt == DataType::Float32 {
                let portable = &self.quantized_portable_attributes[float_attr_index];
                let transform = &self.attribute_quantization_transforms[float_attr_index];

                let target = point_cloud.attribute_mut(att_id);
                if !transform.inverse_transform_attribute(portable, target) {
                    return false;
                }

                float_attr_index += 1;
            }
        }

        // Signed ints.
        let mut min_index = 0usize;
        for spec in &self.signed_attribute_specs {
            let att = point_cloud.attribute_mut(spec.att_id);
            let num_points = att.size();
            if num_points == 0 {
                continue;
            }

            let stride = att.byte_stride() as usize;
            let component_size = att.data_type().byte_length();

            for p in 0..num_points {
                let avi = att.mapped_index(PointIndex(p as u32));
                let base = avi.0 as usize * stride;
                for c in 0..spec.num_components {
                    let unsigned = cached.decoded[p * cached.total_dimensionality + spec.offset + c];
                    let signed = unsigned as i64 + self.min_signed_values[min_index + c] as i64;
                    write_signed_component(att.buffer_mut(), base + c * component_size, spec.data_type, signed);
                }
            }
            min_index += spec.num_components;
        }

        true
    }
}

struct CachedDecoded {
    decoded: Vec<u32>,
    total_dimensionality: usize,
}

fn write_u32_components_from_decoded(
    decoded: &[u32],
    total_dimensionality: usize,
    offset: usize,
    num_components: usize,
    num_points: usize,
    target_attribute: &mut PointAttribute,
    target_type: DataType,
) {
    let stride = target_attribute.byte_stride() as usize;
    let component_size = target_type.byte_length();
    for p in 0..num_points {
        let avi = target_attribute.mapped_index(PointIndex(p as u32));
        let base = avi.0 as usize * stride;
        for c in 0..num_components {
            let v = decoded[p * total_dimensionality + offset + c];
            write_unsigned_component(target_attribute.buffer_mut(), base + c * component_size, target_type, v);
        }
    }
}

fn write_unsigned_component(
    buffer: &mut crate::data_buffer::DataBuffer,
    offset: usize,
    data_type: DataType,
    value: u32,
) {
    match data_type {
        DataType::Uint8 => {
            buffer.write(offset, &[value as u8]);
        }
        DataType::Uint16 => {
            buffer.write(offset, &(value as u16).to_le_bytes());
        }
        DataType::Uint32 => {
            buffer.write(offset, &value.to_le_bytes());
        }
        _ => {}
    }
}

fn write_signed_component(
    buffer: &mut crate::data_buffer::DataBuffer,
    offset: usize,
    data_type: DataType,
    value: i64,
) {
    match data_type {
        DataType::Int8 => {
            buffer.write(offset, &[(value as i8) as u8]);
        }
        DataType::Int16 => {
            buffer.write(offset, &(value as i16).to_le_bytes());
        }
        DataType::Int32 => {
            buffer.write(offset, &(value as i32).to_le_bytes());
        }
        _ => {}
    }
}

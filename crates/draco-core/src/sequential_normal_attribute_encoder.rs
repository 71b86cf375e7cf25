use crate::sequential_integer_attribute_encoder::SequentialIntegerAttributeEncoder;
use crate::attribute_octahedron_transform::AttributeOctahedronTransform;
use crate::encoder_buffer::EncoderBuffer;
use crate::point_cloud::PointCloud;
use crate::geometry_indices::PointIndex;
use crate::encoder_options::EncoderOptions;
use crate::point_cloud_encoder::GeometryEncoder;
use crate::geometry_attribute::GeometryAttributeType;
use crate::prediction_scheme::PredictionSchemeMethod;
use crate::draco_types::DataType;

pub struct SequentialNormalAttributeEncoder {
    base: SequentialIntegerAttributeEncoder,
    attribute_octahedron_transform: AttributeOctahedronTransform,
    portable_attribute: crate::geometry_attribute::PointAttribute,
}

impl Default for SequentialNormalAttributeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialNormalAttributeEncoder {
    pub fn new() -> Self {
        Self {
            base: SequentialIntegerAttributeEncoder::new(),
            attribute_octahedron_transform: AttributeOctahedronTransform::new(-1),
            portable_attribute: crate::geometry_attribute::PointAttribute::default(),
        }
    }

    pub fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32, options: &EncoderOptions) -> bool {
        if !self.base.init(attribute_id) {
            return false;
        }
        
        let attribute = point_cloud.attribute(attribute_id);
        if attribute.num_components() != 3 {
            return false;
        }

        let quantization_bits = options.get_attribute_int(attribute_id, "quantization_bits", -1);
        if quantization_bits < 1 {
            return false;
        }
        self.attribute_octahedron_transform.set_parameters(quantization_bits);
        true
    }

    pub fn encode_data_needed_by_portable_transform(&self, out_buffer: &mut EncoderBuffer) -> bool {
        // attribute_octahedron_transform_.EncodeParameters(out_buffer)
        // Wait, AttributeOctahedronTransform doesn't have EncodeParameters in Rust?
        // Let's check AttributeOctahedronTransform.
        // It has generate_portable_attribute.
        // But EncodeParameters is needed.
        // In C++, AttributeOctahedronTransform::EncodeParameters writes quantization_bits.
        out_buffer.encode(self.attribute_octahedron_transform.quantization_bits() as u8);
        true
    }

    pub fn encode_values(
        &mut self,
        point_cloud: &PointCloud,
        point_ids: &[PointIndex],
        out_buffer: &mut EncoderBuffer,
        options: &EncoderOptions,
        encoder: &dyn GeometryEncoder,
    ) -> bool {
        let attribute_id = self.base.base.attribute_id();
        let attribute = point_cloud.attribute(attribute_id);

        // Prepare values (transform to octahedral coordinates)
        self.portable_attribute = crate::geometry_attribute::PointAttribute::new();
        self.portable_attribute.init(
            crate::geometry_attribute::GeometryAttributeType::Generic,
            2,
            DataType::Uint32,
            false,
            point_ids.len()
        );
        
        if self.attribute_octahedron_transform.generate_portable_attribute(
            attribute,
            point_ids,
            point_ids.len(),
            &mut self.portable_attribute
        ).is_err() {
            return false;
        }
        
        let quantization_bits = self.attribute_octahedron_transform.quantization_bits();
        // quantization_bits can be 31; avoid signed shift overflow.
        let max_value: i32 = ((1u64 << (quantization_bits as u32)) - 1) as i32;

        // The geometric-normal predictor needs a corner table and the mesh's
        // position attribute to predict a normal from local geometry; fall
        // back to plain delta coding over canonicalized octahedral
        // coordinates when either is unavailable (e.g. point clouds).
        let can_predict_from_geometry = encoder.corner_table().is_some()
            && point_cloud.named_attribute(GeometryAttributeType::Position).is_some();

        self.base.set_normal_octahedron_max_value(max_value);
        self.base.set_forced_prediction_method(if can_predict_from_geometry {
            PredictionSchemeMethod::MeshPredictionGeometricNormal
        } else {
            PredictionSchemeMethod::Difference
        });

        self.base.encode_values(
            point_cloud,
            point_ids,
            out_buffer,
            options,
            encoder,
            Some(&self.portable_attribute),
            true,
        )
    }
}

// Copyright 2022 The Draco Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte-aligned and bit-aligned output buffer used by every encoder in this
//! crate. Mirrors `DecoderBuffer` so a stream written here can always be
//! parsed back symmetrically.

/// Types that can be appended to an [`EncoderBuffer`] as little-endian bytes.
pub trait Encodable: Sized {
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_encodable {
    ($($t:ty),*) => {
        $(
            impl Encodable for $t {
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_encodable!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Bit-level cursor active while [`EncoderBuffer::start_bit_encoding`] is open.
#[derive(Debug, Clone)]
struct BitEncoderState {
    /// Offset (in bytes) of the first bit-packed byte within `buffer`.
    start_byte: usize,
    /// Number of bits written so far.
    bit_offset: usize,
    /// Offset of the varint-encoded bit count, if one was reserved.
    size_prefix_offset: Option<usize>,
}

/// Growable output buffer for Draco-style bitstreams. Byte-aligned values are
/// appended directly; bit-packed values go through [`start_bit_encoding`] /
/// [`end_bit_encoding`] so multiple bit sequences can be interleaved with
/// byte-aligned ones.
#[derive(Debug, Clone, Default)]
pub struct EncoderBuffer {
    buffer: Vec<u8>,
    bit_encoder: Option<BitEncoderState>,
    version_major: u8,
    version_minor: u8,
}

impl EncoderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.bit_encoder = None;
    }

    pub fn resize(&mut self, nbytes: usize) {
        self.buffer.resize(nbytes, 0);
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn bit_encoder_active(&self) -> bool {
        self.bit_encoder.is_some()
    }

    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.version_major = major;
        self.version_minor = minor;
    }

    pub fn version_major(&self) -> u8 {
        self.version_major
    }

    pub fn version_minor(&self) -> u8 {
        self.version_minor
    }

    /// Appends an arbitrary little-endian scalar. The generic counterpart of
    /// `encode_u8`/`encode_u16`/etc. for call sites that are generic over the
    /// attribute data type.
    pub fn encode<T: Encodable>(&mut self, value: T) {
        debug_assert!(!self.bit_encoder_active());
        value.write_le(&mut self.buffer);
    }

    pub fn encode_u8(&mut self, value: u8) {
        self.encode(value);
    }

    pub fn encode_u16(&mut self, value: u16) {
        self.encode(value);
    }

    pub fn encode_u32(&mut self, value: u32) {
        self.encode(value);
    }

    pub fn encode_u64(&mut self, value: u64) {
        self.encode(value);
    }

    /// Appends raw bytes verbatim (magic numbers, pre-serialized sub-buffers).
    pub fn encode_data(&mut self, data: &[u8]) {
        debug_assert!(!self.bit_encoder_active());
        self.buffer.extend_from_slice(data);
    }

    /// LEB128 unsigned varint, matching `DecoderBuffer::decode_varint`.
    pub fn encode_varint(&mut self, mut value: u64) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buffer.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// Zig-zag encoded signed varint, used for the deltas in the kd-tree and
    /// edgebreaker topology-split coders.
    pub fn encode_varint_signed_i32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.encode_varint(zigzag as u64);
    }

    /// Opens a bit-packed region. `required_bits` is an upper bound used to
    /// reserve space; `encode_size` additionally stores the exact bit count
    /// as a leading varint so the paired decoder can realign afterwards
    /// without tracking it out of band.
    pub fn start_bit_encoding(&mut self, required_bits: usize, encode_size: bool) {
        assert!(!self.bit_encoder_active(), "bit encoder already active");
        let _ = required_bits;

        let size_prefix_offset = if encode_size {
            let offset = self.buffer.len();
            // Reserved and patched in `end_bit_encoding` once the final bit
            // count is known; varint width is resolved at that point.
            Some(offset)
        } else {
            None
        };

        self.bit_encoder = Some(BitEncoderState {
            start_byte: self.buffer.len(),
            bit_offset: 0,
            size_prefix_offset,
        });
    }

    fn put_bit(&mut self, bit: bool) {
        let state = self.bit_encoder.as_mut().expect("bit encoder not active");
        let byte_index = state.start_byte + state.bit_offset / 8;
        if byte_index >= self.buffer.len() {
            self.buffer.push(0);
        }
        let bit_shift = (state.bit_offset % 8) as u8;
        if bit {
            self.buffer[byte_index] |= 1 << bit_shift;
        }
        state.bit_offset += 1;
    }

    /// Writes the `nbits` least-significant bits of `value`, LSB first.
    pub fn encode_least_significant_bits32(&mut self, nbits: u32, value: u32) {
        assert!(nbits <= 32, "cannot encode more than 32 bits at once");
        for i in 0..nbits {
            self.put_bit((value >> i) & 1 != 0);
        }
    }

    /// Closes the bit-packed region opened by `start_bit_encoding`.
    pub fn end_bit_encoding(&mut self) {
        let state = self
            .bit_encoder
            .take()
            .expect("end_bit_encoding called without a matching start_bit_encoding");

        if let Some(prefix_offset) = state.size_prefix_offset {
            let mut size_bytes = Vec::new();
            let mut bits = state.bit_offset as u64;
            loop {
                let mut byte = (bits & 0x7f) as u8;
                bits >>= 7;
                if bits != 0 {
                    byte |= 0x80;
                }
                size_bytes.push(byte);
                if bits == 0 {
                    break;
                }
            }
            // The bit-packed bytes were appended directly after the region
            // was opened; splice the now-known size varint in before them.
            let packed: Vec<u8> = self.buffer.drain(prefix_offset..).collect();
            self.buffer.extend_from_slice(&size_bytes);
            self.buffer.extend_from_slice(&packed);
        }
    }
}

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

//! Byte-aligned and bit-aligned input buffer, the decode-side counterpart of
//! [`crate::encoder_buffer::EncoderBuffer`]. Borrows its input rather than
//! owning it so sub-streams (e.g. an rANS-coded bit sequence) can be handed
//! out as slices without copying.

use crate::status::DracoError;

/// Types that can be read out of a [`DecoderBuffer`] as little-endian bytes.
pub trait Decodable: Sized {
    const SIZE: usize;
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_decodable {
    ($($t:ty),*) => {
        $(
            impl Decodable for $t {
                const SIZE: usize = std::mem::size_of::<$t>();
                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_decodable!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Bit-level cursor active while [`DecoderBuffer::start_bit_decoding`] is open.
#[derive(Debug, Clone)]
struct BitDecoderState {
    /// Offset (in bytes, within `data`) of the first bit-packed byte.
    start_byte: usize,
    /// Number of bits consumed so far.
    bit_offset: usize,
    /// Total number of packed bits, when known up front.
    num_bits: Option<usize>,
}

/// Borrowing cursor over a Draco-style bitstream.
#[derive(Debug, Clone)]
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    version_major: u8,
    version_minor: u8,
    bit_decoder: Option<BitDecoderState>,
}

impl<'a> DecoderBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            version_major: 0,
            version_minor: 0,
            bit_decoder: None,
        }
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

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Remaining, not-yet-consumed bytes. Borrowed with the buffer's own
    /// lifetime, independent of this call's `&self` borrow.
    pub fn remaining_data(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    pub fn bit_decoder_active(&self) -> bool {
        self.bit_decoder.is_some()
    }

    /// Advances the read cursor by `n` bytes, clamped to the buffer's end.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DracoError> {
        debug_assert!(!self.bit_decoder_active());
        if self.remaining_size() < n {
            return Err(DracoError::BufferError(format!(
                "attempted to read {} bytes with only {} remaining",
                n,
                self.remaining_size()
            )));
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..start + n])
    }

    /// Reads an arbitrary little-endian scalar. The generic counterpart of
    /// `decode_u8`/`decode_u16`/etc. for call sites generic over the
    /// attribute data type.
    pub fn decode<T: Decodable>(&mut self) -> Result<T, DracoError> {
        let bytes = self.take(T::SIZE)?;
        Ok(T::read_le(bytes))
    }

    pub fn decode_u8(&mut self) -> Result<u8, DracoError> {
        self.decode::<u8>()
    }

    pub fn decode_i8(&mut self) -> Result<i8, DracoError> {
        self.decode::<i8>()
    }

    pub fn decode_u16(&mut self) -> Result<u16, DracoError> {
        self.decode::<u16>()
    }

    pub fn decode_u32(&mut self) -> Result<u32, DracoError> {
        self.decode::<u32>()
    }

    pub fn decode_u64(&mut self) -> Result<u64, DracoError> {
        self.decode::<u64>()
    }

    pub fn decode_f32(&mut self) -> Result<f32, DracoError> {
        self.decode::<f32>()
    }

    pub fn decode_f64(&mut self) -> Result<f64, DracoError> {
        self.decode::<f64>()
    }

    /// Copies exactly `out.len()` bytes into `out`.
    pub fn decode_bytes(&mut self, out: &mut [u8]) -> Result<(), DracoError> {
        let bytes = self.take(out.len())?;
        out.copy_from_slice(bytes);
        Ok(())
    }

    /// Hands back a borrowed sub-slice of `n` bytes without copying. Used to
    /// feed an rANS sub-stream straight into `AnsDecoder::new`.
    pub fn decode_slice(&mut self, n: usize) -> Result<&'a [u8], DracoError> {
        self.take(n)
    }

    /// LEB128 unsigned varint, matching `EncoderBuffer::encode_varint`.
    pub fn decode_varint(&mut self) -> Result<u64, DracoError> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.decode_u8()?;
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= 64 {
                return Err(DracoError::BufferError("varint too long".to_string()));
            }
        }
        Ok(result)
    }

    /// Zig-zag decoded signed varint.
    pub fn decode_varint_signed_i32(&mut self) -> Result<i32, DracoError> {
        let zigzag = self.decode_varint()? as u32;
        Ok(((zigzag >> 1) as i32) ^ -((zigzag & 1) as i32))
    }

    /// Opens a bit-packed region. When `decode_size` is set, the leading
    /// varint written by `EncoderBuffer::end_bit_encoding` is consumed first
    /// so the caller knows exactly how many bits are available.
    pub fn start_bit_decoding(&mut self, decode_size: bool) -> Result<(), DracoError> {
        assert!(!self.bit_decoder_active(), "bit decoder already active");

        let num_bits = if decode_size {
            Some(self.decode_varint()? as usize)
        } else {
            None
        };

        self.bit_decoder = Some(BitDecoderState {
            start_byte: self.pos,
            bit_offset: 0,
            num_bits,
        });
        Ok(())
    }

    fn get_bit(&mut self) -> Result<bool, DracoError> {
        let state = self
            .bit_decoder
            .as_mut()
            .expect("bit decoder not active");
        if let Some(num_bits) = state.num_bits {
            if state.bit_offset >= num_bits {
                return Err(DracoError::BufferError(
                    "read past end of bit-packed region".to_string(),
                ));
            }
        }
        let byte_index = state.start_byte + state.bit_offset / 8;
        if byte_index >= self.data.len() {
            return Err(DracoError::BufferError(
                "read past end of buffer while bit decoding".to_string(),
            ));
        }
        let bit_shift = (state.bit_offset % 8) as u8;
        let bit = (self.data[byte_index] >> bit_shift) & 1 != 0;
        state.bit_offset += 1;
        Ok(bit)
    }

    /// Reads the `nbits` least-significant bits of a value, LSB first.
    pub fn decode_least_significant_bits32(&mut self, nbits: u32) -> Result<u32, DracoError> {
        assert!(nbits <= 32, "cannot decode more than 32 bits at once");
        let mut value = 0u32;
        for i in 0..nbits {
            if self.get_bit()? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    /// Closes the bit-packed region opened by `start_bit_decoding`, realigning
    /// the byte cursor to just past the packed bytes consumed.
    pub fn end_bit_decoding(&mut self) {
        let state = self
            .bit_decoder
            .take()
            .expect("end_bit_decoding called without a matching start_bit_decoding");

        let consumed_bits = state.num_bits.unwrap_or(state.bit_offset);
        let consumed_bytes = (consumed_bits + 7) / 8;
        self.pos = (state.start_byte + consumed_bytes).min(self.data.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_buffer::EncoderBuffer;

    #[test]
    fn byte_aligned_roundtrip() {
        let mut buf = EncoderBuffer::new();
        buf.encode_u8(7);
        buf.encode_u32(0x1234_5678);
        buf.encode_data(b"draco");

        let mut dec = DecoderBuffer::new(buf.data());
        assert_eq!(dec.decode_u8().unwrap(), 7);
        assert_eq!(dec.decode_u32().unwrap(), 0x1234_5678);
        let mut tag = [0u8; 5];
        dec.decode_bytes(&mut tag).unwrap();
        assert_eq!(&tag, b"draco");
    }

    #[test]
    fn short_read_is_an_error() {
        let data = [1u8, 2];
        let mut dec = DecoderBuffer::new(&data);
        assert!(dec.decode_u32().is_err());
    }

    #[test]
    fn decode_slice_borrows_from_buffer_lifetime() {
        let data = vec![1u8, 2, 3, 4, 5];
        let slice: &[u8];
        {
            let mut dec = DecoderBuffer::new(&data);
            dec.advance(1);
            slice = dec.decode_slice(3).unwrap();
        }
        assert_eq!(slice, &[2, 3, 4]);
    }

    #[test]
    fn bit_packing_roundtrip() {
        let mut buf = EncoderBuffer::new();
        buf.start_bit_encoding(4, true);
        buf.encode_least_significant_bits32(4, 0b1010);
        buf.end_bit_encoding();
        buf.encode_u8(0xAB);

        let mut dec = DecoderBuffer::new(buf.data());
        dec.start_bit_decoding(true).unwrap();
        assert_eq!(dec.decode_least_significant_bits32(4).unwrap(), 0b1010);
        dec.end_bit_decoding();
        assert_eq!(dec.decode_u8().unwrap(), 0xAB);
    }
}

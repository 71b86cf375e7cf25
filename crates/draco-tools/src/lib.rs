//! Shared argument parsing and option plumbing for the `draco_encoder` and
//! `draco_decoder` command-line tools.
//!
//! The on-disk flag syntax (`-i`, `-o`, `-qp`, ...) is single-dash, which
//! doesn't match `clap`'s derive-based `--long` convention, so arguments are
//! parsed by hand here, the same way the flags are laid out in the tools
//! this crate mirrors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing value for flag {0}")]
    MissingValue(String),
    #[error("unknown flag {0}")]
    UnknownFlag(String),
    #[error("invalid value {value:?} for flag {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("no input file specified (use -i <file>)")]
    MissingInput,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Draco(#[from] draco_core::status::DracoError),
}

/// Default position quantization, in bits, used when `-qp` is not given.
pub const DEFAULT_POS_QUANTIZATION_BITS: i32 = 11;
/// Default texture-coordinate quantization, in bits, used when `-qt` is not given.
pub const DEFAULT_TEX_COORD_QUANTIZATION_BITS: i32 = 10;
/// Default normal quantization, in bits, used when `-qn` is not given.
pub const DEFAULT_NORMAL_QUANTIZATION_BITS: i32 = 10;

#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub qp: i32,
    pub qt: i32,
    pub qn: i32,
    /// Compression level, 0..10. Encoding speed is `10 - cl`.
    pub cl: i32,
    pub force_point_cloud: bool,
}

impl EncodeOptions {
    pub fn encoding_speed(&self) -> i32 {
        10 - self.cl
    }
}

#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Appends `.drc` to an input path to compute the default encoder output path.
pub fn default_encoded_output(input: &std::path::Path) -> PathBuf {
    let mut s = input.as_os_str().to_os_string();
    s.push(".drc");
    PathBuf::from(s)
}

/// Strips a trailing `.drc` (if present) and appends `.obj`, otherwise just
/// appends `.obj`, to compute the default decoder output path.
pub fn default_decoded_output(input: &std::path::Path) -> PathBuf {
    match input.to_str() {
        Some(s) if s.ends_with(".drc") => PathBuf::from(format!("{}.obj", &s[..s.len() - 4])),
        _ => {
            let mut s = input.as_os_str().to_os_string();
            s.push(".obj");
            PathBuf::from(s)
        }
    }
}

fn next_value(args: &[String], i: &mut usize, flag: &str) -> Result<String, ToolError> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| ToolError::MissingValue(flag.to_string()))
}

fn parse_int(flag: &str, value: &str) -> Result<i32, ToolError> {
    value.parse::<i32>().map_err(|_| ToolError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

pub fn parse_encode_args(args: &[String]) -> Result<EncodeOptions, ToolError> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut qp = DEFAULT_POS_QUANTIZATION_BITS;
    let mut qt = DEFAULT_TEX_COORD_QUANTIZATION_BITS;
    let mut qn = DEFAULT_NORMAL_QUANTIZATION_BITS;
    let mut cl = 7;
    let mut force_point_cloud = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => input = Some(PathBuf::from(next_value(args, &mut i, "-i")?)),
            "-o" => output = Some(PathBuf::from(next_value(args, &mut i, "-o")?)),
            "-qp" => qp = parse_int("-qp", &next_value(args, &mut i, "-qp")?)?,
            "-qt" => qt = parse_int("-qt", &next_value(args, &mut i, "-qt")?)?,
            "-qn" => qn = parse_int("-qn", &next_value(args, &mut i, "-qn")?)?,
            "-cl" => cl = parse_int("-cl", &next_value(args, &mut i, "-cl")?)?.clamp(0, 10),
            "-point_cloud" => force_point_cloud = true,
            other => return Err(ToolError::UnknownFlag(other.to_string())),
        }
        i += 1;
    }

    let input = input.ok_or(ToolError::MissingInput)?;
    let output = output.unwrap_or_else(|| default_encoded_output(&input));

    Ok(EncodeOptions {
        input,
        output,
        qp,
        qt,
        qn,
        cl,
        force_point_cloud,
    })
}

pub fn parse_decode_args(args: &[String]) -> Result<DecodeOptions, ToolError> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => input = Some(PathBuf::from(next_value(args, &mut i, "-i")?)),
            "-o" => output = Some(PathBuf::from(next_value(args, &mut i, "-o")?)),
            other => return Err(ToolError::UnknownFlag(other.to_string())),
        }
        i += 1;
    }

    let input = input.ok_or(ToolError::MissingInput)?;
    let output = output.unwrap_or_else(|| default_decoded_output(&input));

    Ok(DecodeOptions { input, output })
}

/// Geometry type byte at header offset 7, peeked without building a full
/// `DecoderBuffer` so the caller can pick `MeshDecoder` vs `PointCloudDecoder`.
pub fn peek_geometry_type(data: &[u8]) -> Result<draco_core::compression_config::EncodedGeometryType, ToolError> {
    use draco_core::compression_config::EncodedGeometryType;
    use draco_core::status::DracoError;

    if data.len() < 8 || &data[0..5] != b"DRACO" {
        return Err(ToolError::Draco(DracoError::CorruptedHeader(
            "input is not a Draco bitstream".to_string(),
        )));
    }
    match data[7] {
        0 => Ok(EncodedGeometryType::PointCloud),
        1 => Ok(EncodedGeometryType::TriangularMesh),
        other => Err(ToolError::Draco(DracoError::CorruptedHeader(format!(
            "invalid geometry type {other}"
        )))),
    }
}

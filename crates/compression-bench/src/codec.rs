// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use clap::ValueEnum;

use crate::error::CodecError;

/// Single-shot, whole-buffer lossless byte compressor.
pub trait Codec {
    /// Human-readable codec name for logs.
    fn name(&self) -> &'static str;

    /// Compresses the whole of `raw` in one call.
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Inverse of [`Codec::compress`].
    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Snappy raw format, without stream framing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnappyCodec;

impl Codec for SnappyCodec {
    fn name(&self) -> &'static str {
        "snappy"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(snap::raw::Encoder::new().compress_vec(raw)?)
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(snap::raw::Decoder::new().decompress_vec(compressed)?)
    }
}

/// Zstandard, one frame per buffer.
#[derive(Clone, Copy, Debug)]
pub struct ZstdCodec {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self {
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(zstd::bulk::compress(raw, self.level)?)
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(zstd::decode_all(compressed)?)
    }
}

/// Codec selection on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CodecKind {
    /// [`SnappyCodec`].
    #[default]
    Snappy,
    /// [`ZstdCodec`].
    Zstd,
}

impl CodecKind {
    /// `zstd_level` is ignored by codecs without levels.
    pub fn build(self, zstd_level: i32) -> Box<dyn Codec> {
        match self {
            CodecKind::Snappy => Box::new(SnappyCodec),
            CodecKind::Zstd => Box::new(ZstdCodec { level: zstd_level }),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Snappy => f.write_str("snappy"),
            CodecKind::Zstd => f.write_str("zstd"),
        }
    }
}

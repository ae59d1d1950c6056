//! Compressor Module
//!
//! Optional byte stream transforms applied after serialization. At most one
//! strategy is active for a pipeline.

use std::io::{self, Read, Write};
use std::sync::Arc;

use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;

use crate::error::{CacheError, Result};

/// Compressor contract.
pub trait Compressor: Send + Sync + std::fmt::Debug {
    /// Compress everything read from `input` into `output`
    fn compress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()>;

    /// Decompress everything read from `input` into `output`
    fn decompress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()>;

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_stream(&mut &data[..], &mut output)?;
        Ok(output)
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_stream(&mut &data[..], &mut output)?;
        Ok(output)
    }
}

// == Gzip ==
/// Gzip compression via flate2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipCompressor;

impl Compressor for GzipCompressor {
    fn compress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()> {
        let mut encoder = GzEncoder::new(output, Compression::default());
        io::copy(input, &mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    fn decompress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()> {
        let mut decoder = GzDecoder::new(input);
        io::copy(&mut decoder, output)?;
        Ok(())
    }
}

// == Deflate ==
/// Raw deflate compression via flate2.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeflateCompressor;

impl Compressor for DeflateCompressor {
    fn compress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()> {
        let mut encoder = DeflateEncoder::new(output, Compression::default());
        io::copy(input, &mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    fn decompress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()> {
        let mut decoder = DeflateDecoder::new(input);
        io::copy(&mut decoder, output)?;
        Ok(())
    }
}

// == Compression Kind ==
/// Selectable compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    None,
    Gzip,
    Deflate,
}

impl CompressionKind {
    /// Parses a configured strategy name. Unknown names are a configuration
    /// error.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "gzip" => Ok(Self::Gzip),
            "deflate" => Ok(Self::Deflate),
            other => Err(CacheError::Configuration(format!(
                "unknown compression strategy '{other}'"
            ))),
        }
    }

    /// The compressor implementing this strategy, if any.
    pub fn compressor(self) -> Option<Arc<dyn Compressor>> {
        match self {
            Self::None => None,
            Self::Gzip => Some(Arc::new(GzipCompressor)),
            Self::Deflate => Some(Arc::new(DeflateCompressor)),
        }
    }
}

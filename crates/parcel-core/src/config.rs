//! Pipeline configuration

use crate::encoding::Coding;
use smallvec::{smallvec, SmallVec};

/// Compression level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Fast,
    #[default]
    Default,
    Best,
    /// Explicit zlib level, 0 (store) to 9 (best)
    Exact(u32),
}

impl CompressionLevel {
    pub(crate) fn flate2(&self) -> flate2::Compression {
        match self {
            CompressionLevel::Fast => flate2::Compression::fast(),
            CompressionLevel::Default => flate2::Compression::default(),
            CompressionLevel::Best => flate2::Compression::best(),
            CompressionLevel::Exact(level) => flate2::Compression::new((*level).min(9)),
        }
    }
}

/// Content pipeline configuration
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Encodings offered by `encode_content`, most preferred first.
    /// Identity is always implied.
    pub supported: SmallVec<[Coding; 4]>,
    /// Level used when an encoding carries no `level` parameter
    pub level: CompressionLevel,
    /// Length of the random part of generated multipart boundaries
    pub boundary_len: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            supported: smallvec![Coding::Gzip, Coding::Deflate],
            level: CompressionLevel::Default,
            boundary_len: parcel_form::multipart::DEFAULT_BOUNDARY_LEN,
        }
    }
}

impl ContentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supported(mut self, codings: impl IntoIterator<Item = Coding>) -> Self {
        self.supported = codings.into_iter().filter(|c| *c != Coding::Identity).collect();
        self
    }

    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    pub fn boundary_len(mut self, len: usize) -> Self {
        self.boundary_len = len.max(1);
        self
    }
}

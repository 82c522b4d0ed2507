//! On-disk cache for motion vector sequences.
//!
//! Binary layout (little endian):
//! - Bytes 0-3: Magic `PCMV`
//! - Bytes 4-5: Format version
//! - Bytes 6-9: Number of vectors `n`
//! - Then `n` records of 16 bytes: `dx: f64`, `dy: f64`
//!
//! The cache carries no information about the frames it was computed from;
//! deciding when a cache is stale is up to the caller.

use std::fs;
use std::path::Path;

use super::transformations::{MotionVector, MotionVectorSequence};
use crate::{Error, Result};

/// File magic.
pub const CACHE_MAGIC: [u8; 4] = *b"PCMV";

/// Current cache format version.
pub const CACHE_VERSION: u16 = 1;

/// Header size in bytes.
pub const CACHE_HEADER_SIZE: usize = 10;

const RECORD_SIZE: usize = 16;

/// Serialize a motion vector sequence.
pub fn encode_motion_vectors(vectors: &[MotionVector]) -> Result<Vec<u8>> {
    let count = u32::try_from(vectors.len()).map_err(|_| {
        Error::CacheError(format!("too many motion vectors to cache: {}", vectors.len()))
    })?;

    let mut buf = Vec::with_capacity(CACHE_HEADER_SIZE + vectors.len() * RECORD_SIZE);
    buf.extend_from_slice(&CACHE_MAGIC);
    buf.extend_from_slice(&CACHE_VERSION.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());

    for v in vectors {
        buf.extend_from_slice(&v.dx.to_le_bytes());
        buf.extend_from_slice(&v.dy.to_le_bytes());
    }

    Ok(buf)
}

/// Parse a motion vector sequence produced by [`encode_motion_vectors`].
pub fn decode_motion_vectors(buf: &[u8]) -> Result<MotionVectorSequence> {
    if buf.len() < CACHE_HEADER_SIZE {
        return Err(Error::CacheError(format!(
            "cache too short: expected at least {} bytes, got {}",
            CACHE_HEADER_SIZE,
            buf.len()
        )));
    }

    if buf[0..4] != CACHE_MAGIC {
        return Err(Error::CacheError("not a motion vector cache (bad magic)".to_string()));
    }

    let version = u16::from_le_bytes([buf[4], buf[5]]);
    if version != CACHE_VERSION {
        return Err(Error::CacheError(format!(
            "unsupported cache version {} (expected {})",
            version, CACHE_VERSION
        )));
    }

    let count = u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]) as usize;
    let body = &buf[CACHE_HEADER_SIZE..];
    if body.len() != count * RECORD_SIZE {
        return Err(Error::CacheError(format!(
            "cache body holds {} bytes, header announces {} vectors ({} bytes)",
            body.len(),
            count,
            count * RECORD_SIZE
        )));
    }

    let vectors = body
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            let mut dx = [0u8; 8];
            let mut dy = [0u8; 8];
            dx.copy_from_slice(&record[0..8]);
            dy.copy_from_slice(&record[8..16]);
            MotionVector::new(f64::from_le_bytes(dx), f64::from_le_bytes(dy))
        })
        .collect();

    Ok(vectors)
}

/// Write `vectors` to `path`, replacing any existing file.
pub fn save_motion_vectors<P: AsRef<Path>>(path: P, vectors: &[MotionVector]) -> Result<()> {
    let buf = encode_motion_vectors(vectors)?;
    fs::write(path, buf)?;
    Ok(())
}

/// Read a motion vector sequence from `path`.
pub fn load_motion_vectors<P: AsRef<Path>>(path: P) -> Result<MotionVectorSequence> {
    let buf = fs::read(path)?;
    decode_motion_vectors(&buf)
}

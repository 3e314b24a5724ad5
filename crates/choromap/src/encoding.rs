//! Decoder for the compact ring encoding used by ECharts-style map files.
//!
//! Each ring is a string of UTF-16 code units, two per point. A unit minus 64
//! is a zig-zag encoded delta from the previous point; the first point is a
//! delta from the ring's `encodeOffsets` pair. Values are quantized by
//! `scale` (1024 unless the file says otherwise).

use glam::DVec2;
use thiserror::Error;

pub const DEFAULT_SCALE: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("has an odd number of code units ({0})")]
    OddLength(usize),
}

fn zigzag(v: i64) -> i64 {
    (v >> 1) ^ -(v & 1)
}

/// Decode one ring.
pub fn decode_ring(encoded: &str, offset: [i64; 2], scale: f64) -> Result<Vec<DVec2>, EncodingError> {
    let units: Vec<u16> = encoded.encode_utf16().collect();
    if units.len() % 2 != 0 {
        return Err(EncodingError::OddLength(units.len()));
    }

    let (mut prev_x, mut prev_y) = (offset[0], offset[1]);
    let ring = units
        .chunks_exact(2)
        .map(|pair| {
            let x = zigzag(pair[0] as i64 - 64) + prev_x;
            let y = zigzag(pair[1] as i64 - 64) + prev_y;
            prev_x = x;
            prev_y = y;
            DVec2::new(x as f64 / scale, y as f64 / scale)
        })
        .collect();
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_decodes_signs() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(1), -1);
        assert_eq!(zigzag(2), 1);
        assert_eq!(zigzag(3), -2);
    }

    #[test]
    fn decodes_deltas_from_offset() {
        let ring = decode_ring("@@BA", [1024, 2048], DEFAULT_SCALE).unwrap();
        assert_eq!(ring, vec![DVec2::new(1.0, 2.0), DVec2::new(1025.0 / 1024.0, 2047.0 / 1024.0)]);
    }

    #[test]
    fn odd_length_is_rejected() {
        assert_eq!(decode_ring("@@B", [0, 0], DEFAULT_SCALE), Err(EncodingError::OddLength(3)));
    }
}

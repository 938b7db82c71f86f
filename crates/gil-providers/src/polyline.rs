//! Decoder for Google's encoded-polyline format.
//!
//! The encoding packs signed lat/lng deltas as zig-zagged integers split
//! into 5-bit groups, each offset by 63, with bit 0x20 marking continuation.
//! Values are fixed-point with five decimal places.

use gil_types::Coordinate;

/// Decode an encoded polyline into map points (`x` = lng, `y` = lat).
///
/// Truncated or corrupt input yields the points decoded so far rather than
/// an error; route rendering treats a short path the same as a missing one.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while index < bytes.len() {
        let Some((dlat, next)) = decode_value(bytes, index) else {
            break;
        };
        lat += dlat;
        let Some((dlng, next)) = decode_value(bytes, next) else {
            break;
        };
        lng += dlng;
        index = next;
        points.push(Coordinate {
            x: lng as f64 / 1e5,
            y: lat as f64 / 1e5,
        });
    }
    points
}

fn decode_value(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut result: i64 = 0;
    let mut shift = 0u32;
    loop {
        let b = i64::from(*bytes.get(index)?) - 63;
        if b < 0 {
            return None;
        }
        index += 1;
        result |= (b & 0x1f) << shift;
        shift += 5;
        if b < 0x20 {
            break;
        }
    }
    let delta = if result & 1 != 0 { !(result >> 1) } else { result >> 1 };
    Some((delta, index))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Raw frame file format.
//!
//! Every per-frame binary artifact (depth maps, confidence maps, cubemap
//! faces) shares one layout:
//!
//! ```text
//! [0-3]  width  (i32, little-endian)
//! [4-7]  height (i32, little-endian)
//! [8-]   raw plane bytes, no compression
//! ```

use crate::models::frame::PixelBuffer;

/// Size of the dimension header in bytes.
pub const RAW_HEADER_SIZE: usize = 8;

/// Encode the 8-byte dimension header.
pub fn encode_header(width: u32, height: u32) -> [u8; RAW_HEADER_SIZE] {
    let mut header = [0u8; RAW_HEADER_SIZE];
    header[0..4].copy_from_slice(&(width as i32).to_le_bytes());
    header[4..8].copy_from_slice(&(height as i32).to_le_bytes());
    header
}

/// Decode the dimension header from the front of a raw frame file.
///
/// Returns `None` if the slice is too short or a dimension is negative.
pub fn decode_header(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < RAW_HEADER_SIZE {
        return None;
    }
    let width = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let height = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if width < 0 || height < 0 {
        return None;
    }
    Some((width as u32, height as u32))
}

/// Encode a full frame file: header followed by the raw plane.
pub fn encode_frame(buffer: &PixelBuffer) -> Vec<u8> {
    encode_plane(buffer.width, buffer.height, &buffer.data)
}

/// Encode a frame file from an unowned plane.
pub fn encode_plane(width: u32, height: u32, data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(RAW_HEADER_SIZE + data.len());
    bytes.extend_from_slice(&encode_header(width, height));
    bytes.extend_from_slice(data);
    bytes
}

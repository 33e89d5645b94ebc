use crate::color::quantize::IndexedRaster;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{AnimError, AnimResult};

/// Longest run one `(run, index)` pair can carry.
pub const MAX_RUN: usize = u8::MAX as usize;

/// Encode indices as `(run, index)` byte pairs over the flat pixel stream.
///
/// Rows are not delimited, so a run may continue across a row boundary.
pub fn encode(indices: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(indices, &mut out);
    out
}

/// Append the encoding of `indices` to `out`.
pub fn encode_into(indices: &[u8], out: &mut Vec<u8>) {
    let mut iter = indices.iter().copied();
    let Some(mut current) = iter.next() else {
        return;
    };
    let mut run = 1usize;
    for v in iter {
        if v == current && run < MAX_RUN {
            run += 1;
            continue;
        }
        out.push(run as u8);
        out.push(current);
        current = v;
        run = 1;
    }
    out.push(run as u8);
    out.push(current);
}

/// Expand `bytes` into exactly `pixel_count` indices.
pub fn decode_indices(bytes: &[u8], pixel_count: usize) -> AnimResult<Vec<u8>> {
    if !bytes.len().is_multiple_of(2) {
        return Err(AnimError::malformed_rle(format!(
            "stream length {} is not a whole number of pairs",
            bytes.len()
        )));
    }

    let mut out = Vec::with_capacity(pixel_count);
    for (pair, chunk) in bytes.chunks_exact(2).enumerate() {
        let (run, index) = (usize::from(chunk[0]), chunk[1]);
        if run == 0 {
            return Err(AnimError::malformed_rle(format!(
                "pair {pair} has a zero run length"
            )));
        }
        if out.len() + run > pixel_count {
            return Err(AnimError::malformed_rle(format!(
                "pair {pair} expands past {pixel_count} pixels"
            )));
        }
        out.resize(out.len() + run, index);
    }

    if out.len() != pixel_count {
        return Err(AnimError::malformed_rle(format!(
            "stream expands to {} pixels, expected {pixel_count}",
            out.len()
        )));
    }
    Ok(out)
}

/// Decode one frame block into an [`IndexedRaster`] of `dims`.
pub fn decode(bytes: &[u8], dims: Dimensions) -> AnimResult<IndexedRaster> {
    let indices = decode_indices(bytes, dims.pixel_count())?;
    IndexedRaster::new(dims, indices)
}

#[cfg(test)]
#[path = "../../tests/unit/anim/rle.rs"]
mod tests;

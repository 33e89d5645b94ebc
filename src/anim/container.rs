use crate::anim::rle;
use crate::color::palette::{PALETTE_SIZE, Palette};
use crate::color::quantize::IndexedRaster;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{AnimError, AnimResult};

/// File magic.
pub const MAGIC: &[u8; 4] = b"ANIM";
/// Format version understood by the firmware decoder.
pub const VERSION: u8 = 1;
/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 14;

/// Decoded fixed-size header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimHeader {
    pub version: u8,
    pub frame_count: u16,
    pub width: u16,
    pub height: u16,
    /// Palette entries in `1..=256`; stored as 0 on the wire when 256.
    pub palette_size: usize,
}

impl AnimHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(MAGIC);
        out[4] = self.version;
        out[5..7].copy_from_slice(&self.frame_count.to_le_bytes());
        out[7..9].copy_from_slice(&self.width.to_le_bytes());
        out[9..11].copy_from_slice(&self.height.to_le_bytes());
        out[11] = if self.palette_size >= PALETTE_SIZE {
            0
        } else {
            self.palette_size as u8
        };
        // 12..14 reserved
        out
    }

    pub fn parse(bytes: &[u8]) -> AnimResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(AnimError::validation(format!(
                "anim header needs {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(AnimError::validation("anim magic mismatch"));
        }
        let version = bytes[4];
        if version != VERSION {
            return Err(AnimError::validation(format!(
                "unsupported anim version {version}"
            )));
        }
        let palette_size = match bytes[11] {
            0 => PALETTE_SIZE,
            n => usize::from(n),
        };
        Ok(Self {
            version,
            frame_count: u16::from_le_bytes([bytes[5], bytes[6]]),
            width: u16::from_le_bytes([bytes[7], bytes[8]]),
            height: u16::from_le_bytes([bytes[9], bytes[10]]),
            palette_size,
        })
    }

    pub fn dimensions(&self) -> AnimResult<Dimensions> {
        Dimensions::new(u32::from(self.width), u32::from(self.height))
    }
}

/// Accumulates RLE frame blocks and serialises the container.
#[derive(Debug)]
pub struct AnimWriter {
    dims: Dimensions,
    palette: [u16; PALETTE_SIZE],
    blocks: Vec<Vec<u8>>,
}

impl AnimWriter {
    pub fn new(dims: Dimensions, palette: &Palette) -> AnimResult<Self> {
        if dims.width > u32::from(u16::MAX) || dims.height > u32::from(u16::MAX) {
            return Err(AnimError::validation(format!(
                "anim dimensions {dims} exceed the u16 header fields"
            )));
        }
        Ok(Self {
            dims,
            palette: *palette.rgb565(),
            blocks: Vec::new(),
        })
    }

    /// RLE-encode and append one frame.
    pub fn push_frame(&mut self, frame: &IndexedRaster) -> AnimResult<()> {
        if frame.dimensions() != self.dims {
            return Err(AnimError::validation(format!(
                "frame {} does not match anim {}",
                frame.dimensions(),
                self.dims
            )));
        }
        self.push_block(rle::encode(frame.indices()))
    }

    /// Append an already RLE-encoded frame block.
    pub fn push_block(&mut self, block: Vec<u8>) -> AnimResult<()> {
        if self.blocks.len() >= usize::from(u16::MAX) {
            return Err(AnimError::validation(format!(
                "anim frame count exceeds {}",
                u16::MAX
            )));
        }
        if u32::try_from(block.len()).is_err() {
            return Err(AnimError::validation("anim frame block exceeds u32 length"));
        }
        self.blocks.push(block);
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.blocks.len()
    }

    /// Serialise header, palette and blocks in push order.
    pub fn finish(self) -> AnimResult<Vec<u8>> {
        let header = AnimHeader {
            version: VERSION,
            frame_count: u16::try_from(self.blocks.len())
                .map_err(|_| AnimError::validation("anim frame count exceeds u16"))?,
            width: self.dims.width as u16,
            height: self.dims.height as u16,
            palette_size: PALETTE_SIZE,
        };

        let body: usize = self.blocks.iter().map(|b| 4 + b.len()).sum();
        let mut out = Vec::with_capacity(HEADER_LEN + PALETTE_SIZE * 2 + body);
        out.extend_from_slice(&header.to_bytes());
        for c in self.palette {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for block in &self.blocks {
            out.extend_from_slice(&(block.len() as u32).to_le_bytes());
            out.extend_from_slice(block);
        }
        Ok(out)
    }
}

/// Borrowed view over a serialised ANIM buffer.
#[derive(Debug)]
pub struct AnimFile<'a> {
    header: AnimHeader,
    palette: Vec<u16>,
    blocks: Vec<&'a [u8]>,
}

impl<'a> AnimFile<'a> {
    /// Parse and bounds-check the container without decoding any frame.
    pub fn parse(bytes: &'a [u8]) -> AnimResult<Self> {
        let header = AnimHeader::parse(bytes)?;

        let pal_end = HEADER_LEN + header.palette_size * 2;
        let pal_bytes = bytes
            .get(HEADER_LEN..pal_end)
            .ok_or_else(|| AnimError::validation("anim palette truncated"))?;
        let palette = pal_bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        let mut blocks = Vec::with_capacity(usize::from(header.frame_count));
        let mut pos = pal_end;
        for i in 0..header.frame_count {
            let len_end = pos + 4;
            let len_bytes = bytes
                .get(pos..len_end)
                .ok_or_else(|| AnimError::validation(format!("frame {i} length truncated")))?;
            let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
            let end = usize::try_from(len)
                .ok()
                .and_then(|len| len_end.checked_add(len))
                .ok_or_else(|| AnimError::validation(format!("frame {i} block truncated")))?;
            let block = bytes
                .get(len_end..end)
                .ok_or_else(|| AnimError::validation(format!("frame {i} block truncated")))?;
            blocks.push(block);
            pos = end;
        }
        if pos != bytes.len() {
            return Err(AnimError::validation(format!(
                "{} trailing bytes after last frame",
                bytes.len() - pos
            )));
        }

        Ok(Self {
            header,
            palette,
            blocks,
        })
    }

    pub fn header(&self) -> &AnimHeader {
        &self.header
    }

    pub fn palette_rgb565(&self) -> &[u16] {
        &self.palette
    }

    pub fn frame_count(&self) -> usize {
        self.blocks.len()
    }

    /// Raw RLE bytes of frame `index`.
    pub fn block(&self, index: usize) -> Option<&'a [u8]> {
        self.blocks.get(index).copied()
    }

    /// Decode frame `index`, checking it expands to exactly `width * height`.
    pub fn decode_frame(&self, index: usize) -> AnimResult<IndexedRaster> {
        let block = self.block(index).ok_or_else(|| {
            AnimError::validation(format!(
                "frame {index} out of range ({} frames)",
                self.blocks.len()
            ))
        })?;
        rle::decode(block, self.header.dimensions()?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/anim/container.rs"]
mod tests;

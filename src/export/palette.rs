use std::collections::HashMap;

use crate::foundation::core::Rgba;
use crate::foundation::error::{MergeError, MergeResult};
use crate::frame::buffer::Frame;

/// Entries in a GIF color table.
pub const PALETTE_LIMIT: usize = 256;

/// Palette key for fully transparent pixels; no 24-bit color maps here.
pub const TRANSPARENT_KEY: u32 = 1 << 24;

/// Insertion-ordered color table shared by every frame of one export.
#[derive(Clone, Debug, Default)]
pub struct PaletteBuilder {
    colors: Vec<u32>,
    index: HashMap<u32, u8>,
}

/// Finished color table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Exactly `PALETTE_LIMIT` RGB triples.
    pub rgb: Vec<u8>,
    /// Number of slots in use.
    pub used: usize,
    /// Slot reserved for fully transparent pixels, if any were seen.
    pub transparent_index: Option<u8>,
}

impl PaletteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alpha is ignored except that zero alpha maps to [`TRANSPARENT_KEY`].
    pub fn key(px: Rgba) -> u32 {
        if px[3] == 0 {
            TRANSPARENT_KEY
        } else {
            (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2])
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn index_of(&mut self, px: Rgba) -> MergeResult<u8> {
        self.index_of_key(Self::key(px))
    }

    fn index_of_key(&mut self, key: u32) -> MergeResult<u8> {
        if let Some(&i) = self.index.get(&key) {
            return Ok(i);
        }
        if self.colors.len() >= PALETTE_LIMIT {
            return Err(MergeError::PaletteOverflow {
                limit: PALETTE_LIMIT,
            });
        }
        let i = self.colors.len() as u8;
        self.colors.push(key);
        self.index.insert(key, i);
        Ok(i)
    }

    /// Map every pixel of `frame` to a palette slot.
    pub fn index_frame(&mut self, frame: &Frame) -> MergeResult<Vec<u8>> {
        let mut out = Vec::with_capacity(frame.data().len() / 4);
        let mut last: Option<(u32, u8)> = None;
        for px in frame.data().chunks_exact(4) {
            let key = Self::key([px[0], px[1], px[2], px[3]]);
            let i = match last {
                Some((k, i)) if k == key => i,
                _ => {
                    let i = self.index_of_key(key)?;
                    last = Some((key, i));
                    i
                }
            };
            out.push(i);
        }
        Ok(out)
    }

    pub fn transparent_index(&self) -> Option<u8> {
        self.index.get(&TRANSPARENT_KEY).copied()
    }

    /// Pad to `PALETTE_LIMIT` entries; the transparent slot gets color zero.
    pub fn finish(&self) -> Palette {
        let mut rgb = vec![0u8; PALETTE_LIMIT * 3];
        for (slot, &key) in self.colors.iter().enumerate() {
            if key == TRANSPARENT_KEY {
                continue;
            }
            rgb[slot * 3] = (key >> 16) as u8;
            rgb[slot * 3 + 1] = (key >> 8) as u8;
            rgb[slot * 3 + 2] = key as u8;
        }
        Palette {
            rgb,
            used: self.colors.len(),
            transparent_index: self.transparent_index(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/palette.rs"]
mod tests;

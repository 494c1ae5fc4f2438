use std::borrow::Cow;

use crate::foundation::core::Rgba;
use crate::foundation::error::{MergeError, MergeResult};
use crate::source::decode::{DisposalCode, FrameSource, SourceFrameInfo};

/// Source backed by frames that were decoded elsewhere.
#[derive(Clone, Debug)]
pub struct MemorySource {
    width: u32,
    height: u32,
    frames: Vec<(SourceFrameInfo, Vec<u8>)>,
}

impl MemorySource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
        }
    }

    /// One solid-colored frame per `(color, delay)` pair, all with `disposal`.
    pub fn solid(width: u32, height: u32, frames: &[(Rgba, u32)], disposal: DisposalCode) -> Self {
        let n = (width as usize) * (height as usize);
        let mut src = Self::new(width, height);
        for &(color, delay) in frames {
            let info = SourceFrameInfo {
                delay,
                disposal,
                transparent_index: None,
            };
            src.frames.push((info, color.repeat(n)));
        }
        src
    }

    pub fn push_frame(&mut self, info: SourceFrameInfo, rgba: Vec<u8>) -> MergeResult<()> {
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if rgba.len() != expected {
            return Err(MergeError::validation(format!(
                "frame holds {} bytes, {}x{} needs {expected}",
                rgba.len(),
                self.width,
                self.height
            )));
        }
        if info.delay == 0 {
            return Err(MergeError::validation("frame delay must be non-zero"));
        }
        self.frames.push((info, rgba));
        Ok(())
    }

    pub fn with_frame(mut self, info: SourceFrameInfo, rgba: Vec<u8>) -> MergeResult<Self> {
        self.push_frame(info, rgba)?;
        Ok(self)
    }
}

impl FrameSource for MemorySource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_info(&self, index: usize) -> Option<SourceFrameInfo> {
        self.frames.get(index).map(|(info, _)| *info)
    }

    fn decode_frame_rgba(&self, index: usize) -> MergeResult<Cow<'_, [u8]>> {
        self.frames
            .get(index)
            .map(|(_, rgba)| Cow::Borrowed(rgba.as_slice()))
            .ok_or_else(|| MergeError::validation(format!("frame index {index} out of range")))
    }
}

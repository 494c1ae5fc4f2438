use std::borrow::Cow;

use crate::export::palette::Palette;
use crate::foundation::core::Canvas;
use crate::foundation::error::{MergeError, MergeResult};
use crate::source::decode::DisposalCode;

/// One indexed frame ready for the GIF writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFrame {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub indexed_pixels: Vec<u8>,
    /// 10 ms units.
    pub delay: u32,
    pub transparent_index: Option<u8>,
    pub disposal: DisposalCode,
}

/// Loop count written to the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    #[default]
    Infinite,
    /// Play through once; no looping extension is written.
    Once,
    /// Loop count stored in the looping extension.
    Finite(u16),
}

impl Repeat {
    fn to_gif(self) -> Option<gif::Repeat> {
        match self {
            Repeat::Infinite => Some(gif::Repeat::Infinite),
            Repeat::Once => None,
            Repeat::Finite(n) => Some(gif::Repeat::Finite(n)),
        }
    }
}

/// Streaming GIF writer with a single global color table.
pub struct GifWriter {
    canvas: Canvas,
    encoder: gif::Encoder<Vec<u8>>,
    frames_written: usize,
}

impl GifWriter {
    pub fn new(canvas: Canvas, palette: &Palette, repeat: Repeat) -> MergeResult<Self> {
        canvas.validate()?;
        let (w, h) = gif_dims(canvas)?;
        let mut encoder = gif::Encoder::new(Vec::new(), w, h, &palette.rgb)?;
        if let Some(repeat) = repeat.to_gif() {
            encoder.set_repeat(repeat)?;
        }
        Ok(Self {
            canvas,
            encoder,
            frames_written: 0,
        })
    }

    /// Write `frame`; delays beyond the 16-bit field are split over repeats.
    pub fn add_frame(&mut self, frame: &OutputFrame) -> MergeResult<()> {
        let expected = usize::from(frame.width) * usize::from(frame.height);
        if frame.indexed_pixels.len() != expected {
            return Err(MergeError::encode(format!(
                "frame has {} indices, {}x{} needs {expected}",
                frame.indexed_pixels.len(),
                frame.width,
                frame.height
            )));
        }
        if u32::from(frame.x) + u32::from(frame.width) > self.canvas.width
            || u32::from(frame.y) + u32::from(frame.height) > self.canvas.height
        {
            return Err(MergeError::encode("frame extends past the canvas"));
        }

        let mut remaining = frame.delay;
        loop {
            let delay = remaining.min(u32::from(u16::MAX));
            remaining -= delay;
            let out = gif::Frame {
                left: frame.x,
                top: frame.y,
                width: frame.width,
                height: frame.height,
                delay: delay as u16,
                dispose: disposal_method(frame.disposal),
                transparent: frame.transparent_index,
                buffer: Cow::Borrowed(&frame.indexed_pixels),
                ..Default::default()
            };
            self.encoder.write_frame(&out)?;
            self.frames_written += 1;
            if remaining == 0 {
                return Ok(());
            }
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Write the trailer and return the GIF bytes.
    pub fn finish(self) -> MergeResult<Vec<u8>> {
        self.encoder
            .into_inner()
            .map_err(|e| MergeError::encode(format!("finish gif stream: {e}")))
    }
}

fn gif_dims(canvas: Canvas) -> MergeResult<(u16, u16)> {
    let w = u16::try_from(canvas.width)
        .map_err(|_| MergeError::validation("canvas width exceeds the GIF limit"))?;
    let h = u16::try_from(canvas.height)
        .map_err(|_| MergeError::validation("canvas height exceeds the GIF limit"))?;
    Ok((w, h))
}

fn disposal_method(code: DisposalCode) -> gif::DisposalMethod {
    match code {
        DisposalCode::KEEP => gif::DisposalMethod::Keep,
        DisposalCode::RESTORE_BACKGROUND => gif::DisposalMethod::Background,
        DisposalCode::RESTORE_PREVIOUS => gif::DisposalMethod::Previous,
        _ => gif::DisposalMethod::Any,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;

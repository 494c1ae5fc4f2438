use std::borrow::Cow;

use crate::foundation::error::{MergeError, MergeResult};

/// Delay used for source frames that declare a delay of zero.
pub const ZERO_DELAY_FALLBACK: u32 = 10;

/// GIF disposal code as stored in the graphic control extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DisposalCode(pub u8);

impl DisposalCode {
    pub const UNSPECIFIED: Self = Self(0);
    pub const KEEP: Self = Self(1);
    pub const RESTORE_BACKGROUND: Self = Self(2);
    pub const RESTORE_PREVIOUS: Self = Self(3);
}

impl From<gif::DisposalMethod> for DisposalCode {
    fn from(m: gif::DisposalMethod) -> Self {
        match m {
            gif::DisposalMethod::Any => Self::UNSPECIFIED,
            gif::DisposalMethod::Keep => Self::KEEP,
            gif::DisposalMethod::Background => Self::RESTORE_BACKGROUND,
            gif::DisposalMethod::Previous => Self::RESTORE_PREVIOUS,
        }
    }
}

/// Per-frame metadata of a source animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceFrameInfo {
    /// Display time in 10 ms units, never zero.
    pub delay: u32,
    pub disposal: DisposalCode,
    pub transparent_index: Option<u8>,
}

/// Decoder bound to one source binary.
///
/// Every decoded frame has the source's full `width × height`.
pub trait FrameSource: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn frame_count(&self) -> usize;

    fn frame_info(&self, index: usize) -> Option<SourceFrameInfo>;

    fn decode_frame_rgba(&self, index: usize) -> MergeResult<Cow<'_, [u8]>>;

    /// Sum of all frame delays.
    fn total_delay(&self) -> u32 {
        (0..self.frame_count())
            .filter_map(|i| self.frame_info(i))
            .map(|info| info.delay)
            .sum()
    }
}

/// A fully decoded animated GIF.
#[derive(Clone, Debug)]
pub struct GifSource {
    width: u32,
    height: u32,
    frames: Vec<DecodedFrame>,
}

#[derive(Clone, Debug)]
struct DecodedFrame {
    info: SourceFrameInfo,
    rgba: Vec<u8>,
}

impl GifSource {
    /// Decode every frame of `bytes` onto screen-sized RGBA buffers.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> MergeResult<Self> {
        if bytes.is_empty() {
            return Err(MergeError::decode("empty gif binary"));
        }

        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = opts.read_info(bytes)?;

        let width = u32::from(decoder.width());
        let height = u32::from(decoder.height());
        let mut frames = Vec::new();

        while let Some(frame) = decoder.read_next_frame()? {
            if frame.interlaced {
                return Err(MergeError::unsupported(format!(
                    "interlaced frame {} is not supported",
                    frames.len()
                )));
            }

            let delay = match u32::from(frame.delay) {
                0 => {
                    tracing::warn!(frame = frames.len(), "zero frame delay, using fallback");
                    ZERO_DELAY_FALLBACK
                }
                d => d,
            };

            let rgba = blit_onto_screen(
                &frame.buffer,
                Placement {
                    left: u32::from(frame.left),
                    top: u32::from(frame.top),
                    width: u32::from(frame.width),
                    height: u32::from(frame.height),
                },
                width,
                height,
            );

            frames.push(DecodedFrame {
                info: SourceFrameInfo {
                    delay,
                    disposal: frame.dispose.into(),
                    transparent_index: frame.transparent,
                },
                rgba,
            });
        }

        if frames.is_empty() {
            return Err(MergeError::decode("gif contains no frames"));
        }

        tracing::debug!(width, height, frames = frames.len(), "decoded gif");
        Ok(Self {
            width,
            height,
            frames,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

fn blit_onto_screen(buf: &[u8], at: Placement, width: u32, height: u32) -> Vec<u8> {
    let mut screen = vec![0u8; (width as usize) * (height as usize) * 4];
    for fy in 0..at.height {
        let cy = at.top + fy;
        if cy >= height {
            break;
        }
        for fx in 0..at.width {
            let cx = at.left + fx;
            if cx >= width {
                break;
            }
            let src = ((fy * at.width + fx) as usize) * 4;
            let Some(px) = buf.get(src..src + 4) else {
                continue;
            };
            if px[3] == 0 {
                continue;
            }
            let dst = ((cy * width + cx) as usize) * 4;
            screen[dst..dst + 4].copy_from_slice(px);
        }
    }
    screen
}

impl FrameSource for GifSource {
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
        self.frames.get(index).map(|f| f.info)
    }

    fn decode_frame_rgba(&self, index: usize) -> MergeResult<Cow<'_, [u8]>> {
        self.frames
            .get(index)
            .map(|f| Cow::Borrowed(f.rgba.as_slice()))
            .ok_or_else(|| MergeError::validation(format!("frame index {index} out of range")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/decode.rs"]
mod tests;

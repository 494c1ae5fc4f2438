use crate::foundation::core::{Affine, MAX_FRAME_PIXELS, MAX_GIF_DIMENSION, Point, Rgba};
use crate::foundation::error::{MergeError, MergeResult};
use crate::foundation::math::round_half_up;
use crate::frame::resample::{resize_bilinear, sample_bilinear};
use crate::transform::affine::{
    compose, identity, rotate_about, scale_about, smooth_affine, transformed_bounds,
};

/// A baked RGBA8 pixel buffer (row-major, straight alpha).
///
/// Pixels change only through construction, [`PendingFrame::apply`] and
/// [`Frame::merge`], each of which yields a new frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// A frame with an accumulated transform that has not been resampled yet.
///
/// Dimensions are unknown until [`PendingFrame::apply`] bakes the transform.
#[derive(Clone, Debug)]
pub struct PendingFrame {
    source: Frame,
    matrix: Affine,
}

/// Integer-snapped destination offset for [`Frame::merge`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MergeAt {
    pub x: f64,
    pub y: f64,
}

impl MergeAt {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Transparency predicate that treats only fully transparent pixels as holes.
pub fn alpha_is_zero(px: Rgba) -> bool {
    px[3] == 0
}

impl Frame {
    /// Wrap a decoded image.
    pub fn from_image_data(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    /// Wrap a raw RGBA buffer; `height` defaults to `len / 4 / width`.
    pub fn from_frame_rgba(
        data: impl Into<Vec<u8>>,
        width: u32,
        height: Option<u32>,
    ) -> MergeResult<Self> {
        let mut data = data.into();
        let height = match height {
            Some(h) => h,
            None if width == 0 => 0,
            None => u32::try_from(data.len() / 4 / width as usize)
                .map_err(|_| MergeError::validation("frame height overflows u32"))?,
        };
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| MergeError::validation("frame buffer size overflow"))?;
        if data.len() < expected {
            return Err(MergeError::validation(format!(
                "rgba buffer holds {} bytes, {width}x{height} needs {expected}",
                data.len()
            )));
        }
        data.truncate(expected);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid `width × height` frame.
    pub fn from_rectangle(width: u32, height: u32, fill: Rgba) -> Self {
        let n = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(n * 4);
        for _ in 0..n {
            data.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)`; callers keep coordinates in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn to_rgba_image(&self) -> MergeResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| MergeError::validation("frame buffer does not match its dimensions"))
    }

    /// Start a transform pipeline with an explicit matrix.
    pub fn transform(self, m: Affine) -> PendingFrame {
        PendingFrame {
            source: self,
            matrix: identity(),
        }
        .then(m)
    }

    pub fn scale(self, sx: f64, sy: f64) -> PendingFrame {
        self.transform(identity()).scale(sx, sy)
    }

    pub fn rotate(self, radians: f64) -> PendingFrame {
        self.transform(identity()).rotate(radians)
    }

    pub fn rotate_deg(self, degrees: f64) -> PendingFrame {
        self.transform(identity()).rotate_deg(degrees)
    }

    pub fn flip_x(self) -> PendingFrame {
        self.transform(identity()).flip_x()
    }

    pub fn flip_y(self) -> PendingFrame {
        self.transform(identity()).flip_y()
    }

    /// Center-aligned bilinear resize to exactly `width × height`.
    pub fn resize(&self, width: u32, height: u32) -> Self {
        resize_bilinear(self, width, height)
    }

    /// Copy `other` onto a clone of `self` at `at`, overwriting every pixel.
    pub fn merge(&self, other: &Frame, at: MergeAt) -> Self {
        self.merge_with(other, at, |_| false)
    }

    /// Copy `other` onto a clone of `self` at `at`.
    ///
    /// Source pixels for which `is_transparent` holds leave the destination
    /// untouched; all others replace it outright. The copy is clipped to the
    /// overlap of both frames.
    pub fn merge_with(
        &self,
        other: &Frame,
        at: MergeAt,
        is_transparent: impl Fn(Rgba) -> bool,
    ) -> Self {
        let mut out = self.clone();
        let ox = round_half_up(at.x) as i64;
        let oy = round_half_up(at.y) as i64;

        let x_start = ox.max(0);
        let y_start = oy.max(0);
        let x_end = ox
            .saturating_add(i64::from(other.width))
            .min(i64::from(self.width));
        let y_end = oy
            .saturating_add(i64::from(other.height))
            .min(i64::from(self.height));
        if x_start >= x_end || y_start >= y_end {
            return out;
        }

        let stride = self.width as usize;
        for dy in y_start..y_end {
            let sy = (dy - oy) as u32;
            for dx in x_start..x_end {
                let px = other.pixel((dx - ox) as u32, sy);
                if is_transparent(px) {
                    continue;
                }
                let i = ((dy as usize) * stride + (dx as usize)) * 4;
                out.data[i..i + 4].copy_from_slice(&px);
            }
        }
        out
    }
}

impl PendingFrame {
    fn center(&self) -> Point {
        Point::new(
            f64::from(self.source.width) / 2.0,
            f64::from(self.source.height) / 2.0,
        )
    }

    fn then(mut self, m: Affine) -> Self {
        self.matrix = compose(self.matrix, m);
        self
    }

    /// The accumulated transform, applied to points in call order.
    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    pub fn scale(self, sx: f64, sy: f64) -> Self {
        let m = scale_about(sx, sy, self.center());
        self.then(m)
    }

    pub fn rotate(self, radians: f64) -> Self {
        let m = rotate_about(radians, self.center());
        self.then(m)
    }

    pub fn rotate_deg(self, degrees: f64) -> Self {
        self.rotate(degrees.to_radians())
    }

    /// Mirror left to right.
    pub fn flip_x(self) -> Self {
        self.scale(-1.0, 1.0)
    }

    /// Mirror top to bottom.
    pub fn flip_y(self) -> Self {
        self.scale(1.0, -1.0)
    }

    /// Resample into a new frame sized to the transformed bounding box.
    ///
    /// Each destination pixel center is mapped back through the inverse
    /// matrix and sampled bilinearly from the source. A non-finite matrix, or
    /// bounds beyond [`MAX_GIF_DIMENSION`] per edge or [`MAX_FRAME_PIXELS`] in
    /// total, is a validation error.
    pub fn apply(self) -> MergeResult<Frame> {
        let m = smooth_affine(self.matrix);
        let src = self.source;
        if m == Affine::IDENTITY {
            return Ok(src);
        }
        if !m.as_coeffs().iter().all(|c| c.is_finite()) {
            return Err(MergeError::validation("transform has a non-finite coefficient"));
        }

        let bounds = transformed_bounds(m, f64::from(src.width), f64::from(src.height));
        let (new_w, new_h) = baked_size(bounds.width(), bounds.height())?;

        if src.is_empty() || m.determinant().abs() < f64::EPSILON {
            return Ok(Frame::from_rectangle(new_w, new_h, [0, 0, 0, 0]));
        }

        let inv = smooth_affine(m.inverse());
        let mut data = Vec::with_capacity((new_w as usize) * (new_h as usize) * 4);
        for row in 0..new_h {
            for col in 0..new_w {
                let center = Point::new(
                    bounds.x0 + f64::from(col) + 0.5,
                    bounds.y0 + f64::from(row) + 0.5,
                );
                let p = inv * center;
                data.extend_from_slice(&sample_bilinear(&src, p.x - 0.5, p.y - 0.5));
            }
        }

        Ok(Frame::from_parts(new_w, new_h, data))
    }
}

fn baked_size(width: f64, height: f64) -> MergeResult<(u32, u32)> {
    let limit = f64::from(MAX_GIF_DIMENSION);
    let (w, h) = (width.round(), height.round());
    if !(w <= limit && h <= limit) {
        return Err(MergeError::validation(format!(
            "transformed frame {width}x{height} exceeds the GIF limit of {MAX_GIF_DIMENSION}"
        )));
    }
    let (w, h) = (w.max(0.0) as u32, h.max(0.0) as u32);
    if u64::from(w) * u64::from(h) > MAX_FRAME_PIXELS {
        return Err(MergeError::validation(format!(
            "transformed frame {w}x{h} exceeds {MAX_FRAME_PIXELS} pixels"
        )));
    }
    Ok((w, h))
}

impl TryFrom<PendingFrame> for Frame {
    type Error = MergeError;

    fn try_from(p: PendingFrame) -> MergeResult<Self> {
        p.apply()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/buffer.rs"]
mod tests;

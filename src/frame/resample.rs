use crate::foundation::core::Rgba;
use crate::foundation::math::clamp_channel;
use crate::frame::buffer::Frame;

/// Bilinear sample at `(x, y)` with each axis clamped to `[0, dim - 1]`.
pub(crate) fn sample_bilinear(frame: &Frame, x: f64, y: f64) -> Rgba {
    blend(frame, x, y, clamp_channel)
}

/// Weighted mix of the four neighbours of `(x, y)`, one channel at a time.
fn blend(frame: &Frame, x: f64, y: f64, to_channel: impl Fn(f64) -> u8) -> Rgba {
    let (x0, x1, fx) = axis_neighbors(x, frame.width());
    let (y0, y1, fy) = axis_neighbors(y, frame.height());

    let p00 = frame.pixel(x0, y0);
    let p10 = frame.pixel(x1, y0);
    let p01 = frame.pixel(x0, y1);
    let p11 = frame.pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = to_channel(top * (1.0 - fy) + bottom * fy);
    }
    out
}

fn floor_channel(v: f64) -> u8 {
    v.floor().clamp(0.0, 255.0) as u8
}

fn axis_neighbors(v: f64, dim: u32) -> (u32, u32, f64) {
    let max = f64::from(dim.saturating_sub(1));
    let v = if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
    let i0 = v.floor() as u32;
    let i1 = (i0 + 1).min(dim.saturating_sub(1));
    (i0, i1, v - f64::from(i0))
}

/// Resize with pixel centers aligned; channels are floored.
pub(crate) fn resize_bilinear(frame: &Frame, width: u32, height: u32) -> Frame {
    if width == 0 || height == 0 || frame.is_empty() {
        return Frame::from_rectangle(width, height, [0, 0, 0, 0]);
    }

    let scale_w = f64::from(frame.width()) / f64::from(width);
    let scale_h = f64::from(frame.height()) / f64::from(height);
    let max_x = f64::from(frame.width() - 1);
    let max_y = f64::from(frame.height() - 1);

    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for row in 0..height {
        let y = ((f64::from(row) + 0.5) * scale_h - 0.5).min(max_y);
        for col in 0..width {
            let x = ((f64::from(col) + 0.5) * scale_w - 0.5).min(max_x);
            data.extend_from_slice(&blend(frame, x, y, floor_channel));
        }
    }

    Frame::from_parts(width, height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/frame/resample.rs"]
mod tests;

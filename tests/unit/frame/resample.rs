use super::*;

fn gray_row(values: &[u8]) -> Frame {
    let data: Vec<u8> = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
    Frame::from_frame_rgba(data, values.len() as u32, Some(1)).unwrap()
}

#[test]
fn sample_clamps_each_axis_independently() {
    let f = gray_row(&[0, 100]);
    assert_eq!(sample_bilinear(&f, -5.0, 3.0)[0], 0);
    assert_eq!(sample_bilinear(&f, 9.0, -1.0)[0], 100);
    assert_eq!(sample_bilinear(&f, 0.5, 0.0)[0], 50);
}

#[test]
fn sample_on_single_pixel_is_that_pixel() {
    let f = gray_row(&[42]);
    assert_eq!(sample_bilinear(&f, 0.7, 0.3), [42, 42, 42, 255]);
    assert_eq!(sample_bilinear(&f, f64::NAN, 0.0), [42, 42, 42, 255]);
}

#[test]
fn resize_downscale_floors_blended_channels() {
    let f = gray_row(&[0, 101, 0, 101]);
    let out = resize_bilinear(&f, 2, 1);
    assert_eq!((out.width(), out.height()), (2, 1));
    assert_eq!(out.pixel(0, 0)[0], 50);
    assert_eq!(out.pixel(1, 0)[0], 50);
}

#[test]
fn resize_to_zero_is_empty() {
    let f = gray_row(&[1, 2]);
    assert!(resize_bilinear(&f, 0, 4).is_empty());
}

#[test]
fn sample_rounds_where_resize_floors() {
    let f = gray_row(&[0, 101]);
    assert_eq!(sample_bilinear(&f, 0.5, 0.0)[0], 51);
    assert_eq!(blend(&f, 0.5, 0.0, floor_channel)[0], 50);
}

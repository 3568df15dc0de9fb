/// Tests for pack layout and pixel encoding

use super::*;

#[test]
fn test_default_alignment_pads_rows() {
    // 3 RGB8 pixels = 9 bytes, padded to 12
    let layout = PackLayout::new(3, 2, 3, 0, &PixelPackState::default()).unwrap();
    assert_eq!(layout.row_pitch, 12);
    assert_eq!(layout.required_size(), 12 + 9);
}

#[test]
fn test_alignment_one_is_tight() {
    let pack = PixelPackState::default().with_alignment(1);
    let layout = PackLayout::new(3, 2, 3, 0, &pack).unwrap();
    assert_eq!(layout.row_pitch, 9);
    assert_eq!(layout.required_size(), 18);
}

#[test]
fn test_row_length_and_skips() {
    let pack = PixelPackState { alignment: 4, row_length: 10, skip_rows: 2, skip_pixels: 3, reverse_row_order: false };
    let layout = PackLayout::new(2, 2, 4, 0, &pack).unwrap();
    assert_eq!(layout.row_pitch, 40);
    assert_eq!(layout.skip_bytes, 2 * 40 + 3 * 4);
    assert_eq!(layout.row_offset(1), 92 + 40);
    assert_eq!(layout.required_size(), 92 + 40 + 8);
}

#[test]
fn test_explicit_pitch_overrides() {
    let layout = PackLayout::new(2, 3, 4, 64, &PixelPackState::default()).unwrap();
    assert_eq!(layout.row_pitch, 64);
    assert_eq!(layout.required_size(), 2 * 64 + 8);
}

#[test]
fn test_invalid_alignment() {
    let pack = PixelPackState::default().with_alignment(3);
    assert!(matches!(PackLayout::new(1, 1, 4, 0, &pack), Err(Error::OutOfRange(_))));
}

#[test]
fn test_oversized_pack_state_rejected() {
    let skip = PixelPackState { skip_rows: usize::MAX / 2, ..PixelPackState::default() };
    assert!(matches!(PackLayout::new(2, 2, 4, 0, &skip), Err(Error::InvalidRectangle(_))));

    let row_length = PixelPackState { row_length: usize::MAX / 2, ..PixelPackState::default() };
    assert!(matches!(PackLayout::new(2, 2, 4, 0, &row_length), Err(Error::InvalidRectangle(_))));

    let pixels = PixelPackState { skip_pixels: usize::MAX, ..PixelPackState::default() };
    assert!(matches!(PackLayout::new(2, 2, 4, 0, &pixels), Err(Error::InvalidRectangle(_))));

    let pitch = usize::MAX / 2;
    assert!(matches!(PackLayout::new(2, 3, 4, pitch, &PixelPackState::default()), Err(Error::InvalidRectangle(_))));
    // A single row never steps by the pitch
    assert_eq!(PackLayout::new(2, 1, 4, pitch, &PixelPackState::default()).unwrap().required_size(), 8);
}

#[test]
fn test_empty_layout_requires_nothing() {
    let layout = PackLayout::new(0, 5, 4, 0, &PixelPackState::default()).unwrap();
    assert_eq!(layout.required_size(), 0);
}

#[test]
fn test_encode_bgra_bytes() {
    let mut out = [0u8; 4];
    encode_pixel(Vec4::new(1.0, 0.5, 0.0, 1.0), PixelFormat::Bgra, PixelType::UnsignedByte, &mut out);
    assert_eq!(out, [0, 128, 255, 255]);
}

#[test]
fn test_encode_red_float() {
    let mut out = [0u8; 4];
    encode_pixel(Vec4::new(0.25, 1.0, 1.0, 1.0), PixelFormat::Red, PixelType::Float, &mut out);
    assert_eq!(f32::from_ne_bytes(out), 0.25);
}

#[test]
fn test_encode_clamps_bytes() {
    let mut out = [0u8; 2];
    encode_pixel(Vec4::new(2.0, -1.0, 0.0, 0.0), PixelFormat::Rg, PixelType::UnsignedByte, &mut out);
    assert_eq!(out, [255, 0]);
}

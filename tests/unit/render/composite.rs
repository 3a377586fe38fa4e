use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let mut dst = vec![10u8, 20, 30, 255];
    over_in_place(&mut dst, &[255, 0, 0, 255], 0.0).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn over_opaque_src_replaces_dst() {
    let mut dst = vec![10u8, 20, 30, 255];
    over_in_place(&mut dst, &[0, 200, 0, 255], 1.0).unwrap();
    assert_eq!(dst, vec![0, 200, 0, 255]);
}

#[test]
fn over_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn add_saturates() {
    let mut dst = vec![200u8, 100, 0, 255];
    add_in_place(&mut dst, &[100, 100, 100, 255], 1.0).unwrap();
    assert_eq!(dst, vec![255, 200, 100, 255]);
}

#[test]
fn add_scales_by_opacity() {
    let mut dst = vec![0u8, 0, 0, 0];
    add_in_place(&mut dst, &[200, 100, 50, 255], 0.5).unwrap();
    assert_eq!(dst, vec![100, 50, 25, 128]);
}

#[test]
fn half_black_fill_halves_white() {
    let mut dst = vec![255u8, 255, 255, 255];
    fill_over_in_place(&mut dst, Rgba8Premul::with_alpha_f32(0, 0, 0, 0.5));
    assert_eq!(dst, vec![127, 127, 127, 255]);
}

#[test]
fn over_at_clips_to_destination() {
    let mut dst = vec![0u8; 2 * 2 * 4];
    let src = vec![255u8; 2 * 2 * 4];
    over_at(&mut dst, 2, 2, &src, 2, 2, 1, -1);
    // only the source's bottom-left pixel lands on dst (1, 0)
    assert_eq!(&dst[4..8], &[255, 255, 255, 255]);
    assert_eq!(&dst[0..4], &[0, 0, 0, 0]);
    assert_eq!(&dst[8..16], &[0u8; 8]);
}

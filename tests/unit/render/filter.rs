use super::*;

fn apply(m: ColorMatrix, px: [u8; 4]) -> [u8; 4] {
    let mut buf = px.to_vec();
    m.apply(&mut buf);
    [buf[0], buf[1], buf[2], buf[3]]
}

#[test]
fn identity_keeps_pixels() {
    assert_eq!(apply(ColorMatrix::IDENTITY, [10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(apply(ColorMatrix::IDENTITY, [5, 10, 15, 128]), [5, 10, 15, 128]);
}

#[test]
fn full_grayscale_equalizes_channels() {
    let [r, g, b, a] = apply(ColorMatrix::grayscale(1.0), [200, 50, 10, 255]);
    assert_eq!(a, 255);
    assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
}

#[test]
fn zero_amounts_are_identity() {
    let px = [200, 50, 10, 255];
    assert_eq!(apply(ColorMatrix::grayscale(0.0), px), px);
    assert_eq!(apply(ColorMatrix::sepia(0.0), px), px);
    assert_eq!(apply(ColorMatrix::hue_rotate(0.0), px), px);
}

#[test]
fn invert_flips_opaque_channels() {
    assert_eq!(apply(ColorMatrix::invert(1.0), [0, 100, 255, 255]), [255, 155, 0, 255]);
}

#[test]
fn invert_respects_premultiplied_alpha() {
    // straight white at half alpha inverts to straight black at half alpha
    assert_eq!(apply(ColorMatrix::invert(1.0), [128, 128, 128, 128]), [0, 0, 0, 128]);
}

#[test]
fn brightness_scales_and_clamps() {
    assert_eq!(apply(ColorMatrix::brightness(0.5), [200, 100, 0, 255]), [100, 50, 0, 255]);
    assert_eq!(apply(ColorMatrix::brightness(1.8), [200, 100, 0, 255]), [255, 180, 0, 255]);
}

#[test]
fn hue_rotate_full_turn_is_near_identity() {
    let [r, g, b, _] = apply(ColorMatrix::hue_rotate(360.0), [200, 50, 10, 255]);
    assert!(r.abs_diff(200) <= 1 && g.abs_diff(50) <= 1 && b.abs_diff(10) <= 1);
}

#[test]
fn saturate_one_is_identity() {
    let [r, g, b, _] = apply(ColorMatrix::saturate(1.0), [200, 50, 10, 255]);
    assert!(r.abs_diff(200) <= 1 && g.abs_diff(50) <= 1 && b.abs_diff(10) <= 1);
}

#[test]
fn tone_maps_to_matrices() {
    assert_eq!(
        ColorMatrix::tone(ToneAdjust::Brightness(0.25)),
        ColorMatrix::brightness(0.25)
    );
}

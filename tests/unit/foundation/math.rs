use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(100, 128), 50);
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_pixels() {
    let mut px = vec![10u8, 20, 30, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
}

#[test]
fn unpremultiply_half_alpha() {
    let mut px = vec![64u8, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 64, 0, 128]);
}

#[test]
fn lenient_float_reads_numeric_prefix() {
    assert_eq!(lenient_f64("12"), Some(12.0));
    assert_eq!(lenient_f64("  0.25"), Some(0.25));
    assert_eq!(lenient_f64("12px"), Some(12.0));
    assert_eq!(lenient_f64("-.5x"), Some(-0.5));
    assert_eq!(lenient_f64("1e2"), Some(100.0));
    assert_eq!(lenient_f64("3e"), Some(3.0));
    assert_eq!(lenient_f64("."), None);
    assert_eq!(lenient_f64(""), None);
    assert_eq!(lenient_f64("abc"), None);
}

#[test]
fn lenient_int_stops_at_fraction() {
    assert_eq!(lenient_i64("8"), Some(8));
    assert_eq!(lenient_i64("12.9"), Some(12));
    assert_eq!(lenient_i64("-3px"), Some(-3));
    assert_eq!(lenient_i64("px"), None);
    assert_eq!(lenient_i64("+"), None);
}

//! Whole-surface color transforms expressed as 4x5 matrices over straight
//! (un-premultiplied) RGBA in `0..=1`, row-major, last column an offset.

use crate::script::directive::ToneAdjust;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, //
    ]);

    fn rgb(m: [f32; 9]) -> Self {
        Self([
            m[0], m[1], m[2], 0.0, 0.0, //
            m[3], m[4], m[5], 0.0, 0.0, //
            m[6], m[7], m[8], 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    pub fn brightness(b: f32) -> Self {
        Self::rgb([b, 0.0, 0.0, 0.0, b, 0.0, 0.0, 0.0, b])
    }

    pub fn saturate(s: f32) -> Self {
        Self::rgb([
            0.213 + 0.787 * s,
            0.715 - 0.715 * s,
            0.072 - 0.072 * s,
            0.213 - 0.213 * s,
            0.715 + 0.285 * s,
            0.072 - 0.072 * s,
            0.213 - 0.213 * s,
            0.715 - 0.715 * s,
            0.072 + 0.928 * s,
        ])
    }

    /// `amount` is a fraction; values outside `0..=1` are clamped.
    pub fn grayscale(amount: f32) -> Self {
        let s = 1.0 - amount.clamp(0.0, 1.0);
        Self::rgb([
            0.2126 + 0.7874 * s,
            0.7152 - 0.7152 * s,
            0.0722 - 0.0722 * s,
            0.2126 - 0.2126 * s,
            0.7152 + 0.2848 * s,
            0.0722 - 0.0722 * s,
            0.2126 - 0.2126 * s,
            0.7152 - 0.7152 * s,
            0.0722 + 0.9278 * s,
        ])
    }

    /// `amount` is a fraction; values outside `0..=1` are clamped.
    pub fn sepia(amount: f32) -> Self {
        let s = 1.0 - amount.clamp(0.0, 1.0);
        Self::rgb([
            0.393 + 0.607 * s,
            0.769 - 0.769 * s,
            0.189 - 0.189 * s,
            0.349 - 0.349 * s,
            0.686 + 0.314 * s,
            0.168 - 0.168 * s,
            0.272 - 0.272 * s,
            0.534 - 0.534 * s,
            0.131 + 0.869 * s,
        ])
    }

    pub fn invert(amount: f32) -> Self {
        let a = amount.clamp(0.0, 1.0);
        let k = 1.0 - 2.0 * a;
        Self([
            k, 0.0, 0.0, 0.0, a, //
            0.0, k, 0.0, 0.0, a, //
            0.0, 0.0, k, 0.0, a, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    pub fn hue_rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::rgb([
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ])
    }

    pub fn tone(adjust: ToneAdjust) -> Self {
        match adjust {
            ToneAdjust::Brightness(b) => Self::brightness(b),
            ToneAdjust::Saturate(s) => Self::saturate(s),
        }
    }

    /// Apply to a premultiplied RGBA8 buffer in place.
    pub fn apply(&self, buf: &mut [u8]) {
        let m = &self.0;
        for d in buf.chunks_exact_mut(4) {
            let pa = f32::from(d[3]) / 255.0;
            let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
            let r = f32::from(d[0]) / 255.0 * inv_a;
            let g = f32::from(d[1]) / 255.0 * inv_a;
            let b = f32::from(d[2]) / 255.0 * inv_a;
            let a = pa;

            let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
            let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
            let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
            let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

            d[0] = to_u8(out_r * out_a);
            d[1] = to_u8(out_g * out_a);
            d[2] = to_u8(out_b * out_a);
            d[3] = to_u8(out_a);
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/filter.rs"]
mod tests;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::mul_div255_u8;

fn check_same_len(dst: &[u8], src: &[u8], what: &str) -> SceneResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SceneError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

fn opacity_u16(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Source-over of premultiplied `src` onto `dst`, scaled by `opacity`.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SceneResult<()> {
    check_same_len(dst, src, "over_in_place")?;
    over_span(dst, src, opacity_u16(opacity));
    Ok(())
}

fn over_span(dst: &mut [u8], src: &[u8], op: u16) {
    if op == 0 {
        return;
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);
        d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = sc.saturating_add(dc);
        }
    }
}

/// Additive ("lighter") blend of `src` onto `dst`, scaled by `opacity`,
/// saturating each channel.
pub fn add_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SceneResult<()> {
    check_same_len(dst, src, "add_in_place")?;
    let op = opacity_u16(opacity);
    if op == 0 {
        return Ok(());
    }
    for (d, s) in dst.iter_mut().zip(src) {
        *d = d.saturating_add(mul_div255_u8(u16::from(*s), op));
    }
    Ok(())
}

/// Source-over of a constant color covering the whole buffer.
pub fn fill_over_in_place(dst: &mut [u8], color: Rgba8Premul) {
    let sa = u16::from(color.a);
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    let src = color.to_array();
    for d in dst.chunks_exact_mut(4) {
        for c in 0..4 {
            d[c] = src[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
}

/// Source-over of a `src_w`x`src_h` buffer placed at `(x, y)` in `dst`.
/// Parts outside `dst` are skipped.
#[allow(clippy::too_many_arguments)]
pub fn over_at(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    x: i64,
    y: i64,
) {
    let dw = i64::from(dst_w);
    let dh = i64::from(dst_h);
    let x0 = x.max(0);
    let x1 = (x + i64::from(src_w)).min(dw);
    if x0 >= x1 {
        return;
    }
    for sy in 0..i64::from(src_h) {
        let dy = y + sy;
        if dy < 0 || dy >= dh {
            continue;
        }
        let d_start = ((dy * dw + x0) * 4) as usize;
        let d_end = ((dy * dw + x1) * 4) as usize;
        let s_start = ((sy * i64::from(src_w) + (x0 - x)) * 4) as usize;
        let s_end = s_start + (d_end - d_start);
        over_span(&mut dst[d_start..d_end], &src[s_start..s_end], 255);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;

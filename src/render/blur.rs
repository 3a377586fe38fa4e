use crate::foundation::error::{SceneError, SceneResult};

/// Deviation below which the exact kernel is used instead of box passes.
const BOX_BLUR_MIN_SIGMA: f32 = 2.0;

/// Pixels a gaussian of `sigma` reaches before it becomes negligible.
pub fn blur_reach(sigma: f32) -> u32 {
    (3.0 * sigma).ceil().max(0.0) as u32
}

/// Separable gaussian blur of a premultiplied RGBA8 buffer. Samples
/// outside the buffer count as transparent.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> SceneResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SceneError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(SceneError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Gaussian blur with a standard deviation of `sigma` pixels. Small
/// deviations use the exact kernel; larger ones use three box passes per
/// axis, kept in floating point so faint tails survive.
pub fn gaussian_blur(src: &[u8], width: u32, height: u32, sigma: f32) -> SceneResult<Vec<u8>> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SceneError::validation("blur sigma must be finite and >= 0"));
    }
    if sigma < BOX_BLUR_MIN_SIGMA {
        let radius = blur_reach(sigma);
        return blur_rgba8_premul(src, width, height, radius, sigma.max(0.1));
    }
    let (w, h) = (width as usize, height as usize);
    if src.len() != w * h * 4 {
        return Err(SceneError::render(
            "gaussian_blur expects src matching width*height*4",
        ));
    }

    let passes = box_passes(sigma);
    let mut buf: Vec<f32> = src.iter().map(|&b| f32::from(b)).collect();
    let mut tmp = vec![0f32; buf.len()];
    for &(size, left) in &passes {
        box_lines(&buf, &mut tmp, h, w, w * 4, 4, size, left);
        std::mem::swap(&mut buf, &mut tmp);
    }
    for &(size, left) in &passes {
        box_lines(&buf, &mut tmp, w, h, 4, w * 4, size, left);
        std::mem::swap(&mut buf, &mut tmp);
    }
    Ok(buf
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect())
}

/// Blur whose edges do not fade: the buffer is grown by the blur reach on
/// every side, the border filled by stretching the outermost row or column
/// (corners take the corner pixel), `adjust` runs on the padded result,
/// and the middle is cropped back out. `pixels` is the deviation, as in
/// CSS `blur()`.
pub fn padded_blur(
    src: &[u8],
    width: u32,
    height: u32,
    pixels: u32,
    adjust: impl FnOnce(&mut [u8]),
) -> SceneResult<Vec<u8>> {
    let sigma = pixels as f32;
    let pad = blur_reach(sigma);
    let pw = width + 2 * pad;
    let ph = height + 2 * pad;
    let padded = pad_edges(src, width, height, pad);
    let mut blurred = gaussian_blur(&padded, pw, ph, sigma)?;
    adjust(&mut blurred);
    Ok(crop(&blurred, pw, pad, width, height))
}

/// Copy `src` into the middle of a buffer grown by `pad` on each side,
/// replicating edge pixels outward.
pub fn pad_edges(src: &[u8], width: u32, height: u32, pad: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let p = pad as usize;
    let pw = w + 2 * p;
    let ph = h + 2 * p;
    let mut out = vec![0u8; pw * ph * 4];
    for y in 0..ph {
        let sy = y.saturating_sub(p).min(h - 1);
        let src_row = &src[sy * w * 4..(sy + 1) * w * 4];
        let dst_row = &mut out[y * pw * 4..(y + 1) * pw * 4];
        let (left, rest) = dst_row.split_at_mut(p * 4);
        let (middle, right) = rest.split_at_mut(w * 4);
        middle.copy_from_slice(src_row);
        for px in left.chunks_exact_mut(4) {
            px.copy_from_slice(&src_row[..4]);
        }
        for px in right.chunks_exact_mut(4) {
            px.copy_from_slice(&src_row[(w - 1) * 4..]);
        }
    }
    out
}

fn crop(src: &[u8], src_w: u32, pad: u32, width: u32, height: u32) -> Vec<u8> {
    let sw = src_w as usize;
    let p = pad as usize;
    let w = width as usize;
    let mut out = Vec::with_capacity(w * height as usize * 4);
    for y in 0..height as usize {
        let start = ((y + p) * sw + p) * 4;
        out.extend_from_slice(&src[start..start + w * 4]);
    }
    out
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> SceneResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SceneError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push rounding drift into the center tap so weights sum to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    for y in 0..i64::from(height) {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i64 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i64 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

/// `(size, left reach)` of the three box passes approximating a gaussian
/// of `sigma`. Even sizes alternate their bias and finish one pixel wider.
fn box_passes(sigma: f32) -> [(usize, usize); 3] {
    let d = (f64::from(sigma) * 3.0 * (2.0 * std::f64::consts::PI).sqrt() / 4.0 + 0.5).floor();
    let d = (d as usize).max(1);
    if d % 2 == 1 {
        [(d, d / 2); 3]
    } else {
        [(d, d / 2), (d, d / 2 - 1), (d + 1, d / 2)]
    }
}

/// Box-average `lines` lines of `len` pixels. Pixel `i` of line `l` starts
/// at `l * line_step + i * step`; samples past either end are transparent.
#[allow(clippy::too_many_arguments)]
fn box_lines(
    src: &[f32],
    dst: &mut [f32],
    lines: usize,
    len: usize,
    line_step: usize,
    step: usize,
    size: usize,
    left: usize,
) {
    let inv = 1.0 / size as f64;
    let mut prefix = vec![[0f64; 4]; len + 1];
    for l in 0..lines {
        let base = l * line_step;
        for i in 0..len {
            let at = base + i * step;
            let mut next = prefix[i];
            for (acc, &v) in next.iter_mut().zip(&src[at..at + 4]) {
                *acc += f64::from(v);
            }
            prefix[i + 1] = next;
        }
        for i in 0..len {
            let lo = i.saturating_sub(left);
            let hi = (i + size - left).min(len);
            let at = base + i * step;
            for c in 0..4 {
                dst[at + c] = ((prefix[hi][c] - prefix[lo][c]) * inv) as f32;
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + (1 << 15)) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;

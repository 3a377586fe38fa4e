use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Fixed-size premultiplied RGBA8 pixel buffer a scene is drawn into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSurface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl RenderSurface {
    /// Transparent surface. Both sides must be in `1..=u16::MAX`.
    pub fn new(width: u32, height: u32) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::validation("surface size must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(SceneError::validation("surface size exceeds u16"));
        }
        Ok(Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        })
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Premultiplied pixel at `(x, y)`; `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub(crate) fn size_u16(&self) -> (u16, u16) {
        // `new` guarantees both fit.
        (self.width as u16, self.height as u16)
    }

    pub(crate) fn size_f64(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }

    /// Straight-alpha copy for encoding.
    pub fn to_rgba_image(&self) -> SceneResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| SceneError::render("surface buffer does not match its size"))
    }

    /// Copy into a raster backend pixmap.
    pub(crate) fn to_pixmap(&self) -> vello_cpu::Pixmap {
        let (w, h) = self.size_u16();
        pixmap_from_premul_bytes(&self.data, w, h)
    }
}

pub(crate) fn pixmap_from_premul_bytes(bytes: &[u8], width: u16, height: u16) -> vello_cpu::Pixmap {
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    vello_cpu::Pixmap::from_parts_with_opacity(pixels, width, height, true)
}

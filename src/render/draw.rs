use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, Point, Rgba8Premul, affine_to_cpu};
use crate::foundation::error::SceneResult;
use crate::render::composite::over_in_place;
use crate::render::surface::{RenderSurface, pixmap_from_premul_bytes};

/// Vector rasterization on top of `vello_cpu`.
///
/// Every draw renders into a fresh transparent layer which is then
/// composited over the target surface. The render context is kept between
/// draws of the same size.
#[derive(Default)]
pub struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `draw` on a cleared context and return the rendered layer.
    pub fn render_layer(
        &mut self,
        width: u16,
        height: u16,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> vello_cpu::Pixmap {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw(&mut ctx);
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut layer);
        self.ctx = Some(ctx);
        layer
    }

    /// Render a layer the size of `surface` and composite it over.
    pub fn draw_over(
        &mut self,
        surface: &mut RenderSurface,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> SceneResult<()> {
        let (w, h) = surface.size_u16();
        let layer = self.render_layer(w, h, draw);
        over_in_place(&mut surface.data, layer.data_as_u8_slice(), 1.0)
    }

    /// Filled circle in scene coordinates.
    pub fn fill_circle(
        &mut self,
        surface: &mut RenderSurface,
        center: Point,
        radius: f64,
        color: Rgba8Premul,
    ) -> SceneResult<()> {
        use vello_cpu::kurbo::Shape as _;

        let path = vello_cpu::kurbo::Circle::new((center.x, center.y), radius).to_path(0.1);
        self.draw_over(surface, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                color.r, color.g, color.b, color.a,
            ));
            ctx.fill_path(&path);
        })
    }

    /// Draw `image` with its image-space rectangle mapped through
    /// `transform`.
    pub fn draw_image(
        &mut self,
        surface: &mut RenderSurface,
        image: &PreparedImage,
        transform: Affine,
    ) -> SceneResult<()> {
        let Some(paint) = image_paint(&image.rgba8_premul, image.width, image.height) else {
            tracing::warn!(
                width = image.width,
                height = image.height,
                "image too large for the rasterizer"
            );
            return Ok(());
        };
        let rect = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
        self.draw_over(surface, |ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&rect);
        })
    }

    /// Redraw the current surface content through `transform` onto a
    /// cleared surface.
    pub fn redraw_transformed(
        &mut self,
        surface: &mut RenderSurface,
        transform: Affine,
    ) -> SceneResult<()> {
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(surface.to_pixmap())),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let (w, h) = surface.size_f64();
        surface.clear();
        let rect = vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h);
        self.draw_over(surface, |ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&rect);
        })
    }
}

fn image_paint(rgba8_premul: &[u8], width: u32, height: u32) -> Option<vello_cpu::Image> {
    let w = u16::try_from(width).ok()?;
    let h = u16::try_from(height).ok()?;
    let pixmap = pixmap_from_premul_bytes(rgba8_premul, w, h);
    Some(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

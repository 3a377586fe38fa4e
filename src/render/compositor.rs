use rayon::prelude::*;

use crate::assets::cache::AssetCache;
use crate::assets::storage::AssetStorage;
use crate::config::SceneConfig;
use crate::foundation::core::{Affine, Point, Rgba8Premul};
use crate::foundation::error::SceneResult;
use crate::render::blur::padded_blur;
use crate::render::composite::{add_in_place, fill_over_in_place};
use crate::render::draw::Rasterizer;
use crate::render::filter::ColorMatrix;
use crate::render::surface::RenderSurface;
use crate::render::text::{FontBook, TextPainter};
use crate::scene::runner::CancelToken;
use crate::script::directive::{Directive, ScenePlan, ZoomParams};
use crate::script::placement::ImageRef;

const MARKER_COLOR: u32 = 0x00ffff;
const MARKER_RADIUS: f64 = 100.0;

/// How a compositor run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// The cancel token fired; the surface holds a partial frame.
    Cancelled,
}

/// Executes a [`ScenePlan`] against a surface, one directive at a time.
pub struct Compositor<'a> {
    config: &'a SceneConfig,
    cache: &'a AssetCache,
    storage: &'a dyn AssetStorage,
    cancel: Option<&'a CancelToken>,
    raster: Rasterizer,
    text: TextPainter<'a>,
}

impl<'a> Compositor<'a> {
    pub fn new(
        config: &'a SceneConfig,
        cache: &'a AssetCache,
        storage: &'a dyn AssetStorage,
        fonts: &'a FontBook,
    ) -> Self {
        Self {
            config,
            cache,
            storage,
            cancel: None,
            raster: Rasterizer::new(),
            text: TextPainter::new(fonts, &config.default_font),
        }
    }

    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Cyan disc at the scene center.
    pub fn draw_marker(&mut self, surface: &mut RenderSurface) -> SceneResult<()> {
        let (w, h) = surface.size_f64();
        self.raster.fill_circle(
            surface,
            Point::new(w / 2.0, h / 2.0),
            MARKER_RADIUS,
            Rgba8Premul::from_rgb_hex(MARKER_COLOR),
        )
    }

    /// Decode every image the plan references on the rayon pool. Draw order
    /// is unaffected; later fetches hit the cache.
    pub fn prefetch(&self, plan: &ScenePlan) {
        let keys = plan.image_keys();
        if keys.len() < 2 {
            return;
        }
        let (cache, storage) = (self.cache, self.storage);
        keys.par_iter().for_each(|key| {
            let _ = cache.fetch(storage, key);
        });
    }

    /// Run the plan: directives in source order, then the captions.
    #[tracing::instrument(level = "debug", skip_all, fields(directives = plan.directives.len()))]
    pub fn run(&mut self, surface: &mut RenderSurface, plan: &ScenePlan) -> RunOutcome {
        if self.config.prefetch {
            self.prefetch(plan);
        }
        for directive in &plan.directives {
            if self.cancelled() {
                return RunOutcome::Cancelled;
            }
            if let Err(e) = self.apply(surface, directive) {
                tracing::warn!(directive = directive.name(), error = %e, "directive skipped");
            }
        }
        let captions = plan.captions(
            self.config.title_size as f32,
            self.config.subtitle_size as f32,
        );
        for caption in &captions {
            if self.cancelled() {
                return RunOutcome::Cancelled;
            }
            if let Err(e) = self.text.paint(&mut self.raster, surface, caption) {
                tracing::warn!(text = %caption.text, error = %e, "caption skipped");
            }
        }
        RunOutcome::Completed
    }

    /// Apply a single directive. Title and subtitle are ignored here; they
    /// are painted after everything else by [`Compositor::run`].
    pub fn apply(&mut self, surface: &mut RenderSurface, directive: &Directive) -> SceneResult<()> {
        tracing::debug!(directive = directive.name(), "apply");
        match directive {
            Directive::Title(_) | Directive::Subtitle(_) => {}
            Directive::DarkOverlay { amount } => {
                fill_over_in_place(&mut surface.data, Rgba8Premul::with_alpha_f32(0, 0, 0, *amount));
            }
            Directive::LightOverlay { amount } => {
                fill_over_in_place(
                    &mut surface.data,
                    Rgba8Premul::with_alpha_f32(255, 255, 255, *amount),
                );
            }
            Directive::Blur { pixels, tones } => {
                let tone = |buf: &mut [u8]| {
                    for t in tones {
                        ColorMatrix::tone(*t).apply(buf);
                    }
                };
                if *pixels == 0 {
                    tone(&mut surface.data);
                } else {
                    surface.data =
                        padded_blur(&surface.data, surface.width, surface.height, *pixels, tone)?;
                }
            }
            Directive::Bloom { pixels, alpha } => {
                let glow = padded_blur(&surface.data, surface.width, surface.height, *pixels, |_| {})?;
                add_in_place(&mut surface.data, &glow, *alpha)?;
            }
            Directive::Zoom(params) => self.zoom(surface, params)?,
            Directive::Grayscale { amount } => {
                ColorMatrix::grayscale(amount / 100.0).apply(&mut surface.data);
            }
            Directive::Sepia { amount } => {
                ColorMatrix::sepia(amount / 100.0).apply(&mut surface.data);
            }
            Directive::Invert => ColorMatrix::invert(1.0).apply(&mut surface.data),
            Directive::HueRotate { degrees } => {
                ColorMatrix::hue_rotate(*degrees).apply(&mut surface.data);
            }
            Directive::ImagePlacement(image) => self.place_image(surface, image)?,
        }
        Ok(())
    }

    fn zoom(&mut self, surface: &mut RenderSurface, params: &ZoomParams) -> SceneResult<()> {
        let (w, h) = surface.size_f64();
        let Some(transform) = params.transform(w, h) else {
            tracing::debug!(zoom = params.zoom, "zoom factor not positive, skipped");
            return Ok(());
        };
        if is_identity(transform) {
            return Ok(());
        }
        self.raster.redraw_transformed(surface, transform)
    }

    fn place_image(&mut self, surface: &mut RenderSurface, image: &ImageRef) -> SceneResult<()> {
        let Some(prepared) = self.cache.fetch(self.storage, &image.key) else {
            return Ok(());
        };
        let (iw, ih) = prepared.dimensions();
        let transform = image
            .placement
            .transform(surface.size_f64(), (f64::from(iw), f64::from(ih)));
        self.raster.draw_image(surface, &prepared, transform)
    }
}

fn is_identity(transform: Affine) -> bool {
    transform
        .as_coeffs()
        .iter()
        .zip(Affine::IDENTITY.as_coeffs())
        .all(|(a, b)| (a - b).abs() < 1e-9)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;

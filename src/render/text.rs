use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use vello_cpu::kurbo::{Join, Rect, Stroke};
use vello_cpu::peniko::{Color, Gradient};

use crate::foundation::core::{Affine, affine_to_cpu};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::blur::blur_rgba8_premul;
use crate::render::composite::{over_at, over_in_place};
use crate::render::draw::Rasterizer;
use crate::render::surface::RenderSurface;
use crate::script::caption::{Baseline, Caption, TextAlign};

const STROKE_COLOR: Color = Color::from_rgba8(0x24, 0x24, 0x24, 0xff);
const GRADIENT_TOP: Color = Color::from_rgba8(0xff, 0xff, 0xff, 0xff);
const GRADIENT_BOTTOM: Color = Color::from_rgba8(0xe6, 0xe6, 0xe6, 0xff);
/// Half height of the fill gradient band around the anchor, in pixels.
const GRADIENT_HALF_SPAN: f64 = 20.0;
const SHADOW_ALPHA: f32 = 0.25;
const SHADOW_OFFSET: (i64, i64) = (1, 2);
const SHADOW_BLUR_RADIUS: u32 = 3;
const SHADOW_BLUR_SIGMA: f32 = 1.0;

/// Outline width for a font size: 12 px at 192 px.
pub fn stroke_width(font_size: f32) -> f32 {
    font_size / 16.0
}

/// Font face bytes picked from the font database.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub id: usvg::fontdb::ID,
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
}

/// Font lookup over system fonts plus any extra font directories.
pub struct FontBook {
    db: usvg::fontdb::Database,
    resolved: Mutex<HashMap<(String, bool), Option<FontFace>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontBook {
    /// Book without any fonts; text draws nothing.
    pub fn empty() -> Self {
        Self {
            db: usvg::fontdb::Database::new(),
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub fn system() -> Self {
        let mut book = Self::empty();
        book.db.load_system_fonts();
        book
    }

    /// Add every `.ttf`, `.otf` and `.ttc` file directly inside `dir`.
    /// A missing directory is ignored.
    pub fn load_fonts_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            if let Err(e) = self.db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to load font");
            }
        }
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Best face for `family` (empty for the default sans-serif), falling
    /// back to common sans-serif families and finally any face at all.
    pub fn resolve(&self, family: &str, bold: bool) -> Option<FontFace> {
        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        resolved
            .entry((family.to_owned(), bold))
            .or_insert_with(|| self.query(family, bold))
            .clone()
    }

    fn query(&self, family: &str, bold: bool) -> Option<FontFace> {
        use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

        let mut families = Vec::<Family<'_>>::new();
        if !family.is_empty() {
            families.push(Family::Name(family));
        }
        families.push(Family::SansSerif);
        for name in ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial", "Helvetica"] {
            families.push(Family::Name(name));
        }

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id));
        let Some(id) = id else {
            tracing::warn!(family, "no fonts available");
            return None;
        };
        self.db.with_face_data(id, |data, index| FontFace {
            id,
            bytes: Arc::new(data.to_vec()),
            index,
        })
    }
}

struct LoadedFace {
    family: String,
    font: vello_cpu::peniko::FontData,
}

/// Shapes caption text with `parley`. Faces are registered once per engine.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: HashMap<usvg::fontdb::ID, LoadedFace>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    fn load_face(&mut self, face: &FontFace) -> SceneResult<&LoadedFace> {
        if !self.faces.contains_key(&face.id) {
            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);
            let family_id = families
                .first()
                .map(|(id, _)| *id)
                .ok_or_else(|| SceneError::render("no font families registered from font bytes"))?;
            let family = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| SceneError::render("registered font family has no name"))?
                .to_string();
            let font = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
                face.index,
            );
            self.faces.insert(face.id, LoadedFace { family, font });
        }
        self.faces
            .get(&face.id)
            .ok_or_else(|| SceneError::render("font face vanished from the layout engine"))
    }

    /// Lay out one line of text.
    pub fn layout(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        bold: bool,
    ) -> SceneResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SceneError::validation("text size must be finite and > 0"));
        }
        let (family, font) = {
            let loaded = self.load_face(face)?;
            (loaded.family.clone(), loaded.font.clone())
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        if bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        Ok(ShapedText { layout, font })
    }
}

/// A shaped line plus the font to rasterize it with.
pub struct ShapedText {
    layout: parley::Layout<()>,
    font: vello_cpu::peniko::FontData,
}

/// Vertical metrics of the first line, layout-relative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineBox {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
    pub descent: f64,
    /// Baseline offset from the layout top.
    pub baseline: f64,
}

impl ShapedText {
    pub fn line_box(&self) -> LineBox {
        let (ascent, descent, baseline) = self
            .layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                (m.ascent, m.descent, m.baseline)
            })
            .unwrap_or_default();
        LineBox {
            width: f64::from(self.layout.width()),
            height: f64::from(self.layout.height()),
            ascent: f64::from(ascent),
            descent: f64::from(descent),
            baseline: f64::from(baseline),
        }
    }

    /// Draw every glyph with the context's current paint, filled or
    /// stroked with the current stroke.
    fn draw_glyphs(&self, ctx: &mut vello_cpu::RenderContext, stroked: bool) {
        for line in self.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut x = run.offset();
                let y = run.baseline();
                let glyphs: Vec<vello_cpu::Glyph> = run
                    .glyphs()
                    .map(|g| {
                        let glyph = vello_cpu::Glyph {
                            id: g.id,
                            x: x + g.x,
                            y: y - g.y,
                        };
                        x += g.advance;
                        glyph
                    })
                    .collect();
                let glyph_run = ctx.glyph_run(&self.font).font_size(run.run().font_size());
                if stroked {
                    glyph_run.stroke_glyphs(glyphs.into_iter());
                } else {
                    glyph_run.fill_glyphs(glyphs.into_iter());
                }
            }
        }
    }
}

/// Top-left of the layout box in scene pixels for a caption anchored at
/// `anchor`.
pub fn layout_origin(
    line: &LineBox,
    align: TextAlign,
    baseline: Baseline,
    anchor: (f64, f64),
) -> (f64, f64) {
    let left = match align {
        TextAlign::Left => anchor.0,
        TextAlign::Center => anchor.0 - line.width / 2.0,
        TextAlign::Right => anchor.0 - line.width,
    };
    let baseline_y = match baseline {
        Baseline::Top => anchor.1 + line.ascent,
        Baseline::Middle => anchor.1 + (line.ascent - line.descent) / 2.0,
        Baseline::Bottom => anchor.1 - line.descent,
    };
    (left, baseline_y - line.baseline)
}

/// Paints captions with an outline and a soft drop shadow.
pub struct TextPainter<'a> {
    fonts: &'a FontBook,
    default_font: &'a str,
    engine: TextLayoutEngine,
}

impl<'a> TextPainter<'a> {
    pub fn new(fonts: &'a FontBook, default_font: &'a str) -> Self {
        Self {
            fonts,
            default_font,
            engine: TextLayoutEngine::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(text = %caption.text))]
    pub fn paint(
        &mut self,
        raster: &mut Rasterizer,
        surface: &mut RenderSurface,
        caption: &Caption,
    ) -> SceneResult<()> {
        let layout = &caption.layout;
        let Some(face) = self.fonts.resolve(self.default_font, layout.bold) else {
            return Ok(());
        };
        let shaped = self
            .engine
            .layout(&caption.text, &face, layout.size, layout.bold)?;
        let line = shaped.line_box();

        let (scene_w, scene_h) = surface.size_f64();
        let anchor = (scene_w * layout.position.x, scene_h * layout.position.y);
        let (left, top) = layout_origin(&line, layout.align, layout.baseline, anchor);

        let stroke_radius = f64::from(stroke_width(layout.size)) / 2.0;
        let pad = stroke_radius.ceil() + 8.0;
        let x0 = (left - pad).floor();
        let y0 = (top - pad).floor();
        let bw = (line.width + 2.0 * pad).ceil();
        let bh = (line.height + 2.0 * pad).ceil();
        if bw > f64::from(u16::MAX) || bh > f64::from(u16::MAX) {
            tracing::warn!(width = bw, height = bh, "caption too large to paint");
            return Ok(());
        }
        let (bw, bh) = (bw as u16, bh as u16);

        let to_layer = affine_to_cpu(Affine::translate((left - x0, top - y0)));
        let glyph_layer = raster.render_layer(bw, bh, |ctx| {
            ctx.set_transform(to_layer);
            ctx.set_paint(Color::WHITE);
            shaped.draw_glyphs(ctx, false);
        });
        let mask: Vec<u8> = glyph_layer
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();

        let mut layer = raster
            .render_layer(bw, bh, |ctx| {
                ctx.set_transform(to_layer);
                ctx.set_stroke(Stroke::new(f64::from(stroke_width(layout.size))).with_join(Join::Round));
                ctx.set_paint(STROKE_COLOR);
                shaped.draw_glyphs(ctx, true);
            })
            .data_as_u8_slice()
            .to_vec();

        let gradient_top = anchor.1 - GRADIENT_HALF_SPAN - y0;
        let gradient_bottom = anchor.1 + GRADIENT_HALF_SPAN - y0;
        let mut fill = raster
            .render_layer(bw, bh, |ctx| {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(
                    Gradient::new_linear((0.0, gradient_top), (0.0, gradient_bottom))
                        .with_stops([GRADIENT_TOP, GRADIENT_BOTTOM]),
                );
                ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(bw), f64::from(bh)));
            })
            .data_as_u8_slice()
            .to_vec();
        mask_in_place(&mut fill, &mask);

        let (w, h) = (u32::from(bw), u32::from(bh));
        let shadow_mask = soften(
            &shift(&mask, w, h, SHADOW_OFFSET),
            w,
            h,
            SHADOW_BLUR_RADIUS,
            SHADOW_BLUR_SIGMA,
        )?;
        let shadow: Vec<u8> = shadow_mask.iter().flat_map(|&a| [0, 0, 0, a]).collect();

        over_in_place(&mut layer, &fill, 1.0)?;
        over_in_place(&mut layer, &shadow, SHADOW_ALPHA)?;
        over_in_place(&mut layer, &fill, 1.0)?;

        over_at(
            &mut surface.data,
            surface.width,
            surface.height,
            &layer,
            w,
            h,
            x0 as i64,
            y0 as i64,
        );
        Ok(())
    }
}

/// Scale a premultiplied layer by an alpha mask of the same size.
fn mask_in_place(layer: &mut [u8], mask: &[u8]) {
    for (px, &m) in layer.chunks_exact_mut(4).zip(mask) {
        for c in px {
            *c = mul_div255_u8(u16::from(*c), u16::from(m));
        }
    }
}

/// Move an alpha mask by `(dx, dy)` pixels, filling with transparent.
fn shift(mask: &[u8], width: u32, height: u32, (dx, dy): (i64, i64)) -> Vec<u8> {
    let (w, h) = (i64::from(width), i64::from(height));
    let mut out = vec![0u8; mask.len()];
    for y in 0..h {
        for x in 0..w {
            let (sx, sy) = (x - dx, y - dy);
            if sx >= 0 && sy >= 0 && sx < w && sy < h {
                out[(y * w + x) as usize] = mask[(sy * w + sx) as usize];
            }
        }
    }
    out
}

/// Gaussian-blur an alpha mask.
fn soften(mask: &[u8], width: u32, height: u32, radius: u32, sigma: f32) -> SceneResult<Vec<u8>> {
    let rgba: Vec<u8> = mask.iter().flat_map(|&a| [a, a, a, a]).collect();
    let blurred = blur_rgba8_premul(&rgba, width, height, radius, sigma)?;
    Ok(blurred.chunks_exact(4).map(|px| px[3]).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;

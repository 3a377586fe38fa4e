use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::math::{lenient_f64, lenient_i64};
use crate::script::caption::{Caption, TextDirective, resolve_captions};
use crate::script::lexer::{ParsedLine, parse_line, source_lines};
use crate::script::placement::{ImageRef, resolve_placement};

/// Largest blur/bloom deviation in pixels; larger requests are clamped.
pub const MAX_BLUR_RADIUS: u32 = 128;

/// Tonal adjustment chained after a blur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneAdjust {
    Brightness(f32),
    Saturate(f32),
}

impl ToneAdjust {
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "DARK" => Self::Brightness(0.5),
            "DARKER" => Self::Brightness(0.25),
            "LIGHT" => Self::Brightness(1.5),
            "LIGHTER" => Self::Brightness(1.8),
            "DESAT" => Self::Saturate(0.5),
            "SAT" => Self::Saturate(1.5),
            _ => return None,
        })
    }
}

/// Magnify/rotate parameters for `ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomParams {
    pub zoom: f64,
    pub degrees: f64,
    /// Focal point as a fraction of the scene size.
    pub focus: Vec2,
}

impl Default for ZoomParams {
    fn default() -> Self {
        Self {
            zoom: 2.0,
            degrees: 0.0,
            focus: Vec2::new(0.5, 0.5),
        }
    }
}

/// Crop window picked by a zoom: its center and size in scene pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomWindow {
    pub center: Point,
    pub size: Vec2,
}

impl ZoomParams {
    /// Window of `scene / zoom` centered on the focal point, clamped to stay
    /// inside the scene. `None` for a zoom factor that is not positive.
    pub fn window(&self, scene_w: f64, scene_h: f64) -> Option<ZoomWindow> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return None;
        }
        let size = Vec2::new(scene_w / self.zoom, scene_h / self.zoom);
        let clamp = |v: f64, lo: f64, hi: f64| v.min(hi).max(lo);
        let cx = clamp(scene_w * self.focus.x, size.x / 2.0, scene_w - size.x / 2.0);
        let cy = clamp(scene_h * self.focus.y, size.y / 2.0, scene_h - size.y / 2.0);
        Some(ZoomWindow {
            center: Point::new(cx, cy),
            size,
        })
    }

    /// Transform that magnifies the window to the full frame, rotated about
    /// the scene center.
    pub fn transform(&self, scene_w: f64, scene_h: f64) -> Option<Affine> {
        let window = self.window(scene_w, scene_h)?;
        Some(
            Affine::translate((scene_w / 2.0, scene_h / 2.0))
                * Affine::rotate(self.degrees.to_radians())
                * Affine::scale(self.zoom)
                * Affine::translate(-window.center.to_vec2()),
        )
    }
}

/// One executable scene command.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Title(TextDirective),
    Subtitle(TextDirective),
    DarkOverlay { amount: f32 },
    LightOverlay { amount: f32 },
    Blur { pixels: u32, tones: Vec<ToneAdjust> },
    Bloom { pixels: u32, alpha: f32 },
    Zoom(ZoomParams),
    /// Amount in percent.
    Grayscale { amount: f32 },
    /// Amount in percent.
    Sepia { amount: f32 },
    Invert,
    HueRotate { degrees: f32 },
    ImagePlacement(ImageRef),
}

impl Directive {
    /// Interpret a tokenized line. `None` for lines that carry nothing to do,
    /// such as a `TITLE` without text.
    pub fn from_line(line: &ParsedLine) -> Option<Self> {
        let cmd = line.command()?;
        let rest = line.rest();
        let directive = match cmd {
            "TITLE" | "T" => Self::Title(text_directive(rest)?),
            "SUBTITLE" | "S" => Self::Subtitle(text_directive(rest)?),
            "DARK" => Self::DarkOverlay {
                amount: opt_f64(line, "amount", 0.5) as f32,
            },
            "LIGHT" => Self::LightOverlay {
                amount: opt_f64(line, "amount", 0.5) as f32,
            },
            "BLUR" => Self::Blur {
                pixels: opt_radius(line, 8),
                tones: rest
                    .iter()
                    .filter_map(|w| ToneAdjust::from_keyword(w))
                    .collect(),
            },
            "BLOOM" => Self::Bloom {
                pixels: opt_radius(line, 8).max(1),
                alpha: opt_f64(line, "alpha", 0.5) as f32,
            },
            "ZOOM" => Self::Zoom(ZoomParams {
                zoom: opt_f64(line, "zoom", 2.0),
                degrees: opt_f64(line, "degrees", 0.0),
                focus: Vec2::new(opt_f64(line, "xpos", 0.5), opt_f64(line, "ypos", 0.5)),
            }),
            "GRAY" | "GRAYSCALE" => Self::Grayscale {
                amount: opt_f64(line, "amount", 100.0) as f32,
            },
            "SEPIA" => Self::Sepia {
                amount: opt_f64(line, "amount", 100.0) as f32,
            },
            "INVERT" => Self::Invert,
            "HUE" => Self::HueRotate {
                degrees: opt_f64(line, "amount", 90.0) as f32,
            },
            identifier => Self::ImagePlacement(resolve_placement(identifier, rest)),
        };
        Some(directive)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Subtitle(_) => "subtitle",
            Self::DarkOverlay { .. } => "dark",
            Self::LightOverlay { .. } => "light",
            Self::Blur { .. } => "blur",
            Self::Bloom { .. } => "bloom",
            Self::Zoom(_) => "zoom",
            Self::Grayscale { .. } => "grayscale",
            Self::Sepia { .. } => "sepia",
            Self::Invert => "invert",
            Self::HueRotate { .. } => "hue",
            Self::ImagePlacement(_) => "image",
        }
    }
}

fn text_directive(rest: &[String]) -> Option<TextDirective> {
    let Some((text, modifiers)) = rest.split_first() else {
        tracing::trace!("text directive without text");
        return None;
    };
    Some(TextDirective {
        text: text.clone(),
        modifiers: modifiers.to_vec(),
    })
}

fn opt_f64(line: &ParsedLine, key: &str, default: f64) -> f64 {
    line.option(key).and_then(lenient_f64).unwrap_or(default)
}

fn opt_radius(line: &ParsedLine, default: u32) -> u32 {
    match line.option("pixels").and_then(lenient_i64) {
        Some(v) => v.clamp(0, i64::from(MAX_BLUR_RADIUS)) as u32,
        None => default,
    }
}

/// Parsed scene: effects in source order plus the deferred text slots.
///
/// Title and subtitle are pulled out of the ordered list, the last of each
/// wins, and they are painted after every other directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePlan {
    pub directives: Vec<Directive>,
    pub title: Option<TextDirective>,
    pub subtitle: Option<TextDirective>,
}

impl ScenePlan {
    pub fn parse(source: &str) -> Self {
        let mut plan = Self::default();
        for line in source_lines(source) {
            let parsed = parse_line(line.trim());
            match Directive::from_line(&parsed) {
                Some(Directive::Title(t)) => plan.title = Some(t),
                Some(Directive::Subtitle(s)) => plan.subtitle = Some(s),
                Some(d) => plan.directives.push(d),
                None => {}
            }
        }
        plan
    }

    /// Resolved text lines in paint order.
    pub fn captions(&self, title_size: f32, subtitle_size: f32) -> Vec<Caption> {
        resolve_captions(
            self.title.as_ref(),
            self.subtitle.as_ref(),
            title_size,
            subtitle_size,
        )
    }

    /// Lookup keys of every image placement, first occurrence order, no
    /// duplicates.
    pub fn image_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for d in &self.directives {
            if let Directive::ImagePlacement(img) = d
                && !keys.contains(&img.key.as_str())
            {
                keys.push(&img.key);
            }
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.title.is_none() && self.subtitle.is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/directive.rs"]
mod tests;

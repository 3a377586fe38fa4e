use crate::foundation::core::Vec2;

/// Horizontal anchoring of a text line relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchoring of a text line relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Top of the em box sits on the position.
    Top,
    /// Middle of the em box sits on the position.
    Middle,
    /// Bottom of the em box sits on the position.
    Bottom,
}

/// Layout for one title or subtitle line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayoutState {
    /// Font size in pixels.
    pub size: f32,
    pub align: TextAlign,
    pub baseline: Baseline,
    /// Position as a fraction of the scene size.
    pub position: Vec2,
    pub bold: bool,
}

impl TextLayoutState {
    /// Centered, bold layout at `size` pixels.
    pub fn centered(size: f32) -> Self {
        Self {
            size,
            align: TextAlign::Center,
            baseline: Baseline::Middle,
            position: Vec2::new(0.5, 0.5),
            bold: true,
        }
    }

    fn apply(&mut self, token: &str) -> bool {
        match token {
            "<" => {
                self.position.x = 0.05;
                self.align = TextAlign::Left;
            }
            ">" => {
                self.position.x = 0.95;
                self.align = TextAlign::Right;
            }
            "^" => {
                self.position.y = 0.05;
                self.baseline = Baseline::Top;
            }
            "v" => {
                self.position.y = 0.95;
                self.baseline = Baseline::Bottom;
            }
            _ => return false,
        }
        true
    }
}

/// Title or subtitle as written: the text and any trailing modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDirective {
    pub text: String,
    pub modifiers: Vec<String>,
}

/// A text line ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub layout: TextLayoutState,
}

/// Vertical gap between a title and a subtitle that follows it.
pub const SUBTITLE_OFFSET: f64 = 0.1;

/// Resolve title and subtitle layout, title first.
///
/// Title modifiers move both lines. Subtitle modifiers move only the
/// subtitle; when it declares none it sits [`SUBTITLE_OFFSET`] below the
/// position inherited from the title.
pub fn resolve_captions(
    title: Option<&TextDirective>,
    subtitle: Option<&TextDirective>,
    title_size: f32,
    subtitle_size: f32,
) -> Vec<Caption> {
    let Some(title) = title else {
        return subtitle
            .map(|s| {
                let mut sd = TextLayoutState::centered(subtitle_size);
                for token in &s.modifiers {
                    sd.apply(token);
                }
                vec![Caption {
                    text: s.text.clone(),
                    layout: sd,
                }]
            })
            .unwrap_or_default();
    };

    let mut td = TextLayoutState::centered(title_size);
    let mut sd = TextLayoutState::centered(subtitle_size);
    for token in &title.modifiers {
        if td.apply(token) {
            sd.apply(token);
            if token == "v" && subtitle.is_some() {
                td.position.y = 0.9;
                sd.position.y = 0.85;
            }
        }
    }

    let mut out = vec![Caption {
        text: title.text.clone(),
        layout: td,
    }];

    if let Some(subtitle) = subtitle {
        let mut inherited = true;
        for token in &subtitle.modifiers {
            if sd.apply(token) {
                inherited = false;
            }
        }
        if inherited {
            sd.position.y += SUBTITLE_OFFSET;
        }
        out.push(Caption {
            text: subtitle.text.clone(),
            layout: sd,
        });
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/script/caption.rs"]
mod tests;

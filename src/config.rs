use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::lenient_i64;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_SCENE_W: u32 = 1920;
pub const DEFAULT_SCENE_H: u32 = 1080;
pub const DEFAULT_TITLE_SIZE: u32 = 192;
pub const DEFAULT_SUBTITLE_SIZE: u32 = 96;

/// Persisted scene settings.
///
/// Loading is lenient: a numeric value that is missing, unparsable, zero or
/// out of range falls back to its default instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    /// Surface width in pixels.
    pub scene_w: u32,
    /// Surface height in pixels.
    pub scene_h: u32,
    /// Preferred font family; empty means the system sans-serif.
    pub default_font: String,
    /// Title font size in pixels.
    pub title_size: u32,
    /// Subtitle font size in pixels.
    pub subtitle_size: u32,
    /// Draw the cyan marker circle at the scene center.
    pub marker: bool,
    /// Decode referenced images in parallel before drawing.
    pub prefetch: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_w: DEFAULT_SCENE_W,
            scene_h: DEFAULT_SCENE_H,
            default_font: String::new(),
            title_size: DEFAULT_TITLE_SIZE,
            subtitle_size: DEFAULT_SUBTITLE_SIZE,
            marker: true,
            prefetch: true,
        }
    }
}

impl SceneConfig {
    /// Parse settings from a JSON object, applying the lenient per-key rules.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| SceneError::config(format!("parse settings JSON: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| SceneError::config("settings JSON must be an object"))?;

        let mut cfg = Self::default();
        for (key, raw) in obj {
            cfg.set_json(key, raw);
        }
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneError::config(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::config(format!("serialize settings: {e}")))
    }

    /// Apply one edit from a settings form. Unknown keys are ignored and
    /// reported as `false`.
    pub fn set(&mut self, key: &str, raw: &str) -> bool {
        self.set_json(key, &serde_json::Value::String(raw.to_owned()))
    }

    fn set_json(&mut self, key: &str, raw: &serde_json::Value) -> bool {
        match key {
            "sceneW" => self.scene_w = dimension_or(raw, DEFAULT_SCENE_W),
            "sceneH" => self.scene_h = dimension_or(raw, DEFAULT_SCENE_H),
            "titleSize" => self.title_size = dimension_or(raw, DEFAULT_TITLE_SIZE),
            "subtitleSize" => self.subtitle_size = dimension_or(raw, DEFAULT_SUBTITLE_SIZE),
            "defaultFont" => {
                self.default_font = raw.as_str().map(str::to_owned).unwrap_or_default();
            }
            "marker" => self.marker = flag_or(raw, true),
            "prefetch" => self.prefetch = flag_or(raw, true),
            _ => {
                tracing::trace!(key, "ignoring unknown settings key");
                return false;
            }
        }
        true
    }

    /// Check the surface size fits the raster backend.
    pub fn validate(&self) -> SceneResult<()> {
        for (name, v) in [("sceneW", self.scene_w), ("sceneH", self.scene_h)] {
            if v == 0 || v > u32::from(u16::MAX) {
                return Err(SceneError::validation(format!(
                    "{name} must be in 1..={}, got {v}",
                    u16::MAX
                )));
            }
        }
        Ok(())
    }
}

fn dimension_or(raw: &serde_json::Value, default: u32) -> u32 {
    let parsed = match raw {
        serde_json::Value::Number(n) => n.as_f64().map(|v| v.trunc() as i64),
        serde_json::Value::String(s) => lenient_i64(s),
        _ => None,
    };
    match parsed {
        Some(v) if v > 0 && v <= i64::from(u16::MAX) => v as u32,
        _ => default,
    }
}

fn flag_or(raw: &serde_json::Value, default: bool) -> bool {
    match raw {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => match s.trim() {
            "true" => true,
            "false" => false,
            _ => default,
        },
        _ => default,
    }
}

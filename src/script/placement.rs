use crate::foundation::core::{Affine, Vec2};

/// Where and how one image lands on the surface.
///
/// `anchor` is a fraction of the image size, `position` a fraction of the
/// scene size, `scale` a per-axis factor whose sign encodes mirroring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementState {
    pub anchor: Vec2,
    pub position: Vec2,
    pub scale: Vec2,
}

impl Default for PlacementState {
    fn default() -> Self {
        Self {
            anchor: Vec2::new(0.5, 1.0),
            position: Vec2::new(0.5, 1.0),
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl PlacementState {
    /// Apply one modifier token. Returns `false` when the token is not a
    /// modifier, leaving the state untouched.
    pub fn apply(&mut self, token: &str) -> bool {
        match token {
            "<" => {
                self.anchor.x = 0.0;
                self.position.x = 0.0;
            }
            ">" => {
                self.anchor.x = 0.0;
                self.position.x = 1.0;
                self.scale.x = -1.0;
            }
            "FLIP" => {
                self.anchor.x = 1.0;
                self.scale.x *= -1.0;
            }
            "+" => {
                self.anchor = Vec2::new(0.5, 0.5);
                self.position = Vec2::new(0.5, 0.5);
            }
            _ => return false,
        }
        true
    }

    /// Image-space to scene-space transform for an image of `image_size`
    /// drawn on a scene of `scene_size` pixels.
    pub fn transform(&self, scene_size: (f64, f64), image_size: (f64, f64)) -> Affine {
        let origin = Vec2::new(
            scene_size.0 * self.position.x,
            scene_size.1 * self.position.y,
        );
        let offset = Vec2::new(-image_size.0 * self.anchor.x, -image_size.1 * self.anchor.y);
        Affine::translate(origin)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(offset)
    }
}

/// Image placement resolved from a directive line: the cache lookup key
/// plus the folded placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub key: String,
    pub placement: PlacementState,
}

/// Fold `tokens` left to right over the default placement. Tokens that are
/// not modifiers become extra path segments of `identifier`.
pub fn resolve_placement(identifier: &str, tokens: &[String]) -> ImageRef {
    let mut placement = PlacementState::default();
    let mut segments = vec![identifier];
    for token in tokens {
        if !placement.apply(token) {
            segments.push(token.as_str());
        }
    }
    ImageRef {
        key: segments.join("/"),
        placement,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/placement.rs"]
mod tests;

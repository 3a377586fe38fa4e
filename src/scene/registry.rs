/// Horizontal placement of a scene block in the host flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Float {
    Left,
    Right,
    Center,
}

/// One host tag and how much of the container its scene occupies. Float
/// and spoiler state follow from the tag name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagBinding {
    pub tag: &'static str,
    /// Percentage of the host width.
    pub width_share: f64,
}

impl TagBinding {
    const fn new(tag: &'static str, width_share: f64) -> Self {
        Self { tag, width_share }
    }

    pub fn float(&self) -> Float {
        float_for_tag(self.tag)
    }

    /// Content hidden until revealed by the host.
    pub fn spoiler(&self) -> bool {
        is_spoiler_tag(self.tag)
    }

    /// Width available to the scene inside a host `host_width` pixels wide.
    pub fn container_width(&self, host_width: f64) -> f64 {
        host_width * self.width_share / 100.0
    }
}

const FULL: f64 = 100.0;
const HALF: f64 = 49.5;
const THIRD: f64 = 32.5;

/// Every tag a host can bind a scene block to.
pub const SCENE_TAGS: [TagBinding; 14] = [
    TagBinding::new("scene_full", FULL),
    TagBinding::new("scene_full_spoiler", FULL),
    TagBinding::new("scene", HALF),
    TagBinding::new("scene_spoiler", HALF),
    TagBinding::new("scene_right", HALF),
    TagBinding::new("scene_right_spoiler", HALF),
    TagBinding::new("scene_center", HALF),
    TagBinding::new("scene_center_spoiler", HALF),
    TagBinding::new("scene_small", THIRD),
    TagBinding::new("scene_small_spoiler", THIRD),
    TagBinding::new("scene_small_right", THIRD),
    TagBinding::new("scene_small_right_spoiler", THIRD),
    TagBinding::new("scene_small_center", THIRD),
    TagBinding::new("scene_small_center_spoiler", THIRD),
];

pub fn binding_for(tag: &str) -> Option<&'static TagBinding> {
    SCENE_TAGS.iter().find(|b| b.tag == tag)
}

/// Float a tag name implies: `_left` or the bare half-width tag float left,
/// `_right` floats right, anything else is centered.
pub fn float_for_tag(tag: &str) -> Float {
    if tag.contains("_left") || tag == "scene" || tag == "scene_spoiler" {
        Float::Left
    } else if tag.contains("_right") {
        Float::Right
    } else {
        Float::Center
    }
}

pub fn is_spoiler_tag(tag: &str) -> bool {
    tag.ends_with("_spoiler")
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;

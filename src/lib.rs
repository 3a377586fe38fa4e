//! Scenebox renders visual-novel style scenes from a compact text language.
//!
//! A scene is a few lines of directives (`DARK`, `BLUR pixels:4`, `TITLE
//! "Chapter 1"`, image placements such as `bg/park <`) executed in order
//! onto a fixed-size premultiplied RGBA surface:
//!
//! - Load a [`SceneConfig`]
//! - Build a [`SceneRunner`] over an [`AssetStorage`], a shared [`AssetCache`]
//!   and a [`FontBook`]
//! - Call [`SceneRunner::render`] whenever the scene text changes
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
mod foundation;
pub mod render;
pub mod scene;
/// The scene language.
pub mod script;

pub use crate::foundation::core::{Affine, Point, Rgba8Premul, Vec2};
pub use crate::foundation::error::{SceneError, SceneResult};
pub use crate::foundation::math::{lenient_f64, lenient_i64};

pub use crate::assets::cache::AssetCache;
pub use crate::assets::storage::{AssetStorage, FsStorage, MemoryStorage};
pub use crate::config::SceneConfig;
pub use crate::render::surface::RenderSurface;
pub use crate::render::text::FontBook;
pub use crate::scene::registry::{Float, SCENE_TAGS, TagBinding, binding_for};
pub use crate::scene::runner::{CancelToken, SceneRunner};
pub use crate::scene::view::{DisplayScale, ResizeSubscription, SceneBlock, Viewport, display_scale};
pub use crate::script::directive::{Directive, ScenePlan};

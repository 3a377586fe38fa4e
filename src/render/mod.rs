//! Raster side of a scene: the premultiplied surface, pixel-level
//! compositing and filters, `vello_cpu` draws and text.

pub mod blur;
pub mod composite;
pub mod compositor;
pub mod draw;
pub mod filter;
pub mod surface;
pub mod text;

/// Identifier resolution and decoded image cache.
pub mod cache;
/// Raster decoding into premultiplied RGBA8.
pub mod decode;
/// Storage collaborators.
pub mod storage;

//! Running scenes and binding them into a host: the render entry point,
//! the tag registry and display scaling.

pub mod registry;
pub mod runner;
pub mod view;

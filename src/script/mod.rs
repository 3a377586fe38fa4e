/// Title/subtitle layout resolution.
pub mod caption;
/// Typed directives and the scene plan.
pub mod directive;
/// Line splitting and tokenizing.
pub mod lexer;
/// Image placement modifier folding.
pub mod placement;

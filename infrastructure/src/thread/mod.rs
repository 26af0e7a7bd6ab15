//! Thread dump reading
//!
//! Turns a saved thread into domain `Post`s: container parsing, BBCode
//! sentinel substitution, and origin construction.

mod markup;
mod text_source;

pub use markup::substitute_markup;
pub use text_source::TextThreadSource;

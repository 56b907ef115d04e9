//! Deck and document model.
//!
//! This module defines the data structures that flow through the pipeline:
//! the deck plan a build starts from, the typed content the parser produces,
//! the laid-out slide elements the assembler emits, and the sealed document
//! a sink writes out.

mod content;
mod document;
mod element;
mod image;
mod plan;

pub use content::*;
pub use document::*;
pub use element::*;
pub use image::*;
pub use plan::*;

pub(crate) use plan::replace_control_chars;

//! Auxiliary content: tooltips and document descriptions from the CMS.

mod rich_text;

pub use rich_text::{Block, Inline, ListFormat, RichText};

//! Dataset transformers

mod date_text;

pub use date_text::DateStringifier;

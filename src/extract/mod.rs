//! Field extractors for dictated reminder text.
//!
//! Each extractor looks for one field in already-normalized text and hands
//! back the text with the matched span blanked out, so that extractors run
//! later in the pipeline never see fragments an earlier one consumed.

use std::ops::Range;

pub mod date;
pub mod dose;
pub mod frequency;
pub mod name;
pub mod time;

pub use date::DateExtractor;
pub use dose::DoseExtractor;
pub use frequency::FrequencyExtractor;
pub use name::NameExtractor;
pub use time::TimeExtractor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult<T> {
    pub value: Option<T>,
    /// Input text with the matched span replaced by a single space.
    pub remaining_text: String,
}

impl<T> ExtractionResult<T> {
    pub fn found(value: T, remaining_text: String) -> Self {
        Self {
            value: Some(value),
            remaining_text,
        }
    }

    pub fn miss(text: &str) -> Self {
        Self {
            value: None,
            remaining_text: text.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

pub trait FieldExtractor {
    type Output;

    fn extract(&self, text: &str) -> ExtractionResult<Self::Output>;
}

/// Replace `span` of `text` with a single space.
pub(crate) fn cut(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push(' ');
    out.push_str(&text[span.end..]);
    out
}

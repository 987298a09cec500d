//! Textual edits
//!
//! Most rewrites are structural, but some (removing a comment, for
//! instance) are naturally expressed as text. A [`TextEdit`] replaces a
//! range of the document with new text; the tree editor applies one to the
//! trivia of a single token and re-lexes the result.

use crate::error::RefitError;
use crate::result::Result;
use biome_text_size::{TextRange, TextSize};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn replace_range(range: Range<usize>, new_text: impl Into<String>) -> Self {
        Self::new(range_to_text_range(range), new_text)
    }

    pub fn insert(position: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(position), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty() && !self.new_text.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        !self.range.is_empty() && self.new_text.is_empty()
    }

    /// Length change caused by this edit
    pub fn length_delta(&self) -> i64 {
        self.new_text.len() as i64 - i64::from(u32::from(self.range.len()))
    }

    /// The same edit with its range moved left by `offset`
    pub fn relative_to(&self, offset: TextSize) -> Option<Self> {
        let range = self.range.checked_sub(offset)?;
        Some(Self::new(range, self.new_text.clone()))
    }

    /// Apply to `text`, which must contain the range on char boundaries
    pub fn apply(&self, text: &str) -> Result<String> {
        let start = usize::from(self.range.start());
        let end = usize::from(self.range.end());
        if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(RefitError::invalid_edit(format!(
                "edit {:?} does not fit a text of length {}",
                self.range,
                text.len()
            )));
        }
        let mut result = String::with_capacity(text.len() + self.new_text.len());
        result.push_str(&text[..start]);
        result.push_str(&self.new_text);
        result.push_str(&text[end..]);
        Ok(result)
    }
}

/// Apply non-overlapping edits in one pass
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String> {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start(), edit.range.end()));
    if sorted
        .windows(2)
        .any(|pair| pair[0].range.end() > pair[1].range.start())
    {
        return Err(RefitError::invalid_edit("overlapping text edits"));
    }
    sorted
        .into_iter()
        .rev()
        .try_fold(text.to_string(), |current, edit| edit.apply(&current))
}

/// Serializable form used by the command-line host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEditDto {
    pub start: u32,
    pub end: u32,
    pub new_text: String,
}

impl From<&TextEdit> for TextEditDto {
    fn from(edit: &TextEdit) -> Self {
        Self {
            start: edit.range.start().into(),
            end: edit.range.end().into(),
            new_text: edit.new_text.clone(),
        }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new(
        TextSize::from(range.start as u32),
        TextSize::from(range.end as u32),
    )
}

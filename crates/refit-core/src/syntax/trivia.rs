//! Trivia attached to tokens
//!
//! Trivia is the non-semantic text around tokens: whitespace, line breaks,
//! comments and directive lines. Every trivia item belongs to exactly one
//! token, either as leading or trailing trivia, so that rendering all tokens
//! in order reproduces the source byte for byte.

use biome_text_size::TextSize;

/// Classification of a trivia item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    SingleLineComment,
    MultiLineComment,
    SingleLineDocComment,
    MultiLineDocComment,
    /// Directive lines such as `#region`
    Other,
}

/// A single trivia item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Whitespace, text)
    }

    pub fn end_of_line(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::EndOfLine, text)
    }

    /// A single space
    pub fn space() -> Self {
        Self::whitespace(" ")
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TriviaKind::Whitespace
    }

    pub fn is_end_of_line(&self) -> bool {
        self.kind == TriviaKind::EndOfLine
    }

    /// Check if this trivia can be dropped without losing information
    pub fn is_whitespace_or_end_of_line(&self) -> bool {
        matches!(self.kind, TriviaKind::Whitespace | TriviaKind::EndOfLine)
    }

    /// Check if this is a comment of any flavour
    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::SingleLineComment
                | TriviaKind::MultiLineComment
                | TriviaKind::SingleLineDocComment
                | TriviaKind::MultiLineDocComment
        )
    }

    pub fn is_doc_comment(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::SingleLineDocComment | TriviaKind::MultiLineDocComment
        )
    }
}

/// Total length of a trivia list
pub fn trivia_len(trivia: &[Trivia]) -> TextSize {
    trivia
        .iter()
        .fold(TextSize::from(0), |total, item| total + item.len())
}

/// Check if every item in the list is whitespace or a line break
pub fn is_whitespace_or_end_of_line(trivia: &[Trivia]) -> bool {
    trivia.iter().all(Trivia::is_whitespace_or_end_of_line)
}

/// Check if the list holds at least one comment
pub fn has_comments(trivia: &[Trivia]) -> bool {
    trivia.iter().any(Trivia::is_comment)
}

/// Total byte length of the comments in a list
pub fn comment_len(trivia: &[Trivia]) -> usize {
    trivia
        .iter()
        .filter(|t| t.is_comment())
        .map(|t| t.text.len())
        .sum()
}

/// Render a trivia list back to text
pub fn render(trivia: &[Trivia]) -> String {
    trivia.iter().map(|t| t.text.as_str()).collect()
}

//! Lossless lexer that attaches trivia to tokens
//!
//! Lexing runs in two passes. The first pass splits the input into trivia
//! pieces and token pieces. The second pass distributes the trivia: a token
//! takes every trivia piece after it up to and including the first line
//! break as trailing trivia, and the rest becomes leading trivia of the next
//! token. Documentation comments and directive lines always lead. Whatever
//! remains at the end of the input belongs to the end-of-file token.
//!
//! Concatenating every token's leading trivia, text and trailing trivia
//! reproduces the input exactly.

use super::arena::GreenToken;
use super::kind::SyntaxKind;
use super::trivia::{Trivia, TriviaKind};
use crate::error::RefitError;
use crate::result::Result;

/// A token with its attached trivia and the offset of its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
    pub offset: usize,
}

impl LexedToken {
    pub fn into_green(self) -> GreenToken {
        GreenToken::with_trivia(self.kind, self.text, self.leading, self.trailing)
    }
}

#[derive(Debug)]
enum Piece {
    Trivia(Trivia),
    Token {
        kind: SyntaxKind,
        start: usize,
        end: usize,
    },
}

const PUNCTUATION: &[(&str, SyntaxKind)] = &[
    ("<<=", SyntaxKind::LessLessEquals),
    ("??=", SyntaxKind::QuestionQuestionEquals),
    ("??", SyntaxKind::QuestionQuestion),
    ("==", SyntaxKind::EqualsEquals),
    ("!=", SyntaxKind::ExclamationEquals),
    ("<=", SyntaxKind::LessEquals),
    (">=", SyntaxKind::GreaterEquals),
    ("<<", SyntaxKind::LessLess),
    ("&&", SyntaxKind::AmpersandAmpersand),
    ("||", SyntaxKind::BarBar),
    ("++", SyntaxKind::PlusPlus),
    ("--", SyntaxKind::MinusMinus),
    ("+=", SyntaxKind::PlusEquals),
    ("-=", SyntaxKind::MinusEquals),
    ("*=", SyntaxKind::StarEquals),
    ("/=", SyntaxKind::SlashEquals),
    ("%=", SyntaxKind::PercentEquals),
    ("&=", SyntaxKind::AmpersandEquals),
    ("|=", SyntaxKind::BarEquals),
    ("^=", SyntaxKind::CaretEquals),
    ("{", SyntaxKind::OpenBrace),
    ("}", SyntaxKind::CloseBrace),
    ("(", SyntaxKind::OpenParen),
    (")", SyntaxKind::CloseParen),
    ("[", SyntaxKind::OpenBracket),
    ("]", SyntaxKind::CloseBracket),
    (";", SyntaxKind::Semicolon),
    (",", SyntaxKind::Comma),
    (".", SyntaxKind::Dot),
    (":", SyntaxKind::Colon),
    ("?", SyntaxKind::Question),
    ("+", SyntaxKind::Plus),
    ("-", SyntaxKind::Minus),
    ("*", SyntaxKind::Star),
    ("/", SyntaxKind::Slash),
    ("%", SyntaxKind::Percent),
    ("&", SyntaxKind::Ampersand),
    ("|", SyntaxKind::Bar),
    ("^", SyntaxKind::Caret),
    ("!", SyntaxKind::Exclamation),
    ("~", SyntaxKind::Tilde),
    ("=", SyntaxKind::Equals),
    ("<", SyntaxKind::Less),
    // `>>` and `>>=` are glued by the parser so that nested type
    // argument lists close one bracket at a time
    (">", SyntaxKind::Greater),
];

/// Lex source text into tokens with attached trivia
///
/// The last token is always [`SyntaxKind::EndOfFile`].
pub fn lex(input: &str) -> Result<Vec<LexedToken>> {
    let pieces = lex_pieces(input)?;
    let mut tokens = Vec::new();
    let mut leading = Vec::new();
    let mut pieces = pieces.into_iter().peekable();

    while let Some(piece) = pieces.next() {
        match piece {
            Piece::Trivia(trivia) => leading.push(trivia),
            Piece::Token { kind, start, end } => {
                let mut trailing = Vec::new();
                while let Some(Piece::Trivia(trivia)) = pieces.next_if(|p| {
                    matches!(p, Piece::Trivia(t) if !t.is_doc_comment() && t.kind != TriviaKind::Other)
                }) {
                    let is_eol = trivia.is_end_of_line();
                    trailing.push(trivia);
                    if is_eol {
                        break;
                    }
                }
                tokens.push(LexedToken {
                    kind,
                    text: input[start..end].to_string(),
                    leading: std::mem::take(&mut leading),
                    trailing,
                    offset: start,
                });
            }
        }
    }

    tokens.push(LexedToken {
        kind: SyntaxKind::EndOfFile,
        text: String::new(),
        leading,
        trailing: Vec::new(),
        offset: input.len(),
    });
    Ok(tokens)
}

/// Lex text that must consist of trivia only
pub fn lex_trivia(input: &str) -> Result<Vec<Trivia>> {
    lex_pieces(input)?
        .into_iter()
        .map(|piece| match piece {
            Piece::Trivia(trivia) => Ok(trivia),
            Piece::Token { start, end, .. } => Err(RefitError::invalid_edit(format!(
                "expected only whitespace and comments, found '{}'",
                &input[start..end]
            ))),
        })
        .collect()
}

fn lex_pieces(input: &str) -> Result<Vec<Piece>> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut pieces = Vec::new();
    let mut i = 0usize;
    let mut at_line_start = true;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        match current {
            '\n' => {
                pieces.push(Piece::Trivia(Trivia::end_of_line("\n")));
                i += size;
                at_line_start = true;
                continue;
            }
            '\r' => {
                let end = if bytes.get(i + 1) == Some(&b'\n') {
                    i + 2
                } else {
                    i + 1
                };
                pieces.push(Piece::Trivia(Trivia::end_of_line(&input[start..end])));
                i = end;
                at_line_start = true;
                continue;
            }
            c if c.is_whitespace() => {
                let end = scan_while(input, i, |c| c.is_whitespace() && c != '\n' && c != '\r');
                pieces.push(Piece::Trivia(Trivia::whitespace(&input[start..end])));
                i = end;
                continue;
            }
            '#' if at_line_start => {
                let end = line_end(input, i);
                pieces.push(Piece::Trivia(Trivia::new(
                    TriviaKind::Other,
                    &input[start..end],
                )));
                i = end;
                continue;
            }
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = line_end(input, i);
                let text = &input[start..end];
                let kind = if text.starts_with("///") && !text.starts_with("////") {
                    TriviaKind::SingleLineDocComment
                } else {
                    TriviaKind::SingleLineComment
                };
                pieces.push(Piece::Trivia(Trivia::new(kind, text)));
                i = end;
                continue;
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let Some(close) = input[i + 2..].find("*/") else {
                    return Err(RefitError::parse_error("unterminated comment", start));
                };
                let end = i + 2 + close + 2;
                let text = &input[start..end];
                let kind = if text.starts_with("/**") && text != "/**/" {
                    TriviaKind::MultiLineDocComment
                } else {
                    TriviaKind::MultiLineComment
                };
                pieces.push(Piece::Trivia(Trivia::new(kind, text)));
                i = end;
                continue;
            }
            _ => {}
        }

        at_line_start = false;
        let (kind, end) = lex_token(input, i, current)?;
        pieces.push(Piece::Token { kind, start, end });
        i = end;
    }

    Ok(pieces)
}

fn lex_token(input: &str, start: usize, current: char) -> Result<(SyntaxKind, usize)> {
    let bytes = input.as_bytes();

    if current == '@' {
        return match next_char(input, start + 1) {
            Some(('"', _)) => lex_verbatim_string(input, start),
            Some((c, _)) if is_ident_start(c) => {
                let end = scan_while(input, start + 1, is_ident_continue);
                Ok((SyntaxKind::Identifier, end))
            }
            _ => Err(RefitError::parse_error("unexpected character '@'", start)),
        };
    }

    if is_ident_start(current) {
        let end = scan_while(input, start, is_ident_continue);
        let kind = SyntaxKind::from_keyword(&input[start..end]).unwrap_or(SyntaxKind::Identifier);
        return Ok((kind, end));
    }

    if current.is_ascii_digit()
        || (current == '.' && bytes.get(start + 1).is_some_and(u8::is_ascii_digit))
    {
        return Ok((SyntaxKind::NumericLiteral, lex_number(input, start)));
    }

    match current {
        '"' => return lex_quoted(input, start, '"', SyntaxKind::StringLiteral),
        '\'' => return lex_quoted(input, start, '\'', SyntaxKind::CharacterLiteral),
        _ => {}
    }

    let rest = &input[start..];
    PUNCTUATION
        .iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|(text, kind)| (*kind, start + text.len()))
        .ok_or_else(|| {
            RefitError::parse_error(format!("unexpected character '{current}'"), start)
        })
}

fn lex_number(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    if bytes[start] == b'0' && matches!(bytes.get(start + 1), Some(b'x') | Some(b'X')) {
        let end = scan_while(input, start + 2, |c| c.is_ascii_hexdigit() || c == '_');
        return scan_while(input, end, is_numeric_suffix);
    }

    let mut end = scan_while(input, start, |c| c.is_ascii_digit() || c == '_');
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = scan_while(input, end + 1, |c| c.is_ascii_digit() || c == '_');
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+') | Some(b'-')) {
            exponent += 1;
        }
        if bytes.get(exponent).is_some_and(u8::is_ascii_digit) {
            end = scan_while(input, exponent, |c| c.is_ascii_digit());
        }
    }
    scan_while(input, end, is_numeric_suffix)
}

fn lex_quoted(
    input: &str,
    start: usize,
    quote: char,
    kind: SyntaxKind,
) -> Result<(SyntaxKind, usize)> {
    let mut i = start + 1;
    while let Some((c, size)) = next_char(input, i) {
        match c {
            '\\' => {
                i += size;
                if let Some((_, escaped)) = next_char(input, i) {
                    i += escaped;
                }
            }
            '\n' | '\r' => break,
            c if c == quote => return Ok((kind, i + size)),
            _ => i += size,
        }
    }
    Err(RefitError::parse_error("unterminated literal", start))
}

fn lex_verbatim_string(input: &str, start: usize) -> Result<(SyntaxKind, usize)> {
    let bytes = input.as_bytes();
    let mut i = start + 2;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Ok((SyntaxKind::StringLiteral, i + 1));
        }
        i += 1;
    }
    Err(RefitError::parse_error("unterminated verbatim string", start))
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_numeric_suffix(c: char) -> bool {
    matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D' | 'm' | 'M')
}

/// Offset of the first line break at or after `start`
fn line_end(input: &str, start: usize) -> usize {
    input[start..]
        .find(['\n', '\r'])
        .map_or(input.len(), |offset| start + offset)
}

fn scan_while(input: &str, start: usize, predicate: impl Fn(char) -> bool) -> usize {
    let mut i = start;
    while let Some((c, size)) = next_char(input, i) {
        if !predicate(c) {
            break;
        }
        i += size;
    }
    i
}

/// Get next character and its UTF-8 size
fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input.get(pos..)?.chars().next().map(|c| (c, c.len_utf8()))
}

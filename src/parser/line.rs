//! Lexing of a single line of structure text.
//!
//! Widths are counted in chars, never bytes, so box-drawing glyphs take one
//! column like any other character.

use crate::tree::{EntryKind, FILE_MARKER};

/// Columns a tab stands for; one indentation level.
pub(crate) const TAB_WIDTH: usize = 2;

const COMMENT_MARKER: char = '#';
const SEPARATOR: char = '/';

/// How a line expresses its nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Indent {
    /// The line carries a connector (`├──`, `└──`, `|--`, `` `-- ``).
    Glyph { verticals: usize, column: usize },
    /// Plain leading whitespace.
    Whitespace { columns: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub indent: Indent,
    /// Text after the tree prefix, comment included.
    pub text: &'a str,
}

fn is_vertical(ch: char) -> bool {
    matches!(ch, '│' | '|')
}

fn is_dash(ch: char) -> bool {
    matches!(ch, '─' | '-')
}

/// Splits a raw line into its indentation and its text. Returns `None` for
/// lines that hold nothing but whitespace and vertical glyphs.
pub(crate) fn lex(raw: &str) -> Option<Line<'_>> {
    let mut column = 0;
    let mut verticals = 0;
    let mut chars = raw.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let next_is_dash = chars.peek().is_some_and(|(_, next)| is_dash(*next));
        let is_connector = match ch {
            '├' | '└' => true,
            '|' | '`' | '+' => next_is_dash,
            _ => false,
        };

        if is_connector {
            let rest = &raw[offset + ch.len_utf8()..];
            let text = rest.trim_start_matches(is_dash).trim_start();
            return Some(Line {
                indent: Indent::Glyph { verticals, column },
                text,
            });
        }

        match ch {
            ' ' => column += 1,
            '\t' => column += TAB_WIDTH,
            ch if is_vertical(ch) => {
                verticals += 1;
                column += 1;
            }
            _ => {
                return Some(Line {
                    indent: Indent::Whitespace { columns: column },
                    text: &raw[offset..],
                });
            }
        }
    }

    None
}

/// Name, kind and annotation extracted from a line's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    /// Path segments; more than one when the line names a nested path like
    /// `src/utils/`. Never empty.
    pub segments: Vec<String>,
    /// Kind of the last segment, the others are always directories.
    pub kind: EntryKind,
    pub comment: Option<String>,
}

impl Entry {
    pub(crate) fn from_text(text: &str) -> Self {
        let (body, comment) = match text.split_once(COMMENT_MARKER) {
            Some((body, comment)) => (body, Some(comment.trim())),
            None => (text, None),
        };
        let comment = comment
            .filter(|comment| !comment.is_empty())
            .map(str::to_string);

        let body = body.trim();
        let (name, kind) = if let Some(name) = body.strip_suffix(SEPARATOR) {
            (name, Some(EntryKind::Directory))
        } else if let Some(name) = body.strip_suffix(FILE_MARKER) {
            (name, Some(EntryKind::File))
        } else {
            (body, None)
        };

        let segments = name
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect::<Vec<_>>();

        if segments.is_empty() {
            return Self::literal(text.trim(), comment);
        }

        let kind = kind.unwrap_or_else(|| guess_kind(segments.last().map_or("", String::as_str)));
        Self {
            segments,
            kind,
            comment,
        }
    }

    /// Fallback for lines without a usable name: the line itself becomes the
    /// name, minus separators.
    fn literal(text: &str, comment: Option<String>) -> Self {
        let name = text.replace(SEPARATOR, "");
        let name = if name.trim().is_empty() {
            "_".to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            kind: guess_kind(&name),
            segments: vec![name],
            comment,
        }
    }
}

/// A dot in the name means file, anything else is taken for a directory.
fn guess_kind(name: &str) -> EntryKind {
    if name.contains('.') {
        EntryKind::File
    } else {
        EntryKind::Directory
    }
}

/// Document model — a serialized resource file held as an ordered list of lines.

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document has no header line")]
    MissingHeader,
    #[error("header counter is not a number: '{0}'")]
    MalformedCounter(String),
    #[error("document lacks the type-identity declaration for '{0}'")]
    MissingTypeIdentity(String),
}

/// One document: its path and its text split into lines.
///
/// Each line's terminator is remembered so that `to_text` reproduces
/// untouched content byte for byte, mixed endings included. Lines added later
/// take the document's dominant ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub lines: Vec<String>,
    /// Terminator after each line; `""` for an unterminated last line.
    endings: Vec<&'static str>,
    line_ending: &'static str,
}

impl Document {
    pub fn load(path: &Path) -> Result<Document, DocumentError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Document {
        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for piece in text.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = piece.strip_suffix("\r\n") {
                (line, "\r\n")
            } else if let Some(line) = piece.strip_suffix('\n') {
                (line, "\n")
            } else {
                (piece, "")
            };
            lines.push(line.to_string());
            endings.push(ending);
        }

        let crlf = endings.iter().filter(|e| **e == "\r\n").count();
        let lf = endings.iter().filter(|e| **e == "\n").count();
        let line_ending = if crlf > lf { "\r\n" } else { "\n" };

        Document {
            path: path.into(),
            lines,
            endings,
            line_ending,
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let last = self.lines.len().saturating_sub(1);
        let trailing = self.endings.last().is_some_and(|e| !e.is_empty());
        for (i, line) in self.lines.iter().enumerate() {
            text.push_str(line);
            let ending = match self.endings.get(i) {
                Some(ending) if !ending.is_empty() => *ending,
                // Lines pushed straight onto `lines` follow the original's
                // final-newline choice.
                _ if i < last || trailing => self.line_ending,
                _ => "",
            };
            text.push_str(ending);
        }
        text
    }

    /// Splice `new_lines` in so that the first of them lands at `index`.
    pub fn insert_lines(&mut self, index: usize, new_lines: Vec<String>) {
        let index = index.min(self.lines.len());
        let count = new_lines.len();
        if count == 0 {
            return;
        }
        let mut endings = vec![self.line_ending; count];
        if index == self.endings.len() {
            // Appending after an unterminated last line: that line gains a
            // terminator and the new last line stays bare.
            if let Some(prev) = self.endings.last_mut() {
                if prev.is_empty() {
                    *prev = self.line_ending;
                    endings[count - 1] = "";
                }
            }
        }
        let at = index.min(self.endings.len());
        self.endings.splice(at..at, endings);
        self.lines.splice(index..index, new_lines);
    }

    /// Write the document back through a temporary file in the same
    /// directory, renamed over the original.
    pub fn save(&self) -> Result<(), DocumentError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(self.to_text().as_bytes())?;
        tmp.flush()?;
        // The temp file is created owner-only; keep the original's mode.
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// A bracketed section marker such as `[ext_resource type="Script" id="1_a"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl SectionTag {
    /// Parse a marker line. Quoted attribute values are unescaped; unquoted
    /// values (`load_steps=4`) are kept verbatim.
    pub fn parse(line: &str) -> Option<SectionTag> {
        let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
        let chars: Vec<char> = inner.chars().collect();
        let mut i = 0;

        let name: String = chars
            .iter()
            .take_while(|c| !c.is_whitespace())
            .collect();
        if name.is_empty() {
            return None;
        }
        i += name.chars().count();

        let mut attrs = Vec::new();
        loop {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i >= chars.len() {
                break;
            }

            let key_start = i;
            while i < chars.len() && chars[i] != '=' && !chars[i].is_whitespace() {
                i += 1;
            }
            let key: String = chars[key_start..i].iter().collect();
            if i >= chars.len() || chars[i] != '=' {
                // Bare word without a value
                attrs.push((key, String::new()));
                continue;
            }
            i += 1;

            let mut value = String::new();
            if i < chars.len() && chars[i] == '"' {
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        i += 1;
                    }
                    value.push(chars[i]);
                    i += 1;
                }
                i += 1;
            } else {
                while i < chars.len() && !chars[i].is_whitespace() {
                    value.push(chars[i]);
                    i += 1;
                }
            }
            attrs.push((key, value));
        }

        Some(SectionTag { name, attrs })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split a `key = value` line. Keys are identifier-like (letters, digits,
/// `_` and `/` for `metadata/...` keys); anything else is not a field.
pub fn parse_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(" = ")?;
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/')
    {
        return None;
    }
    Some((key, value.trim()))
}

/// Strip a string literal's quotes and escapes. `&"name"` string names are
/// accepted; unquoted values are returned trimmed.
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix('&').unwrap_or(value);
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

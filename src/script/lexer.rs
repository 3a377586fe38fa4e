use std::collections::BTreeMap;

/// One tokenized directive line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    /// Positional tokens in order; the first one is the command name.
    pub args: Vec<String>,
    /// `key:value` tokens. A later duplicate key replaces the earlier value.
    pub options: BTreeMap<String, String>,
}

impl ParsedLine {
    /// Command name, i.e. the first positional token.
    pub fn command(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Positional tokens after the command name.
    pub fn rest(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Split scene source into directive lines.
///
/// Newlines and `&` both separate directives. Blank lines and any line
/// containing `%%` are skipped.
pub fn source_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .trim()
        .split(['\r', '\n', '&'])
        .filter(|line| !line.trim().is_empty() && !line.contains("%%"))
}

/// Tokenize one line into positional arguments and options.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut out = ParsedLine::default();
    for token in tokenize(line) {
        match token.split_once(':') {
            Some(("", _)) => {
                tracing::trace!(token = %token, "dropping option token with empty key");
            }
            Some((key, value)) => {
                out.options.insert(key.to_owned(), value.to_owned());
            }
            None => out.args.push(token),
        }
    }
    out
}

/// Split a line into raw tokens.
///
/// `"..."` yields its inner text, `[...]` yields itself with brackets, and
/// anything else is a maximal run of non-whitespace. Quoted and bracketed
/// runs need a non-empty body and a closing delimiter, otherwise they fall
/// back to the plain rule.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0usize;

    while let Some(c) = line[i..].chars().next() {
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }

        if c == '"' {
            if let Some(end) = delimited_end(line, i + 1, '"') {
                out.push(line[i + 1..end].to_owned());
                i = end + 1;
                continue;
            }
        } else if c == '[' {
            if let Some(end) = delimited_end(line, i + 1, ']') {
                out.push(line[i..=end].to_owned());
                i = end + 1;
                continue;
            }
        }

        let end = line[i..]
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace())
            .map_or(line.len(), |(off, _)| i + off);
        out.push(line[i..end].to_owned());
        i = end;
    }

    out
}

/// Byte index of the first `close` at or after `start`, provided the body
/// between is non-empty.
fn delimited_end(line: &str, start: usize, close: char) -> Option<usize> {
    let off = line[start..].find(close)?;
    (off > 0).then_some(start + off)
}

#[cfg(test)]
#[path = "../../tests/unit/script/lexer.rs"]
mod tests;

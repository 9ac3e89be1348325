//! Printing the answer

use crate::error::{Error, IoError};
use std::io::Write;

/// Strip surrounding double quotes and decode backslash escapes.
///
/// A complete JSON string literal decodes to exactly its contents. Otherwise
/// the quotes are trimmed and the rest decoded when it is a valid escaped
/// string body, falling back to the trimmed text (raw newlines, bare quotes).
pub fn unquote(answer: &str) -> String {
    if let Ok(decoded) = serde_json::from_str::<String>(answer) {
        return decoded;
    }

    let stripped = answer.trim_matches('"');
    serde_json::from_str::<String>(&format!("\"{}\"", stripped))
        .unwrap_or_else(|_| stripped.to_string())
}

/// Write the unquoted answer followed by a newline
pub fn write<W: Write>(answer: &str, writer: &mut W) -> Result<(), Error> {
    writeln!(writer, "{}", unquote(answer))
        .and_then(|_| writer.flush())
        .map_err(|e| Error::Io(IoError::WriteFailed(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_quotes() {
        assert_eq!(unquote("\"42\""), "42");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(
            unquote(r#""line one\nline two\t\"quoted\" end""#),
            "line one\nline two\t\"quoted\" end"
        );
        assert_eq!(unquote(r"caf\u00e9"), "café");
    }

    #[test]
    fn test_raw_newlines_kept() {
        assert_eq!(unquote("first\nsecond"), "first\nsecond");
    }

    #[test]
    fn test_bare_inner_quotes_kept() {
        assert_eq!(unquote(r#"say "hi" now"#), r#"say "hi" now"#);
    }

    #[test]
    fn test_trailing_backslash_kept() {
        assert_eq!(unquote(r"C:\"), r"C:\");
    }

    #[test]
    fn test_string_literal_ending_in_quote() {
        assert_eq!(unquote(r#""she said \"no\"""#), r#"she said "no""#);
    }

    #[test]
    fn test_write_appends_newline() {
        let mut out = Vec::new();
        write("\"hello\\nworld\"", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello\nworld\n");
    }
}

//! Line marker parsing
//!
//! GCC and Clang annotate preprocessed output with lines of the form
//! `# <line> "<file>" <flags>`:
//!
//! - `1` - start of a new file
//! - `2` - returning to the previous file
//! - `3` - following text comes from a system header
//! - `4` - following text is wrapped in an implicit `extern "C"` block
//!
//! Lines are matched as bytes since preprocessed sources need not be UTF-8.

use regex::bytes::Regex;
use std::str;

/// Flags carried by a line marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerFlags {
    pub enter_file: bool,
    pub return_to_previous: bool,
    pub system_header: bool,
    pub implicit_extern_c: bool,
}

impl MarkerFlags {
    /// Build from the numeric flags of a marker; unknown numbers are ignored
    pub fn from_numbers<I: IntoIterator<Item = u32>>(numbers: I) -> Self {
        let mut flags = Self::default();
        for number in numbers {
            match number {
                1 => flags.enter_file = true,
                2 => flags.return_to_previous = true,
                3 => flags.system_header = true,
                4 => flags.implicit_extern_c = true,
                _ => {}
            }
        }
        flags
    }
}

/// A parsed line marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    /// Line number the following text starts at
    pub line_number: u64,
    /// File the following text comes from, decoded lossily
    pub filename: String,
    pub flags: MarkerFlags,
}

/// Line marker parser
pub struct MarkerParser {
    pattern: Regex,
}

impl MarkerParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r#"(?-u)^# (\d+) "([^"]+)"((?: \d+)*)$"#)
                .expect("line marker pattern is valid"),
        }
    }

    /// Parse a line, returning `None` for ordinary content
    pub fn parse(&self, line: &[u8]) -> Option<LineMarker> {
        let captures = self.pattern.captures(line)?;

        let line_number = str::from_utf8(&captures[1])
            .ok()
            .and_then(|n| n.parse().ok())
            .unwrap_or(u64::MAX);
        let filename = String::from_utf8_lossy(&captures[2]).into_owned();
        let flags = MarkerFlags::from_numbers(
            captures[3]
                .split(|&b| b == b' ')
                .filter_map(|n| str::from_utf8(n).ok()?.parse::<u32>().ok()),
        );

        Some(LineMarker {
            line_number,
            filename,
            flags,
        })
    }
}

impl Default for MarkerParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_with_flags() {
        let parser = MarkerParser::new();
        let marker = parser.parse(br#"# 1 "/usr/include/stdio.h" 1 3 4"#).unwrap();

        assert_eq!(marker.line_number, 1);
        assert_eq!(marker.filename, "/usr/include/stdio.h");
        assert!(marker.flags.enter_file);
        assert!(marker.flags.system_header);
        assert!(marker.flags.implicit_extern_c);
        assert!(!marker.flags.return_to_previous);
    }

    #[test]
    fn test_parse_marker_without_flags() {
        let parser = MarkerParser::new();
        let marker = parser.parse(br#"# 42 "test.c""#).unwrap();

        assert_eq!(marker.line_number, 42);
        assert_eq!(marker.filename, "test.c");
        assert_eq!(marker.flags, MarkerFlags::default());
    }

    #[test]
    fn test_non_markers() {
        let parser = MarkerParser::new();
        assert!(parser.parse(b"int main(void);").is_none());
        assert!(parser.parse(b"#include <stdio.h>").is_none());
        assert!(parser.parse(b"#pragma once").is_none());
        assert!(parser.parse(br#"#line 10 "a.c""#).is_none());
        assert!(parser.parse(br#"# 10 "a.c" 1 "#).is_none());
        assert!(parser.parse(br#"  # 10 "a.c" 1"#).is_none());
    }

    #[test]
    fn test_unknown_flags_ignored() {
        let parser = MarkerParser::new();
        let marker = parser.parse(br#"# 7 "<built-in>" 9"#).unwrap();
        assert_eq!(marker.filename, "<built-in>");
        assert_eq!(marker.flags, MarkerFlags::default());
    }
}

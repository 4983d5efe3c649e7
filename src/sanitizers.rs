//! Input sanitization functions
//!
//! This module provides functions to clean and neutralize raw string input
//! before it is validated and stored.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    /// SQL comment and statement-separator tokens
    static ref SQL_TOKENS: Regex = Regex::new(r"(;|--|/\*|\*/)").unwrap();

    /// Dangerous SQL keywords / stored-procedure prefixes.
    /// `execute` must come before `exec` so the longer match wins.
    static ref SQL_KEYWORDS: Regex =
        Regex::new(r"(?i)(xp_|sp_|execute|exec|drop|truncate)").unwrap();
}

/// Options for [`sanitize_string`].
///
/// The defaults are the strictest settings: trim, no newlines, HTML-escape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Trim leading/trailing whitespace.
    pub trim: bool,
    /// Preserve newline, tab, vertical-tab and form-feed characters.
    pub allow_newlines: bool,
    /// Escape `& < > " ' /` to HTML entities.
    pub escape_html: bool,
    /// Truncate to this many characters, applied after all other transforms.
    pub max_length: Option<usize>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            trim: true,
            allow_newlines: false,
            escape_html: true,
            max_length: None,
        }
    }
}

/// Clean a raw string: strip null bytes and control characters, trim,
/// HTML-escape, and enforce a maximum length, per [`SanitizeOptions`].
///
/// Total and idempotent under default options: sanitizing already-sanitized
/// input is a no-op because [`escape_html`] leaves existing entities alone.
/// With `max_length` set this no longer holds, since truncation runs last
/// and can split an emitted entity, leaving a bare `&` that a second pass
/// would re-escape.
pub fn sanitize_string(input: &str, options: &SanitizeOptions) -> String {
    let mut value = strip_control_chars(input, options.allow_newlines);

    if options.trim {
        value = value.trim().to_string();
    }

    if options.escape_html {
        value = escape_html(&value);
    }

    if let Some(max) = options.max_length {
        value = value.chars().take(max).collect();
    }

    value
}

/// Remove ASCII control characters (0x00-0x1F, 0x7F). Null bytes are always
/// removed; newline, tab, vertical-tab and form-feed survive only when
/// `allow_newlines` is set.
pub fn strip_control_chars(value: &str, allow_newlines: bool) -> String {
    value
        .chars()
        .filter(|c| {
            if *c == '\0' {
                return false;
            }
            if allow_newlines && matches!(c, '\n' | '\t' | '\u{000B}' | '\u{000C}') {
                return true;
            }
            !matches!(c, '\u{0001}'..='\u{001F}' | '\u{007F}')
        })
        .collect()
}

/// Escape `& < > " ' /` to HTML entities.
///
/// An ampersand that already begins one of the entities this function emits
/// is left untouched, so escaping is idempotent. The ampersand case is
/// handled first; every other replacement produces a leading `&` that must
/// not be re-escaped.
pub fn escape_html(value: &str) -> String {
    const ENTITY_TAILS: [&str; 6] = ["amp;", "lt;", "gt;", "quot;", "#x27;", "#x2F;"];

    let mut out = String::with_capacity(value.len());
    for (idx, c) in value.char_indices() {
        match c {
            '&' => {
                let tail = &value[idx + 1..];
                if ENTITY_TAILS.iter().any(|e| tail.starts_with(e)) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Trim leading and trailing whitespace from a string
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Trim a string in-place; empties collapse to `None`.
pub fn trim_optional(value: &mut Option<String>) {
    if let Some(ref mut s) = value {
        *s = s.trim().to_string();
        if s.is_empty() {
            *value = None;
        }
    }
}

/// Remove phone-number separator characters (space, dash, parens, dot).
pub fn strip_phone_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

/// Escape a string for inclusion in SQL text.
///
/// **Advisory only.** This is defense-in-depth, NOT a substitute for
/// parameterized queries: substring-stripping can be bypassed with nested
/// obfuscation (removing `DROP` from `DRDROPOP` in a single pass leaves
/// `DROP` behind). Every persistence access must still use prepared
/// statements; this function merely reduces blast radius when a raw string
/// leaks into SQL text anyway.
///
/// Single quotes are doubled; `;`, `--`, `/*`, `*/` and the keywords
/// `xp_`, `sp_`, `exec`, `execute`, `drop`, `truncate` are removed
/// case-insensitively.
pub fn sanitize_sql(input: &str) -> String {
    let escaped = input.replace('\'', "''");
    let no_tokens = SQL_TOKENS.replace_all(&escaped, "");
    SQL_KEYWORDS.replace_all(&no_tokens, "").to_string()
}

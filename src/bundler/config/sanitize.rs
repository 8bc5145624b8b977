//! Identifier and filename sanitization.

/// Reduces `raw` to ASCII letters, digits, `.` and `_`, lowercased.
///
/// Used for package/bundle identifiers and every app-name-derived name that
/// ends up in a generated descriptor or filesystem path. Idempotent.
///
/// ```
/// use swab::bundler::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("com.My-Company.app 2"), "com.mycompany.app2");
/// ```
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Replaces everything outside `[A-Za-z0-9_-]` with `_`.
///
/// Used for saved project filenames, which keep the app name's case.
pub fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Escapes text for inclusion in XML attribute or element content.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for inclusion inside a quoted Dart string literal.
pub fn escape_dart(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for inclusion inside a double-quoted YAML or Gradle string.
pub fn escape_double_quoted(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', " ")
}

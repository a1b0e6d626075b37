//! Identifier and string helpers shared by the resolver and the emitter.

use std::collections::HashSet;
use std::sync::LazyLock;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Check if a property name must be quoted in an object type or literal.
///
/// True when the name is empty, starts with something other than a letter,
/// `_` or `$`, or contains anything besides alphanumerics, `_` and `$`.
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether `name` can be used as a binding (`const name`, `import * as name`).
pub fn is_valid_identifier(name: &str) -> bool {
    !needs_bracket_notation(name) && !TS_RESERVED_WORDS.contains(name)
}

/// Escape a string for use in a double-quoted JavaScript string literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a property key if it is not a plain identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Turn rendered type text into a fragment usable inside a synthesized type
/// name: `[]` becomes `Array`, every other run of non-identifier characters
/// collapses to `_`.
pub fn identifier_fragment(text: &str) -> String {
    let text = text.replace("[]", "Array");
    let mut fragment = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            if pending_separator && !fragment.is_empty() {
                fragment.push('_');
            }
            pending_separator = false;
            fragment.push(c);
        } else {
            pending_separator = true;
        }
    }

    if fragment.is_empty() {
        "_".to_string()
    } else {
        fragment
    }
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! Identifier and naming helpers shared by extraction and emission.

/// A member name needs quotes unless it is an ASCII identifier (`$` and `_` allowed).
pub fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in a double-quoted TypeScript literal.
///
/// Control characters and line terminators are written as escapes, so the
/// literal always stays on one line.
pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}

/// Quote a property key if it is not a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Split an identifier into lowercase words.
///
/// Separators are `_`, `-`, `.` and spaces; a lowercase-to-uppercase
/// transition also starts a new word (`itemType` -> `item`, `type`).
fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in s.chars() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// `item_type` -> `ItemType`
pub fn pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize_first(w)).collect()
}

/// `item_type` -> `itemType`
pub fn camel_case(s: &str) -> String {
    let mut parts = words(s).into_iter();
    let Some(first) = parts.next() else {
        return String::new();
    };
    let mut out = first;
    for part in parts {
        out.push_str(&capitalize_first(&part));
    }
    out
}

/// `itemType` -> `item-type`
pub fn kebab_case(s: &str) -> String {
    words(s).join("-")
}

/// English plural of the last word of an identifier (`item_type` -> `item_types`).
///
/// Only the regular suffix rules are covered; resource names in practice are
/// regular nouns.
pub fn pluralize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    if lower.ends_with("ss")
        || lower.ends_with('x')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
        || lower.ends_with('z')
    {
        return format!("{s}es");
    }
    if lower.ends_with('s') {
        return s.to_string();
    }
    if let Some(stem) = s.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }
    format!("{s}s")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_quoting() {
        assert!(!needs_quoting("foo"));
        assert!(!needs_quoting("_foo"));
        assert!(!needs_quoting("$foo"));
        assert!(!needs_quoting("__itemTypeId"));

        assert!(needs_quoting(""));
        assert!(needs_quoting("123foo"));
        assert!(needs_quoting("foo-bar"));
        assert!(needs_quoting("foo.bar"));
        assert!(needs_quoting("foo:bar"));
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("foo-bar"), "\"foo-bar\"");
        assert_eq!(quote_if_needed("say\"hi"), "\"say\\\"hi\"");
        assert_eq!(quote_if_needed("two\nlines"), "\"two\\nlines\"");
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("a\\b"), "a\\\\b");
        assert_eq!(escape_js_string("tab\there\r\n"), "tab\\there\\r\\n");
        assert_eq!(escape_js_string("nul\0"), "nul\\u0000");
        assert_eq!(escape_js_string("sep\u{2028}"), "sep\\u2028");
        assert_eq!(escape_js_string("café"), "café");
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(pascal_case("item_type"), "ItemType");
        assert_eq!(pascal_case("instances"), "Instances");
        assert_eq!(pascal_case("sso-user"), "SsoUser");
        assert_eq!(camel_case("item_type_id"), "itemTypeId");
        assert_eq!(camel_case("foo_list"), "fooList");
        assert_eq!(camel_case("findMe"), "findMe");
        assert_eq!(kebab_case("item_type"), "item-type");
        assert_eq!(kebab_case("bulkDestroy"), "bulk-destroy");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("item"), "items");
        assert_eq!(pluralize("item_type"), "item_types");
        assert_eq!(pluralize("upload_category"), "upload_categories");
        assert_eq!(pluralize("access_token"), "access_tokens");
        assert_eq!(pluralize("search_index"), "search_indexes");
        assert_eq!(pluralize("day"), "days");
    }
}

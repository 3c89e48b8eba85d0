//! Escape, split, and join for colon-delimited permission strings
//!
//! Only the delimiter needs escaping inside a component: `:` becomes the
//! two-character sequence `\C`. Unescaping is lenient — an escape
//! introducer followed by anything other than `C` emits that character
//! literally, and a trailing introducer is dropped. The round-trip law
//! `join(split(s)) == s` holds for every well-formed permission string
//! (one whose components contain no bare `\`).

/// Separates permission components
pub const DELIMITER: char = ':';

const ESCAPE_INTRODUCER: char = '\\';
const ESCAPED_DELIMITER: char = 'C';

/// Escape one component so it can be embedded in a permission string
pub fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        if c == DELIMITER {
            escaped.push(ESCAPE_INTRODUCER);
            escaped.push(ESCAPED_DELIMITER);
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Unescape one component extracted from a permission string
///
/// Never fails: unknown escape sequences pass the escaped character
/// through literally.
pub fn unescape_component(component: &str) -> String {
    enum State {
        Normal,
        Escape,
    }

    let mut unescaped = String::with_capacity(component.len());
    let mut state = State::Normal;
    for c in component.chars() {
        match state {
            State::Normal => {
                if c == ESCAPE_INTRODUCER {
                    state = State::Escape;
                } else {
                    unescaped.push(c);
                }
            }
            State::Escape => {
                unescaped.push(if c == ESCAPED_DELIMITER { DELIMITER } else { c });
                state = State::Normal;
            }
        }
    }
    unescaped
}

/// Split a permission string into its unescaped components
///
/// Every `:` in a well-formed permission string is a delimiter (escaped
/// delimiters are two characters and contain no `:`), so a plain split
/// followed by per-component unescaping is exact.
pub fn split_permission(permission: &str) -> Vec<String> {
    permission
        .split(DELIMITER)
        .map(unescape_component)
        .collect()
}

/// Join components into a permission string, escaping each
pub fn join_permission<I, S>(components: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    components
        .into_iter()
        .map(|c| escape_component(c.as_ref()))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// All prefixes of a permission, most specific first
///
/// `driver:kv:get` yields `["driver:kv:get", "driver:kv", "driver"]`.
/// Used wherever a broader grant must cover a narrower permission.
pub fn parent_permissions(permission: &str) -> Vec<String> {
    let raw_components: Vec<&str> = permission.split(DELIMITER).collect();
    (1..=raw_components.len())
        .rev()
        .map(|len| raw_components[..len].join(&DELIMITER.to_string()))
        .collect()
}

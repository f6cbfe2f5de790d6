//! Key selection: literal and glob key specs over a decoded mapping.

use std::collections::{BTreeMap, BTreeSet};

use crate::ResolvedConfig;

/// Anchored glob match: `*` matches any run of characters, everything else is
/// literal. Keys are plain strings, not filesystem paths, so there are no
/// separator or `**` semantics.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let mut rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        // No '*' at all: exact match.
        return pattern == text;
    }
    let last = rest.pop().unwrap_or_default();

    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    for mid in rest {
        if mid.is_empty() {
            continue;
        }
        match remaining.find(mid) {
            Some(i) => remaining = &remaining[i + mid.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}

/// Apply a requested key-set to a decoded mapping.
///
/// `None` returns the mapping verbatim. Otherwise every spec, literal or glob,
/// goes through the same match path: collect matching keys, sort them
/// ascending by byte order, join the values with `separator`. Zero matches
/// yield an empty string (an absent literal key is not an error at this
/// layer), a single match yields the value verbatim. The output entry is
/// keyed by the spec string itself, not by the matched key(s).
pub fn select_keys(
    decoded: &BTreeMap<String, String>,
    requested: Option<&BTreeSet<String>>,
    separator: &str,
) -> ResolvedConfig {
    let Some(specs) = requested else {
        return decoded.clone();
    };

    let mut out = ResolvedConfig::new();
    for spec in specs {
        // BTreeMap iteration is already key-ascending, which is exactly the
        // deterministic order the join requires.
        let matched: Vec<&str> = decoded
            .iter()
            .filter(|(key, _)| glob_match(spec, key))
            .map(|(_, value)| value.as_str())
            .collect();
        out.insert(spec.clone(), matched.join(separator));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::glob_match;

    #[test]
    fn literal_patterns_match_exactly() {
        assert!(glob_match("app.cfg", "app.cfg"));
        assert!(!glob_match("app.cfg", "app.cfg2"));
        assert!(!glob_match("app.cfg", "xapp.cfg"));
        assert!(!glob_match("", "a"));
        assert!(glob_match("", ""));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("*.cfg", "app.cfg"));
        assert!(glob_match("*.cfg", ".cfg"));
        assert!(!glob_match("*.cfg", "app.cfg.bak"));
        assert!(glob_match("app.*", "app.properties"));
        assert!(glob_match("a*c", "abc"));
        assert!(glob_match("a*c", "ac"));
        assert!(!glob_match("a*c", "ab"));
    }

    #[test]
    fn multiple_stars() {
        assert!(glob_match("a*b*c", "aXbYc"));
        assert!(glob_match("a*b*c", "abc"));
        assert!(!glob_match("a*b*c", "acb"));
        assert!(glob_match("**", "anything"));
        // Tail anchor must not reuse bytes consumed by a middle literal.
        assert!(!glob_match("a*bb", "ab"));
        assert!(glob_match("a*b*b", "abb"));
    }
}

// src/rules/rule.rs

//! Single-field pattern rules
//!
//! A rule is written in one of three forms:
//!
//! - `foo` - matches exactly `foo`, rewrites it to itself
//! - `foo*` - `*` captures anything; the replacement puts the capture back
//! - `s/<regex>/<replacement>/` - explicit substitution, `$1`.. refer to groups
//!
//! Matching is anchored on the whole value. Rewriting replaces every
//! non-empty match, so `s/.*/debian/` turns `1.0` into `debian` once.

use super::RuleError;
use regex::Regex;
use std::fmt;

/// A compiled field rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Text the rule was compiled from
    source: String,
    /// Unanchored pattern used for substitution
    pattern: Regex,
    /// Same pattern anchored on both ends
    matcher: Regex,
    /// Replacement template in `regex` expansion syntax
    replacement: String,
    generic: bool,
}

impl Rule {
    /// Compile a rule from its textual form
    pub fn compile(spec: &str) -> Result<Self, RuleError> {
        let (pattern, replacement) = match spec.strip_prefix("s/") {
            Some(body) => {
                let mut parts = split_unescaped_slashes(body).into_iter();
                let pattern = parts.next().unwrap_or_default();
                if pattern.is_empty() {
                    return Err(RuleError::EmptySubstitution(spec.to_string()));
                }
                let replacement = parts.next().unwrap_or_default();
                (pattern, translate_replacement(&replacement))
            }
            None => (
                regex::escape(spec).replace(r"\*", "(.*)"),
                spec.replace('$', "$$").replace('*', "${1}"),
            ),
        };

        let compile = |text: &str| {
            Regex::new(text).map_err(|source| RuleError::InvalidPattern {
                pattern: spec.to_string(),
                source,
            })
        };

        Ok(Self {
            source: spec.to_string(),
            matcher: compile(&format!("^(?:{})$", pattern))?,
            generic: has_metacharacters(&pattern),
            pattern: compile(&pattern)?,
            replacement,
        })
    }

    /// Check a field value against this rule
    ///
    /// An absent value only matches generic rules.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match value {
            Some(value) => self.matcher.is_match(value),
            None => self.generic,
        }
    }

    /// Rewrite a field value
    pub fn apply(&self, value: Option<&str>) -> Option<String> {
        let value = value?;
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in self.pattern.captures_iter(value) {
            let Some(m) = caps.get(0) else { continue };
            if m.as_str().is_empty() {
                continue;
            }
            out.push_str(&value[last..m.start()]);
            caps.expand(&self.replacement, &mut out);
            last = m.end();
        }
        out.push_str(&value[last..]);
        Some(out)
    }

    /// True when the pattern can match more than one literal value
    pub fn is_generic(&self) -> bool {
        self.generic
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Rule {}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split `a/b/` on slashes that are not preceded by a backslash
fn split_unescaped_slashes(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('/') => current.push('/'),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            '/' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Convert a `$1`-style template into `regex` expansion syntax
///
/// `$N` becomes `${N}` so a following letter is not read as part of a group
/// name, `\$` is a literal dollar and a stray `$` stays literal.
fn translate_replacement(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            '$' => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                if digits.is_empty() {
                    out.push_str("$$");
                } else {
                    out.push_str("${");
                    out.push_str(&digits);
                    out.push('}');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Look for unescaped quantifiers, alternation, classes or `.`
fn has_metacharacters(pattern: &str) -> bool {
    let mut escaped = false;
    for c in pattern.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' | '?' | '+' | '*' | '|' | '.' => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rule() {
        let rule = Rule::compile("commons-io").unwrap();
        assert!(rule.matches(Some("commons-io")));
        assert!(!rule.matches(Some("commons-iox")));
        assert!(!rule.matches(None));
        assert!(!rule.is_generic());
        assert_eq!(rule.apply(Some("commons-io")).as_deref(), Some("commons-io"));
    }

    #[test]
    fn test_dots_are_literal() {
        let rule = Rule::compile("org.apache").unwrap();
        assert!(!rule.is_generic());
        assert!(!rule.matches(Some("orgXapache")));
    }

    #[test]
    fn test_wildcard_rule() {
        let rule = Rule::compile("1.2.*").unwrap();
        assert!(rule.is_generic());
        assert!(rule.matches(Some("1.2.3")));
        assert!(rule.matches(Some("1.2.")));
        assert!(!rule.matches(Some("1.3.0")));
        assert_eq!(rule.apply(Some("1.2.3")).as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_star_matches_null() {
        let rule = Rule::compile("*").unwrap();
        assert!(rule.matches(None));
        assert!(rule.matches(Some("")));
        assert_eq!(rule.apply(Some("2.0")).as_deref(), Some("2.0"));
        assert_eq!(rule.apply(None), None);
    }

    #[test]
    fn test_substitution_rule() {
        let rule = Rule::compile("s/.*/debian/").unwrap();
        assert!(rule.is_generic());
        assert_eq!(rule.apply(Some("1.0")).as_deref(), Some("debian"));
        assert_eq!(rule.apply(Some("")).as_deref(), Some(""));
    }

    #[test]
    fn test_substitution_with_groups() {
        let rule = Rule::compile(r"s/(\d+)\..*/$1.x/").unwrap();
        assert_eq!(rule.apply(Some("3.2.1")).as_deref(), Some("3.x"));
        assert!(rule.matches(Some("3.2.1")));
        assert!(!rule.matches(Some("abc")));
    }

    #[test]
    fn test_group_followed_by_letter() {
        let rule = Rule::compile(r"s/(\d+)/$1a/").unwrap();
        assert_eq!(rule.apply(Some("7")).as_deref(), Some("7a"));
    }

    #[test]
    fn test_substitution_without_replacement() {
        let rule = Rule::compile("s/-SNAPSHOT//").unwrap();
        assert_eq!(rule.apply(Some("1.0-SNAPSHOT")).as_deref(), Some("1.0"));
    }

    #[test]
    fn test_escaped_slash_in_substitution() {
        let rule = Rule::compile(r"s/a\/b/c/").unwrap();
        assert_eq!(rule.apply(Some("a/b")).as_deref(), Some("c"));
    }

    #[test]
    fn test_empty_substitution_rejected() {
        assert!(matches!(Rule::compile("s//x/"), Err(RuleError::EmptySubstitution(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        assert!(matches!(Rule::compile("s/(/x/"), Err(RuleError::InvalidPattern { .. })));
    }

    #[test]
    fn test_translate_replacement() {
        assert_eq!(translate_replacement("$1.x"), "${1}.x");
        assert_eq!(translate_replacement(r"\$1"), "$$1");
        assert_eq!(translate_replacement("a$"), "a$$");
    }

    #[test]
    fn test_has_metacharacters() {
        assert!(has_metacharacters("a|b"));
        assert!(has_metacharacters("[ab]"));
        assert!(!has_metacharacters(r"a\.b"));
        assert!(!has_metacharacters("abc"));
    }
}

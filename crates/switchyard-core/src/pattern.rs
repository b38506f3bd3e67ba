//! Route pattern compilation
//!
//! Patterns are literal path text plus `{name}` placeholders:
//!
//! - `blog` - Static path
//! - `blog/{slug}` - Single parameter
//! - `blog/{year}/{month}/{slug}` - Multiple parameters
//! - `files/{name}.{ext}` - Parameters sharing a segment with literals
//!
//! Each placeholder matches one or more characters other than `/`. Everything
//! else is matched literally and the compiled matcher is anchored at both
//! ends, so a pattern never matches a prefix of a path.
//!
//! Malformed patterns are rejected with a [`RouteError`] when the route is
//! registered.

use crate::error::RouteError;
use regex::{Regex, RegexBuilder};

/// Maximum allowed size for a compiled route matcher (in bytes).
const MAX_PATTERN_REGEX_SIZE: usize = 1 << 20;

/// A compiled route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a normalized pattern (no leading or trailing `/`).
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for unbalanced or nested braces, empty,
    /// invalid or duplicate parameter names, and placeholders that are not
    /// separated by literal text.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let (regex_src, param_names) = compile(pattern)?;
        let regex = RegexBuilder::new(&regex_src)
            .size_limit(MAX_PATTERN_REGEX_SIZE)
            .build()
            .map_err(|e| RouteError::Compile {
                pattern: pattern.to_string(),
                details: e.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// The pattern text this matcher was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parameter names in left-to-right order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a whole normalized path.
    ///
    /// Returns the captured values paired with their parameter names, in
    /// parameter order.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let caps = self.regex.captures(path)?;
        // Group 0 is the whole match; groups 1.. line up with param_names.
        let values = self
            .param_names
            .iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, group)| group.map(|m| (name.as_str(), m.as_str())))
            .collect();
        Some(values)
    }

    /// Check whether the pattern matches the whole path
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Translate a pattern into regex source and its ordered parameter names.
fn compile(pattern: &str) -> Result<(String, Vec<String>), RouteError> {
    let mut regex_src = String::from("^");
    let mut param_names: Vec<String> = Vec::new();
    let mut literal = String::new();
    let mut param_start: Option<usize> = None;
    // Set while the last thing emitted was a placeholder and no literal followed.
    let mut after_param = false;

    for (i, ch) in pattern.char_indices() {
        match ch {
            '{' => {
                if param_start.is_some() {
                    return Err(RouteError::NestedBraces {
                        pattern: pattern.to_string(),
                        position: i,
                    });
                }
                if !literal.is_empty() {
                    regex_src.push_str(&regex::escape(&literal));
                    literal.clear();
                    after_param = false;
                }
                param_start = Some(i);
            }
            '}' => {
                let start = param_start.take().ok_or_else(|| RouteError::UnmatchedClosingBrace {
                    pattern: pattern.to_string(),
                    position: i,
                })?;
                let name = &pattern[start + 1..i];
                validate_param_name(pattern, name, start, &param_names)?;

                if after_param {
                    return Err(RouteError::AdjacentParameters {
                        pattern: pattern.to_string(),
                        first: param_names.last().cloned().unwrap_or_default(),
                        second: name.to_string(),
                    });
                }

                regex_src.push_str("([^/]+)");
                param_names.push(name.to_string());
                after_param = true;
            }
            _ if param_start.is_none() => literal.push(ch),
            _ => {}
        }
    }

    if param_start.is_some() {
        return Err(RouteError::UnclosedBrace {
            pattern: pattern.to_string(),
        });
    }

    regex_src.push_str(&regex::escape(&literal));
    regex_src.push('$');
    Ok((regex_src, param_names))
}

fn validate_param_name(
    pattern: &str,
    name: &str,
    position: usize,
    seen: &[String],
) -> Result<(), RouteError> {
    if name.is_empty() {
        return Err(RouteError::EmptyParameterName {
            pattern: pattern.to_string(),
            position,
        });
    }
    let starts_with_digit = name.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false);
    if starts_with_digit || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RouteError::InvalidParameterName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    if seen.iter().any(|existing| existing == name) {
        return Err(RouteError::DuplicateParameterName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parameters_in_order() {
        let pattern = RoutePattern::parse("blog/{year}/{month}/{slug}").unwrap();
        assert_eq!(pattern.param_names(), ["year", "month", "slug"]);

        let caps = pattern.captures("blog/2024/01/new-year").unwrap();
        assert_eq!(caps, vec![("year", "2024"), ("month", "01"), ("slug", "new-year")]);
    }

    #[test]
    fn test_full_path_anchoring() {
        let pattern = RoutePattern::parse("users/{id}").unwrap();
        assert!(pattern.is_match("users/42"));
        assert!(!pattern.is_match("users/42/posts"));
        assert!(!pattern.is_match("api/users/42"));
        assert!(!pattern.is_match("users/"));
    }

    #[test]
    fn test_placeholder_does_not_cross_slash() {
        let pattern = RoutePattern::parse("files/{name}").unwrap();
        assert!(!pattern.is_match("files/a/b"));
    }

    #[test]
    fn test_literals_are_not_regex() {
        let pattern = RoutePattern::parse("feed.xml").unwrap();
        assert!(pattern.is_match("feed.xml"));
        assert!(!pattern.is_match("feedaxml"));

        let pattern = RoutePattern::parse("c++/(draft)").unwrap();
        assert!(pattern.is_match("c++/(draft)"));
    }

    #[test]
    fn test_parameter_sharing_a_segment() {
        let pattern = RoutePattern::parse("files/{name}.{ext}").unwrap();
        let caps = pattern.captures("files/report.final.pdf").unwrap();
        assert_eq!(caps, vec![("name", "report.final"), ("ext", "pdf")]);
    }

    #[test]
    fn test_unclosed_brace() {
        assert!(matches!(
            RoutePattern::parse("users/{id"),
            Err(RouteError::UnclosedBrace { .. })
        ));
    }

    #[test]
    fn test_unmatched_closing_brace() {
        assert!(matches!(
            RoutePattern::parse("users/id}"),
            Err(RouteError::UnmatchedClosingBrace { .. })
        ));
    }

    #[test]
    fn test_nested_braces() {
        assert!(matches!(
            RoutePattern::parse("users/{{id}}"),
            Err(RouteError::NestedBraces { .. })
        ));
    }

    #[test]
    fn test_empty_parameter_name() {
        assert!(matches!(
            RoutePattern::parse("users/{}"),
            Err(RouteError::EmptyParameterName { .. })
        ));
    }

    #[test]
    fn test_invalid_parameter_names() {
        for pattern in ["users/{1id}", "users/{id-name}", "users/{id name}"] {
            assert!(
                matches!(RoutePattern::parse(pattern), Err(RouteError::InvalidParameterName { .. })),
                "{pattern} should be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_parameter_names() {
        assert!(matches!(
            RoutePattern::parse("a/{id}/b/{id}"),
            Err(RouteError::DuplicateParameterName { .. })
        ));
    }

    #[test]
    fn test_adjacent_parameters() {
        assert!(matches!(
            RoutePattern::parse("{a}{b}"),
            Err(RouteError::AdjacentParameters { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_static_patterns_match_only_themselves(
            segments in prop::collection::vec("[a-z][a-z0-9_.-]{0,8}", 1..4),
            extra in "[a-z]{1,4}",
        ) {
            let path = segments.join("/");
            let pattern = RoutePattern::parse(&path).unwrap();
            prop_assert!(pattern.is_match(&path));
            let longer = format!("{}/{}", path, extra);
            prop_assert!(!pattern.is_match(&longer));
        }

        #[test]
        fn prop_every_parameter_captures_its_segment(
            values in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..5),
        ) {
            let pattern_src = (0..values.len())
                .map(|i| format!("{{p{}}}", i))
                .collect::<Vec<_>>()
                .join("/");
            let pattern = RoutePattern::parse(&pattern_src).unwrap();
            let path = values.join("/");
            let caps = pattern.captures(&path).unwrap();
            let captured: Vec<&str> = caps.iter().map(|(_, v)| *v).collect();
            let expected: Vec<&str> = values.iter().map(String::as_str).collect();
            prop_assert_eq!(captured, expected);
        }
    }
}

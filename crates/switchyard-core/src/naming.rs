//! Segment to type-name conversion
//!
//! URL segments are kebab- or snake-cased (`unknown-path`, `blog_post`),
//! controller names are PascalCase (`UnknownPath`, `BlogPost`) and action
//! names are snake_case (`post_create_item`).

/// Convert a path segment into a PascalCase name.
///
/// `-`, `_` and spaces separate words. Each word gets its first character
/// uppercased, the rest is kept as written, and the words are joined.
///
/// ```
/// use switchyard_core::naming::pascal_case;
///
/// assert_eq!(pascal_case("unknown-path"), "UnknownPath");
/// assert_eq!(pascal_case("blog_post"), "BlogPost");
/// assert_eq!(pascal_case("sample"), "Sample");
/// ```
pub fn pascal_case(segment: &str) -> String {
    let mut name = String::with_capacity(segment.len());
    for word in segment.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

/// Convert a path segment into a snake_case action name.
///
/// `-` and spaces become `_` and the result is lowercased.
///
/// ```
/// use switchyard_core::naming::snake_case;
///
/// assert_eq!(snake_case("Create-Item"), "create_item");
/// ```
pub fn snake_case(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pascal_case_words() {
        assert_eq!(pascal_case("unknown-path"), "UnknownPath");
        assert_eq!(pascal_case("user_profile"), "UserProfile");
        assert_eq!(pascal_case("two words"), "TwoWords");
        assert_eq!(pascal_case("mixed-snake_case"), "MixedSnakeCase");
    }

    #[test]
    fn test_pascal_case_keeps_inner_case() {
        assert_eq!(pascal_case("blogPost"), "BlogPost");
        assert_eq!(pascal_case("api"), "Api");
    }

    #[test]
    fn test_pascal_case_skips_empty_words() {
        assert_eq!(pascal_case("--a__b--"), "AB");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("create"), "create");
        assert_eq!(snake_case("Create-Item"), "create_item");
        assert_eq!(snake_case("bulk update"), "bulk_update");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    proptest! {
        #[test]
        fn prop_pascal_case_has_no_separators(segment in "[a-z_ -]{0,24}") {
            let name = pascal_case(&segment);
            prop_assert!(!name.contains(['-', '_', ' ']));
        }

        #[test]
        fn prop_snake_case_is_idempotent(segment in "[a-zA-Z0-9_ -]{0,24}") {
            let once = snake_case(&segment);
            prop_assert_eq!(snake_case(&once), once.clone());
        }
    }
}

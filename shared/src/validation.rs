//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Email syntax checks come from the `validator` crate; tag syntax uses a
//! small regex.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use validator::ValidateEmail;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_POST_TEXT_LEN: usize = 10_000;
pub const MAX_COMMENT_LEN: usize = 2_000;
pub const MAX_TAGS: usize = 10;

/// File extensions accepted for post images and profile pictures
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _-]{0,31}$").expect("tag pattern compiles"));

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password length, counted in characters
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a post title
pub fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err("Title too long".to_string());
    }
    Ok(())
}

/// Validate the body of a post
pub fn validate_post_text(text: &str) -> Result<(), String> {
    validate_body(text, MAX_POST_TEXT_LEN, "Post text")
}

/// Validate the body of a comment
pub fn validate_comment_text(text: &str) -> Result<(), String> {
    validate_body(text, MAX_COMMENT_LEN, "Comment")
}

fn validate_body(text: &str, max: usize, what: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err(format!("{} cannot be empty", what));
    }
    if text.chars().count() > max {
        return Err(format!("{} too long", what));
    }
    Ok(())
}

/// Split a comma separated tag list.
///
/// Blank entries are dropped and duplicates collapse to their first
/// occurrence.
pub fn parse_tags(raw: &str) -> Result<Vec<String>, String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !TAG_RE.is_match(tag) {
            return Err(format!("Invalid tag: {}", tag));
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.len() > MAX_TAGS {
        return Err(format!("At most {} tags are allowed", MAX_TAGS));
    }
    Ok(tags)
}

/// Lowercased image extension of `filename`, if it is an allowed one
pub fn image_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("spaces in@email.com").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(300))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Five two-byte characters: ten bytes, still too short
        assert!(validate_password("ñññññ").is_err());
        assert!(validate_password("ññññññññ").is_ok());
        // 128 characters but 256 bytes is within the limit
        assert!(validate_password(&"é".repeat(128)).is_ok());
        assert!(validate_password(&"é".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_title_and_text() {
        assert!(validate_title("Aphids on my tomatoes").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"t".repeat(MAX_TITLE_LEN + 1)).is_err());
        assert!(validate_post_text("What should I spray?").is_ok());
        assert!(validate_post_text("").is_err());
        assert!(validate_comment_text("Try neem oil").is_ok());
        assert!(validate_comment_text("\n\t").is_err());
        assert!(validate_comment_text(&"c".repeat(MAX_COMMENT_LEN + 1)).is_err());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("tomato, aphids ,, pests").unwrap(),
            vec!["tomato", "aphids", "pests"]
        );
        assert_eq!(parse_tags("roses,roses").unwrap(), vec!["roses"]);
        assert!(parse_tags("").unwrap().is_empty());
        assert!(parse_tags("<script>").is_err());
        let many = (0..=MAX_TAGS).map(|i| format!("t{}", i)).collect::<Vec<_>>().join(",");
        assert!(parse_tags(&many).is_err());
    }

    #[rstest]
    #[case("leaf.png", Some("png"))]
    #[case("LEAF.JPG", Some("jpg"))]
    #[case("archive.tar.gif", Some("gif"))]
    #[case("photo.jpeg", Some("jpeg"))]
    #[case("notes.txt", None)]
    #[case("noextension", None)]
    #[case("trailingdot.", None)]
    fn test_image_extension(#[case] filename: &str, #[case] expected: Option<&str>) {
        assert_eq!(image_extension(filename).as_deref(), expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_parsed_tags_are_trimmed_and_unique(raw in "[a-z ,]{0,80}") {
            if let Ok(tags) = parse_tags(&raw) {
                for tag in &tags {
                    prop_assert_eq!(tag.trim(), tag.as_str());
                    prop_assert!(!tag.is_empty());
                }
                let mut deduped = tags.clone();
                deduped.dedup();
                prop_assert_eq!(deduped.len(), tags.len());
            }
        }
    }
}

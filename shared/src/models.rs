//! Domain models shared between the backend and its clients

use serde::{Deserialize, Serialize};
use std::fmt;

/// Post category chosen by the author.
///
/// Question posts are answered by the AI responder when they are created;
/// discussion posts are left to other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Question,
    Discussion,
}

impl PostCategory {
    /// Stable lowercase name, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Question => "question",
            PostCategory::Discussion => "discussion",
        }
    }

    /// Whether posts in this category get an AI-generated answer
    #[inline]
    pub fn wants_ai_response(&self) -> bool {
        matches!(self, PostCategory::Question)
    }
}

impl fmt::Display for PostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "question" => Ok(PostCategory::Question),
            "discussion" => Ok(PostCategory::Discussion),
            _ => Err(format!("Unknown post category: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("question", PostCategory::Question)]
    #[case("Question", PostCategory::Question)]
    #[case(" discussion ", PostCategory::Discussion)]
    #[case("DISCUSSION", PostCategory::Discussion)]
    fn test_category_parses(#[case] raw: &str, #[case] expected: PostCategory) {
        assert_eq!(raw.parse::<PostCategory>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!("rant".parse::<PostCategory>().is_err());
        assert!("".parse::<PostCategory>().is_err());
    }

    #[test]
    fn test_only_questions_want_ai() {
        assert!(PostCategory::Question.wants_ai_response());
        assert!(!PostCategory::Discussion.wants_ai_response());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for category in [PostCategory::Question, PostCategory::Discussion] {
            assert_eq!(category.to_string().parse::<PostCategory>().unwrap(), category);
        }
    }
}

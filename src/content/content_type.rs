use fmt::Display;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    BlogPost,
    Book,
    Podcast,
    Video,
    AiPrompt,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::BlogPost => "blog_post",
            ContentType::Book => "book",
            ContentType::Podcast => "podcast",
            ContentType::Video => "video",
            ContentType::AiPrompt => "ai_prompt",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepts the stored names plus the names the site pages use
/// (`article` and `prompt`).
impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blog_post" | "article" => Ok(ContentType::BlogPost),
            "book" => Ok(ContentType::Book),
            "podcast" => Ok(ContentType::Podcast),
            "video" => Ok(ContentType::Video),
            "ai_prompt" | "prompt" => Ok(ContentType::AiPrompt),
            other => Err(format!("Unknown content type {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }
}

impl Display for ContentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            other => Err(format!("Unknown content status {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_aliases() {
        assert_eq!("article".parse::<ContentType>(), Ok(ContentType::BlogPost));
        assert_eq!("prompt".parse::<ContentType>(), Ok(ContentType::AiPrompt));
        assert_eq!("Podcast".parse::<ContentType>(), Ok(ContentType::Podcast));
        assert!("newsletter".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ContentType::AiPrompt).unwrap();
        assert_eq!(json, "\"ai_prompt\"");
        let status: ContentStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, ContentStatus::Archived);
    }
}

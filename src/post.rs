use fmt::Display;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PostType {
    Insight,
    Research,
    #[serde(rename = "Build Log")]
    BuildLog,
    Reflection,
    Essay,
}

impl PostType {
    pub const ALL: [PostType; 5] = [
        PostType::Insight,
        PostType::Research,
        PostType::BuildLog,
        PostType::Reflection,
        PostType::Essay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Insight => "Insight",
            PostType::Research => "Research",
            PostType::BuildLog => "Build Log",
            PostType::Reflection => "Reflection",
            PostType::Essay => "Essay",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TopicCategory {
    Culture,
    History,
    Tech,
    Design,
    Health,
    Psychology,
    Personal,
    Philosophy,
}

impl TopicCategory {
    pub const ALL: [TopicCategory; 8] = [
        TopicCategory::Culture,
        TopicCategory::History,
        TopicCategory::Tech,
        TopicCategory::Design,
        TopicCategory::Health,
        TopicCategory::Psychology,
        TopicCategory::Personal,
        TopicCategory::Philosophy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicCategory::Culture => "Culture",
            TopicCategory::History => "History",
            TopicCategory::Tech => "Tech",
            TopicCategory::Design => "Design",
            TopicCategory::Health => "Health",
            TopicCategory::Psychology => "Psychology",
            TopicCategory::Personal => "Personal",
            TopicCategory::Philosophy => "Philosophy",
        }
    }
}

impl Display for PostType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for TopicCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostType::ALL.iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown post type {}", s))
    }
}

impl FromStr for TopicCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TopicCategory::ALL.iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown topic category {}", s))
    }
}

/// A post joined with its tags, as handed to readers.
/// Fields are serialized in camelCase, which is also the shape of the fallback snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub post_types: Vec<PostType>,
    #[serde(default)]
    pub topic_categories: Vec<TopicCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Display for BlogPost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.post_types.iter().map(|t| t.as_str()).collect();
        let topics: Vec<&str> = self.topic_categories.iter().map(|t| t.as_str()).collect();
        write!(f, "id={}, date={}, read_time={}\ntitle={}\ntypes=[{}], topics=[{}]\n{}",
               self.id,
               self.date,
               self.read_time,
               self.title,
               types.join(", "),
               topics.join(", "),
               self.excerpt
        )
    }
}

/// Row of the `blog_posts` table
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Row of the `blog_post_types` table
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostTypeRow {
    pub post_id: String,
    pub post_type: PostType,
}

/// Row of the `blog_post_topics` table
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TopicRow {
    pub post_id: String,
    pub topic_category: TopicCategory,
}

#[cfg(test)]
mod tests {
    use crate::test_data::SNAPSHOT_DATA;
    use super::*;

    #[test]
    fn test_parse_enums() {
        assert_eq!("Build Log".parse::<PostType>(), Ok(PostType::BuildLog));
        assert_eq!("Philosophy".parse::<TopicCategory>(), Ok(TopicCategory::Philosophy));
        assert!("build log".parse::<PostType>().is_err());
        assert!("Cooking".parse::<TopicCategory>().is_err());
    }

    #[test]
    fn test_snapshot_shape() {
        let posts: Vec<BlogPost> = serde_json::from_str(SNAPSHOT_DATA).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].read_time, "6 min read");
        assert_eq!(posts[0].post_types, vec![PostType::Essay, PostType::Reflection]);
        assert_eq!(posts[1].cover_image, None);
        assert!(posts[2].topic_categories.is_empty());
    }

    #[test]
    fn test_serialize_camel_case() {
        let post = BlogPost {
            id: "1".to_string(),
            title: "Notes".to_string(),
            excerpt: "".to_string(),
            content: "".to_string(),
            date: "2025-01-01".to_string(),
            read_time: "1 min read".to_string(),
            post_types: vec![PostType::BuildLog],
            topic_categories: vec![],
            cover_image: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["readTime"], "1 min read");
        assert_eq!(json["postTypes"][0], "Build Log");
        assert!(json.get("coverImage").is_none());
    }

    #[test]
    fn test_raw_row() {
        let row: RawPost = serde_json::from_str(r#"{"id":"a1","title":"T","excerpt":"E","content":"<p>C</p>","date":"2025-03-01","read_time":"4 min read","cover_image":null,"created_at":"2025-03-01T10:00:00+00:00"}"#).unwrap();
        assert_eq!(row.read_time, "4 min read");
        assert_eq!(row.cover_image, None);
    }
}

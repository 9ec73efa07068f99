use serde::Serialize;

use crate::post::{BlogPost, PostType, TopicCategory};

/// Search text, post types and topic categories requested by a reader.
/// Empty fields do not exclude anything.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub search: Option<String>,
    pub post_types: Vec<PostType>,
    pub topic_categories: Vec<TopicCategory>,
}

impl PostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: &str) -> Self {
        self.search = Some(query.to_string());
        self
    }

    pub fn post_types(mut self, types: &[PostType]) -> Self {
        self.post_types = types.to_vec();
        self
    }

    pub fn topics(mut self, topics: &[TopicCategory]) -> Self {
        self.topic_categories = topics.to_vec();
        self
    }

    fn search_text(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.search_text().is_none() && self.post_types.is_empty() && self.topic_categories.is_empty()
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        if let Some(query) = self.search_text() {
            if !post.title.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }

        if !self.post_types.is_empty()
            && !self.post_types.iter().any(|t| post.post_types.contains(t)) {
            return false;
        }

        if !self.topic_categories.is_empty()
            && !self.topic_categories.iter().any(|c| post.topic_categories.contains(c)) {
            return false;
        }

        true
    }

    /// Keeps the matching posts in their input order
    pub fn apply(&self, posts: &[BlogPost]) -> Vec<BlogPost> {
        posts.iter()
            .filter(|post| self.matches(post))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, title: &str, types: &[PostType], topics: &[TopicCategory]) -> BlogPost {
        BlogPost {
            id: id.to_string(),
            title: title.to_string(),
            excerpt: "silent excerpt".to_string(),
            content: "silent content".to_string(),
            date: "2025-01-01".to_string(),
            read_time: "3 min read".to_string(),
            post_types: types.to_vec(),
            topic_categories: topics.to_vec(),
            cover_image: None,
        }
    }

    fn ids(posts: &[BlogPost]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    fn sample() -> Vec<BlogPost> {
        vec![
            post("insight", "On Compounding", &[PostType::Insight], &[TopicCategory::Personal]),
            post("research", "Silent Wealth in History", &[PostType::Research], &[TopicCategory::Tech, TopicCategory::History]),
            post("both", "Build Notes", &[PostType::Insight, PostType::BuildLog], &[TopicCategory::Tech]),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let posts = sample();
        assert!(PostFilter::new().is_empty());
        assert!(PostFilter::new().search("").is_empty());
        assert_eq!(ids(&PostFilter::new().apply(&posts)), ["insight", "research", "both"]);
    }

    #[test]
    fn test_post_types_or() {
        let posts = sample();
        let filter = PostFilter::new().post_types(&[PostType::Insight, PostType::Research]);
        assert_eq!(ids(&filter.apply(&posts)), ["insight", "research", "both"]);

        let filter = PostFilter::new().post_types(&[PostType::Insight]);
        assert_eq!(ids(&filter.apply(&posts)), ["insight", "both"]);

        let filter = PostFilter::new().post_types(&[PostType::Essay]);
        assert!(filter.apply(&posts).is_empty());
    }

    #[test]
    fn test_types_and_topics_compose_with_and() {
        let posts = sample();
        let filter = PostFilter::new()
            .post_types(&[PostType::Insight, PostType::Research])
            .topics(&[TopicCategory::Tech]);
        assert_eq!(ids(&filter.apply(&posts)), ["research", "both"]);

        let filter = PostFilter::new()
            .post_types(&[PostType::Insight])
            .topics(&[TopicCategory::History, TopicCategory::Personal]);
        assert_eq!(ids(&filter.apply(&posts)), ["insight"]);
    }

    #[test]
    fn test_search_title_only_case_insensitive() {
        let posts = sample();
        assert_eq!(ids(&PostFilter::new().search("SILENT").apply(&posts)), ["research"]);
        assert_eq!(ids(&PostFilter::new().search("notes").apply(&posts)), ["both"]);
        // excerpt and content are never searched
        assert!(PostFilter::new().search("excerpt").apply(&posts).is_empty());

        let filter = PostFilter::new().search("o").topics(&[TopicCategory::Tech]);
        assert_eq!(ids(&filter.apply(&posts)), ["research", "both"]);
    }
}

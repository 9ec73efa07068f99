use crate::post::{BlogPost, PostTypeRow, RawPost, TopicRow};

/// Joins raw posts with their tag rows. Output order follows `posts`.
pub fn assemble(posts: Vec<RawPost>, post_types: &[PostTypeRow], topics: &[TopicRow]) -> Vec<BlogPost> {
    posts.into_iter()
        .map(|post| assemble_one(post, post_types, topics))
        .collect()
}

pub fn assemble_one(post: RawPost, post_types: &[PostTypeRow], topics: &[TopicRow]) -> BlogPost {
    let types = post_types.iter()
        .filter(|row| row.post_id == post.id)
        .map(|row| row.post_type)
        .collect();

    let topic_categories = topics.iter()
        .filter(|row| row.post_id == post.id)
        .map(|row| row.topic_category)
        .collect();

    BlogPost {
        id: post.id,
        title: post.title,
        excerpt: post.excerpt,
        content: post.content,
        date: post.date,
        read_time: post.read_time,
        post_types: types,
        topic_categories,
        cover_image: post.cover_image,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::post::{PostType, TopicCategory};
    use super::*;

    pub(crate) fn raw_post(id: &str, title: &str, date: &str) -> RawPost {
        RawPost {
            id: id.to_string(),
            title: title.to_string(),
            excerpt: format!("About {}", title),
            content: format!("<p>{}</p>", title),
            date: date.to_string(),
            read_time: "5 min read".to_string(),
            cover_image: None,
            created_at: None,
        }
    }

    pub(crate) fn type_row(post_id: &str, post_type: PostType) -> PostTypeRow {
        PostTypeRow { post_id: post_id.to_string(), post_type }
    }

    pub(crate) fn topic_row(post_id: &str, topic_category: TopicCategory) -> TopicRow {
        TopicRow { post_id: post_id.to_string(), topic_category }
    }

    #[test]
    fn test_join_tags_by_post_id() {
        let posts = vec![
            raw_post("a", "First", "2025-01-01"),
            raw_post("b", "Second", "2025-02-01"),
            raw_post("c", "Untagged", "2025-03-01"),
        ];
        let types = vec![
            type_row("a", PostType::Insight),
            type_row("b", PostType::Research),
            type_row("a", PostType::Essay),
            type_row("zzz", PostType::Reflection),
        ];
        let topics = vec![
            topic_row("b", TopicCategory::Tech),
            topic_row("b", TopicCategory::Design),
        ];

        let assembled = assemble(posts, &types, &topics);
        let ids: Vec<&str> = assembled.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        assert_eq!(assembled[0].post_types, vec![PostType::Insight, PostType::Essay]);
        assert!(assembled[0].topic_categories.is_empty());
        assert_eq!(assembled[1].post_types, vec![PostType::Research]);
        assert_eq!(assembled[1].topic_categories, vec![TopicCategory::Tech, TopicCategory::Design]);
        assert!(assembled[2].post_types.is_empty());
        assert!(assembled[2].topic_categories.is_empty());
    }

    #[test]
    fn test_field_mapping() {
        let mut raw = raw_post("a", "First", "2025-01-01");
        raw.read_time = "7 min read".to_string();
        raw.cover_image = Some("covers/first.png".to_string());

        let post = assemble_one(raw, &[], &[]);
        assert_eq!(post.read_time, "7 min read");
        assert_eq!(post.cover_image.as_deref(), Some("covers/first.png"));
        assert_eq!(post.excerpt, "About First");
    }
}

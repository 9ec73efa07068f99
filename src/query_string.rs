use std::collections::HashMap;
use std::str::FromStr;

use crate::filter::PostFilter;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(|s| s.as_str())
    }

    /// Reads `search`, `type` and `topic`. Unknown enum values are dropped.
    /// An empty `search` means no search, whitespace is searched as given.
    pub fn get_filter(&self) -> PostFilter {
        let search = self.items.get("search")
            .filter(|s| !s.is_empty())
            .cloned();

        PostFilter {
            search,
            post_types: self.get_list("type"),
            topic_categories: self.get_list("topic"),
        }
    }

    pub fn get_load_all(&self) -> bool {
        match self.items.get("all") {
            Some(val) => matches!(val.as_str(), "" | "1" | "true" | "yes"),
            None => false,
        }
    }

    fn get_list<T: FromStr + PartialEq>(&self, key: &str) -> Vec<T> {
        let Some(val) = self.items.get(key) else {
            return vec![];
        };

        let mut list = vec![];
        for item in val.split(',').filter_map(|s| s.trim().parse::<T>().ok()) {
            if !list.contains(&item) {
                list.push(item);
            }
        }
        list
    }
}

impl PostFilter {
    /// Inverse of [`QueryString::get_filter`]. Empty parameters are omitted.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![];
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                pairs.push(("search", search.clone()));
            }
        }
        if !self.post_types.is_empty() {
            let types: Vec<&str> = self.post_types.iter().map(|t| t.as_str()).collect();
            pairs.push(("type", types.join(",")));
        }
        if !self.topic_categories.is_empty() {
            let topics: Vec<&str> = self.topic_categories.iter().map(|t| t.as_str()).collect();
            pairs.push(("topic", topics.join(",")));
        }
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::post::{PostType, TopicCategory};
    use super::*;

    #[test]
    fn test_parse_query_str() {
        let buf = "search=silent%20wealth&type=Insight,Build+Log&topic=Tech%2CHistory";
        let filter = QueryString::from(buf).get_filter();
        assert_eq!(filter.search.as_deref(), Some("silent wealth"));
        assert_eq!(filter.post_types, vec![PostType::Insight, PostType::BuildLog]);
        assert_eq!(filter.topic_categories, vec![TopicCategory::Tech, TopicCategory::History]);
    }

    #[test]
    fn test_search_is_not_trimmed() {
        let filter = QueryString::from("search=%20").get_filter();
        assert_eq!(filter.search.as_deref(), Some(" "));
        assert!(!filter.is_empty());

        let filter = QueryString::from("search=%20stoics%20").get_filter();
        assert_eq!(filter.search.as_deref(), Some(" stoics "));

        assert!(QueryString::from("search=").get_filter().is_empty());
    }

    #[test]
    fn test_unknown_values_dropped() {
        let filter = QueryString::from("type=Insight,Poem,Insight&topic=Cooking").get_filter();
        assert_eq!(filter.post_types, vec![PostType::Insight]);
        assert!(filter.topic_categories.is_empty());
    }

    #[test]
    fn test_parse_invalid_query_str() {
        let qs = QueryString::from("");
        assert_eq!(qs, QueryString { items: Default::default() });
        assert!(qs.get_filter().is_empty());
        assert!(!qs.get_load_all());
    }

    #[test]
    fn test_load_all() {
        assert!(QueryString::from("all").get_load_all());
        assert!(QueryString::from("all=true").get_load_all());
        assert!(!QueryString::from("all=0").get_load_all());
    }

    #[test]
    fn test_to_query_string() {
        let filter = PostFilter::new()
            .search("what is")
            .post_types(&[PostType::BuildLog, PostType::Essay])
            .topics(&[TopicCategory::Philosophy]);
        let buf = filter.to_query_string();
        assert_eq!(buf, "search=what+is&type=Build+Log%2CEssay&topic=Philosophy");
        assert_eq!(QueryString::from(&buf).get_filter(), filter);

        assert_eq!(PostFilter::new().to_query_string(), "");
    }
}

#[cfg(test)]
pub const SNAPSHOT_DATA: &str = r##"[
  {
    "id": "fallback-1",
    "title": "What Is Silent Wealth?",
    "excerpt": "Wealth that does not need to be seen.",
    "content": "<p>Some people are rich, and some people are loud about it.</p>",
    "date": "2025-01-12",
    "readTime": "6 min read",
    "postTypes": ["Essay", "Reflection"],
    "topicCategories": ["Philosophy", "Personal"],
    "coverImage": "/greek-landscape.png"
  },
  {
    "id": "fallback-2",
    "title": "Building a Tiny Search Index",
    "excerpt": "Notes from a weekend build.",
    "content": "<p>An inverted index is just a map with opinions.</p>",
    "date": "2025-03-04",
    "readTime": "9 min read",
    "postTypes": ["Build Log"],
    "topicCategories": ["Tech"]
  },
  {
    "id": "fallback-3",
    "title": "Reading Notes: The Stoics",
    "excerpt": "What Marcus Aurelius kept writing down.",
    "content": "<p>Journaling as practice.</p>",
    "date": "2025-02-20",
    "readTime": "4 min read",
    "postTypes": ["Research"]
  }
]"##;

#[cfg(test)]
pub use mock_store::MockStore;

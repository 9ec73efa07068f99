use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::post::BlogPost;

/// Derives the routing slug of a title: "What Is Silent Wealth?" -> "what-is-silent-wealth"
pub fn slugify(title: &str) -> String {
    lazy_static! {
        static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    }

    let lower = title.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lower, "-");
    let slug = slug.strip_prefix('-').unwrap_or(&slug);
    let slug = slug.strip_suffix('-').unwrap_or(slug);
    slug.to_string()
}

/// Matches a requested id against a post, by id first and then by title slug
pub fn matches_id_or_slug(post: &BlogPost, id: &str) -> bool {
    post.id == id || slugify(&post.title) == id
}

/// Parses the `date` column. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff]`,
/// `YYYY-MM-DDTHH:MM:SS[.fff]` and plain `YYYY-MM-DD`.
pub fn parse_post_date(buf: &str) -> Option<NaiveDateTime> {
    let buf = buf.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Some(dt.naive_utc());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(buf, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(buf, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Sorts most recent first. Unparseable dates go last and the sort is stable,
/// ties keep their input order.
pub fn sort_by_date_desc(posts: &mut [BlogPost]) {
    posts.sort_by_cached_key(|post| Reverse(parse_post_date(&post.date)));
}

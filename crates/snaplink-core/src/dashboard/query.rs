// Filter and sort of the confirmed link list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use snaplink_api::Link;

/// Column the projection is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    #[default]
    Created,
    Updated,
    Clicks,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Search term plus ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl ListQuery {
    /// `true` if `link` passes the search filter. Case-insensitive
    /// substring match on the original URL or the short code.
    pub fn matches(&self, link: &Link) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        link.original_url.to_lowercase().contains(&needle)
            || link.short_code.to_lowercase().contains(&needle)
    }

    fn compare(&self, a: &Link, b: &Link) -> Ordering {
        let by_key = match self.sort_key {
            SortKey::Created => a.created_at.cmp(&b.created_at),
            SortKey::Updated => a.updated_at.cmp(&b.updated_at),
            SortKey::Clicks => a.click_count.cmp(&b.click_count),
        };
        let by_key = match self.sort_order {
            SortOrder::Asc => by_key,
            SortOrder::Desc => by_key.reverse(),
        };
        // Equal keys fall back to id order so the result is stable across
        // recomputations regardless of insertion order.
        by_key.then_with(|| a.id.cmp(&b.id))
    }
}

/// Derive the visible list from the confirmed collection.
pub fn project(links: &[Link], query: &ListQuery) -> Vec<Link> {
    let mut visible: Vec<Link> = links.iter().filter(|l| query.matches(l)).cloned().collect();
    visible.sort_by(|a, b| query.compare(a, b));
    visible
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use snaplink_api::LinkId;

    fn link(id: u64, url: &str, code: &str, clicks: u64, age_days: i64) -> Link {
        let base = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let created = base - Duration::days(age_days);
        Link {
            id: LinkId::from(id),
            original_url: url.into(),
            short_code: code.into(),
            click_count: clicks,
            created_at: created,
            updated_at: created,
        }
    }

    fn ids(links: &[Link]) -> Vec<String> {
        links.iter().map(|l| l.id.to_string()).collect()
    }

    fn sample() -> Vec<Link> {
        vec![
            link(1, "https://Example.com/docs", "docs", 5, 3),
            link(2, "https://rust-lang.org", "RUST", 40, 1),
            link(3, "https://news.ycombinator.com", "hn", 12, 2),
        ]
    }

    #[test]
    fn empty_search_keeps_everything_newest_first() {
        let out = project(&sample(), &ListQuery::default());
        assert_eq!(ids(&out), ["2", "3", "1"]);
    }

    #[test]
    fn search_is_case_insensitive_over_url_and_code() {
        let query = ListQuery {
            search_term: "EXAMPLE".into(),
            ..ListQuery::default()
        };
        assert_eq!(ids(&project(&sample(), &query)), ["1"]);

        let query = ListQuery {
            search_term: "rust".into(),
            ..ListQuery::default()
        };
        assert_eq!(ids(&project(&sample(), &query)), ["2"]);

        let query = ListQuery {
            search_term: "nothing-matches".into(),
            ..ListQuery::default()
        };
        assert!(project(&sample(), &query).is_empty());
    }

    #[test]
    fn clicks_sort_both_directions() {
        let mut query = ListQuery {
            sort_key: SortKey::Clicks,
            sort_order: SortOrder::Asc,
            ..ListQuery::default()
        };
        assert_eq!(ids(&project(&sample(), &query)), ["1", "3", "2"]);

        query.sort_order = SortOrder::Desc;
        assert_eq!(ids(&project(&sample(), &query)), ["2", "3", "1"]);
    }

    #[test]
    fn ties_break_by_id_ascending() {
        let links = vec![
            link(9, "https://a.io", "a", 7, 1),
            link(4, "https://b.io", "b", 7, 1),
            link(6, "https://c.io", "c", 7, 1),
        ];
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let query = ListQuery {
                sort_key: SortKey::Clicks,
                sort_order: order,
                ..ListQuery::default()
            };
            assert_eq!(ids(&project(&links, &query)), ["4", "6", "9"]);
        }
    }

    #[test]
    fn sort_keys_parse_from_lowercase() {
        assert_eq!("clicks".parse::<SortKey>().unwrap(), SortKey::Clicks);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!(SortKey::Updated.to_string(), "updated");
        assert!("size".parse::<SortKey>().is_err());
    }
}

//! Article validation, deduplication, and ordering
//!
//! List endpoints return loosely-shaped records with partial entries and
//! near-duplicate syndicated articles. Everything here is a pure function of
//! its input; callers decide what to do with the cleaned list.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, format_description};

use crate::model::{Article, RawArticle};

/// Deduplication key: trimmed, case-folded title.
pub fn dedup_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Validate a single raw record. Entries missing `id` or `title` (empty
/// strings included) are discarded; an unparsable timestamp degrades to
/// `None` rather than invalidating the record.
pub fn validate(raw: RawArticle) -> Option<Article> {
    let id = raw.id.filter(|id| !id.is_empty())?;
    let title = raw.title.filter(|title| !title.trim().is_empty())?;
    let published_at = raw.published_at.as_deref().and_then(parse_timestamp);

    Some(Article {
        id,
        title,
        description: raw.description,
        content: raw.content,
        image_url: raw.image_url,
        url: raw.url,
        source: raw.source,
        published_at,
        category: raw.category,
    })
}

/// Validate a whole batch, dropping invalid entries.
pub fn validate_all(raw: Vec<RawArticle>) -> Vec<Article> {
    raw.into_iter().filter_map(validate).collect()
}

/// Filter invalid entries, collapse duplicates by title key preferring the
/// richer record, and sort newest-first.
///
/// Merge policy on key collision, applied in order (the incoming record wins
/// if it satisfies a rule, otherwise the existing one is kept):
/// 1. incoming has an image and the existing record does not;
/// 2. incoming `description` or `content` is longer (missing counts as 0).
pub fn normalize(raw: Vec<RawArticle>) -> Vec<Article> {
    let mut slots: Vec<Article> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for article in raw.into_iter().filter_map(validate) {
        match by_key.entry(dedup_key(&article.title)) {
            Entry::Occupied(entry) => {
                let existing = &mut slots[*entry.get()];
                if prefer_incoming(existing, &article) {
                    *existing = article;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(slots.len());
                slots.push(article);
            }
        }
    }

    sort_newest_first(&mut slots);
    slots
}

/// Sort newest-first; a missing timestamp sorts as the epoch (oldest).
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by_key(|article| {
        Reverse(article.published_at.unwrap_or(OffsetDateTime::UNIX_EPOCH))
    });
}

fn prefer_incoming(existing: &Article, incoming: &Article) -> bool {
    if incoming.image_url.is_some() && existing.image_url.is_none() {
        return true;
    }
    text_len(&incoming.description) > text_len(&existing.description)
        || text_len(&incoming.content) > text_len(&existing.content)
}

fn text_len(field: &Option<String>) -> usize {
    field.as_deref().map_or(0, str::len)
}

/// The wire usually carries RFC 3339; some backfilled records carry a bare
/// date, which parses as midnight UTC.
fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }

    let date_only = format_description::parse("[year]-[month]-[day]").ok()?;
    Date::parse(value, &date_only)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, title: &str) -> RawArticle {
        RawArticle {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn validate_discards_missing_id_or_title() {
        assert!(validate(RawArticle::default()).is_none());
        assert!(
            validate(RawArticle {
                title: Some("no id".to_string()),
                ..Default::default()
            })
            .is_none()
        );
        assert!(
            validate(RawArticle {
                id: Some("1".to_string()),
                title: Some("   ".to_string()),
                ..Default::default()
            })
            .is_none()
        );
        assert!(validate(raw("1", "ok")).is_some());
    }

    #[test]
    fn validate_degrades_bad_timestamp_to_none() {
        let article = validate(RawArticle {
            published_at: Some("not a date".to_string()),
            ..raw("1", "t")
        })
        .unwrap();
        assert!(article.published_at.is_none());
    }

    #[test]
    fn parse_accepts_bare_dates() {
        let parsed = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(parsed.date().to_string(), "2024-01-02");
    }

    #[test]
    fn dedup_key_trims_and_folds_case() {
        assert_eq!(dedup_key("  Breaking News "), "breaking news");
        assert_eq!(dedup_key("BREAKING NEWS"), dedup_key("breaking news"));
    }

    #[test]
    fn collision_prefers_article_with_image() {
        // Scenario from the caching rules: title collision, imageUrl wins.
        let result = normalize(vec![
            RawArticle {
                published_at: Some("2024-01-01".to_string()),
                ..raw("1", "A")
            },
            RawArticle {
                image_url: Some("x".to_string()),
                published_at: Some("2024-01-02".to_string()),
                ..raw("2", "a")
            },
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "2");
    }

    #[test]
    fn collision_prefers_longer_description() {
        let result = normalize(vec![
            RawArticle {
                description: Some("short".to_string()),
                ..raw("1", "Same Title")
            },
            RawArticle {
                description: Some("a noticeably longer description".to_string()),
                ..raw("2", "same title")
            },
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "2");
    }

    #[test]
    fn collision_keeps_existing_when_incoming_is_not_richer() {
        let result = normalize(vec![
            RawArticle {
                image_url: Some("img".to_string()),
                description: Some("long enough description".to_string()),
                ..raw("1", "Same Title")
            },
            raw("2", "same title"),
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn output_has_no_duplicate_keys() {
        let result = normalize(vec![
            raw("1", "Alpha"),
            raw("2", " alpha "),
            raw("3", "Beta"),
            raw("4", "BETA"),
            raw("5", "Gamma"),
        ]);

        let mut keys: Vec<String> = result.iter().map(|a| dedup_key(&a.title)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), result.len());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn sorts_newest_first_with_missing_dates_last() {
        let result = normalize(vec![
            RawArticle {
                published_at: Some("2024-01-01T00:00:00Z".to_string()),
                ..raw("old", "Old")
            },
            raw("undated", "Undated"),
            RawArticle {
                published_at: Some("2024-06-01T00:00:00Z".to_string()),
                ..raw("new", "New")
            },
        ]);

        let ids: Vec<&str> = result.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(vec![
            RawArticle {
                description: Some("desc".to_string()),
                published_at: Some("2024-03-01T00:00:00Z".to_string()),
                ..raw("1", "One")
            },
            raw("2", "one"),
            RawArticle {
                published_at: Some("2024-02-01T00:00:00Z".to_string()),
                ..raw("3", "Three")
            },
        ]);

        let again = normalize(
            once.iter()
                .cloned()
                .map(|article| RawArticle {
                    id: Some(article.id),
                    title: Some(article.title),
                    description: article.description,
                    content: article.content,
                    image_url: article.image_url,
                    url: article.url,
                    source: article.source,
                    published_at: article
                        .published_at
                        .and_then(|ts| ts.format(&Rfc3339).ok()),
                    category: article.category,
                })
                .collect(),
        );

        assert_eq!(once, again);
    }
}

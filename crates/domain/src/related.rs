//! Related-article assembly
//!
//! Builds the "related articles" strip for a detail view out of whatever
//! same-category and cross-category lists are at hand. Best-effort by
//! contract: empty inputs produce an empty result, never an error.

use std::collections::HashSet;

use crate::model::Article;
use crate::normalize::{dedup_key, sort_newest_first};

/// Default number of related articles kept after truncation.
pub const DEFAULT_RELATED_LIMIT: usize = 10;

/// Combine same-category and all-news pools (same-category first), drop the
/// target article and title-key duplicates (first occurrence wins), sort
/// newest-first, and truncate to `limit`.
pub fn assemble_related(
    target_id: &str,
    same_category: &[Article],
    all_news: &[Article],
    limit: usize,
) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut related: Vec<Article> = Vec::new();

    for article in same_category.iter().chain(all_news) {
        if article.id == target_id {
            continue;
        }
        if seen.insert(dedup_key(&article.title)) {
            related.push(article.clone());
        }
    }

    sort_newest_first(&mut related);
    related.truncate(limit);
    related
}

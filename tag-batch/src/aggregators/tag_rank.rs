use crate::types::{ItemResult, TagScore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Number of labels kept in the cross-item ranking.
pub const AGGREGATE_LIMIT: usize = 10;
/// Tags shown per item before "show more" is enabled.
pub const DEFAULT_VISIBLE_TAGS: usize = 10;
/// With "show more" on, every tag scoring above this is shown.
pub const SHOW_MORE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTag {
    pub label: String,
    pub score: f64,
}

/// Ranks general-tag labels by their mean score across `items`.
///
/// An item that does not list a label contributes zero to that label, so
/// the divisor is always the number of items. Equal means keep the order
/// in which labels were first met. Returns at most [`AGGREGATE_LIMIT`] labels.
pub fn rank_tags<'a, I>(items: I) -> Vec<AggregateTag>
where
    I: IntoIterator<Item = &'a ItemResult>,
{
    let mut totals: Vec<AggregateTag> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut item_count = 0usize;

    for item in items {
        item_count += 1;
        for tag in &item.general_tags {
            match positions.get(tag.label.as_str()) {
                Some(&position) => totals[position].score += tag.score,
                None => {
                    positions.insert(tag.label.as_str(), totals.len());
                    totals.push(AggregateTag {
                        label: tag.label.clone(),
                        score: tag.score,
                    });
                }
            }
        }
    }

    if item_count == 0 {
        return Vec::new();
    }

    for total in &mut totals {
        total.score /= item_count as f64;
    }

    // sort_by is stable, which keeps first-seen order among ties
    totals.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    totals.truncate(AGGREGATE_LIMIT);

    debug!("Ranked {} label(s) across {} item(s)", totals.len(), item_count);
    totals
}

/// Tags displayed for a single item.
///
/// By default the first [`DEFAULT_VISIBLE_TAGS`] in service order; with
/// `show_more` every tag above [`SHOW_MORE_THRESHOLD`] instead.
pub fn visible_tags(tags: &[TagScore], show_more: bool) -> Vec<&TagScore> {
    if show_more {
        tags.iter().filter(|tag| tag.score > SHOW_MORE_THRESHOLD).collect()
    } else {
        tags.iter().take(DEFAULT_VISIBLE_TAGS).collect()
    }
}

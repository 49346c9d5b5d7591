mod common;

use common::payload;
use tag_batch::aggregators::{rank_tags, AGGREGATE_LIMIT};
use tag_batch::{ItemResult, Rating};

fn item(id: &str, general: &[(&str, f64)]) -> ItemResult {
    ItemResult::from_payload(id, payload(id, general, Rating::Safe), 1)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_mean_counts_missing_labels_as_zero() {
    let items = vec![item("a", &[("cat", 0.9)]), item("b", &[("cat", 0.3), ("dog", 0.7)])];
    let ranking = rank_tags(&items);

    let labels: Vec<&str> = ranking.iter().map(|tag| tag.label.as_str()).collect();
    assert_eq!(labels, vec!["cat", "dog"]);
    assert!(close(ranking[0].score, 0.6));
    assert!(close(ranking[1].score, 0.35));
}

#[test]
fn test_ties_keep_first_seen_order() {
    let items = vec![
        item("a", &[("zebra", 0.5), ("apple", 0.2)]),
        item("b", &[("apple", 0.3), ("mango", 0.5)]),
    ];
    let ranking = rank_tags(&items);

    let labels: Vec<&str> = ranking.iter().map(|tag| tag.label.as_str()).collect();
    assert_eq!(labels, vec!["zebra", "apple", "mango"]);
    assert!(ranking.iter().all(|tag| close(tag.score, 0.25)));
}

#[test]
fn test_ranking_is_truncated_to_limit() {
    let general: Vec<(String, f64)> = (0..15).map(|i| (format!("tag{:02}", i), 1.0 - i as f64 * 0.05)).collect();
    let general: Vec<(&str, f64)> = general.iter().map(|(label, score)| (label.as_str(), *score)).collect();
    let items = vec![item("a", &general), item("b", &general)];

    let ranking = rank_tags(&items);
    assert_eq!(ranking.len(), AGGREGATE_LIMIT);
    assert_eq!(ranking[0].label, "tag00");
    assert_eq!(ranking[9].label, "tag09");
}

#[test]
fn test_scores_stay_between_zero_and_per_item_max() {
    let items = vec![
        item("a", &[("cat", 0.9), ("tree", 0.1)]),
        item("b", &[("dog", 0.4)]),
        item("c", &[("cat", 0.2), ("dog", 0.8), ("sky", 0.55)]),
    ];
    let ranking = rank_tags(&items);

    for tag in &ranking {
        let max = items
            .iter()
            .flat_map(|item| item.general_tags.iter())
            .filter(|candidate| candidate.label == tag.label)
            .map(|candidate| candidate.score)
            .fold(0.0, f64::max);
        assert!(tag.score >= 0.0);
        assert!(tag.score <= max, "{} scored {} above max {}", tag.label, tag.score, max);
    }
}

#[test]
fn test_duplicate_labels_contribute_separately() {
    let items = vec![item("a", &[("cat", 0.4), ("cat", 0.2)]), item("b", &[])];
    let ranking = rank_tags(&items);

    assert_eq!(ranking.len(), 1);
    assert!(close(ranking[0].score, 0.3));
}

#[test]
fn test_no_items_yields_empty_ranking() {
    let items: Vec<ItemResult> = Vec::new();
    assert!(rank_tags(&items).is_empty());
}

mod common;

use common::payload;
use tag_batch::utils::{format_confidence, parse_id_list};
use tag_batch::{BatchAction, BatchDigest, BatchState, FailureReason, ItemOutcome, ItemResult, Rating};

#[test]
fn test_parse_id_list_accepts_comma_separated_and_separate_arguments() {
    assert_eq!(parse_id_list(&["a,b", " c ", ",,d,"]), vec!["a", "b", "c", "d"]);
    assert!(parse_id_list::<&str>(&[]).is_empty());
}

#[test]
fn test_format_confidence() {
    assert_eq!(format_confidence(0.9123), "91.2%");
    assert_eq!(format_confidence(0.0), "0.0%");
}

#[test]
fn test_digest_while_loading() {
    let state = BatchState::new();
    assert_eq!(BatchDigest::render(&state), "Loading... 0 result(s) so far.\n");
}

#[test]
fn test_digest_single_item_has_no_ranking() {
    let mut state = BatchState::new();
    let result = ItemResult::from_payload("a", payload("a", &[("cat", 0.9)], Rating::Explicit), 1);
    state.apply(BatchAction::AppendOutcome(Some(ItemOutcome::Ready(result))));
    state.apply(BatchAction::AppendOutcome(Some(ItemOutcome::Failed(FailureReason::NotFound))));
    state.apply(BatchAction::CompleteLoading);

    let digest = BatchDigest::render(&state);
    assert!(digest.contains("*[1]"));
    assert!(digest.contains("Tags: cat (90.0%)"));
    assert!(digest.contains("(blurred)"));
    assert!(digest.contains("Rating: explicit"));
    assert!(digest.contains("Error: The requested image could not be found."));
    assert!(!digest.contains("Top tags"));
}

#[test]
fn test_digest_full_layout() {
    let mut state = BatchState::new();
    for (id, general) in [("a", &[("cat", 0.9), ("dog", 0.4)][..]), ("b", &[("cat", 0.5)][..])] {
        let result = ItemResult::from_payload(id, payload(id, general, Rating::Safe), 1);
        state.apply(BatchAction::AppendOutcome(Some(ItemOutcome::Ready(result))));
    }
    state.apply(BatchAction::CompleteLoading);

    let expected = "\
*[1]
    Id: a
    Image: inline, aGVsbG8=
    Tags: cat (90.0%), dog (40.0%)
    Character: original
    Rating: safe

 [2]
    Id: b
    Image: inline, aGVsbG8=
    Tags: cat (50.0%)
    Character: original
    Rating: safe

Top tags across 2 images:
  1. cat (70.0%)
  2. dog (20.0%)
";
    assert_eq!(BatchDigest::render(&state), expected);
}

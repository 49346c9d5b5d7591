use crate::state::BatchState;
use crate::types::{CharacterTags, ImageRef, ItemOutcome, ItemResult};
use crate::utils::{format_confidence, text};

const IMAGE_PREVIEW_CHARS: usize = 32;

/// Plain-text report of a batch, one section per slot.
pub struct BatchDigest;

impl BatchDigest {
    pub fn render(state: &BatchState) -> String {
        if state.is_loading {
            return format!("Loading... {} result(s) so far.\n", state.results.len());
        }
        if state.results.is_empty() {
            return "No results.\n".to_string();
        }

        let mut digest = String::new();
        for (slot, outcome) in state.results.iter().enumerate() {
            let marker = if slot == state.current_index && outcome.is_ready() { "*" } else { " " };
            digest.push_str(&format!("{}[{}]\n", marker, slot + 1));
            match outcome {
                ItemOutcome::Ready(result) => Self::render_item(&mut digest, state, slot, result),
                ItemOutcome::Failed(reason) => {
                    digest.push_str(&format!("    Error: {}\n", reason));
                }
            }
            digest.push('\n');
        }

        if let Some(ranking) = state.aggregate() {
            digest.push_str(&format!("Top tags across {} images:\n", state.ready_count()));
            for (i, tag) in ranking.iter().enumerate() {
                digest.push_str(&format!("  {}. {} ({})\n", i + 1, tag.label, format_confidence(tag.score)));
            }
        }

        digest
    }

    fn render_item(digest: &mut String, state: &BatchState, slot: usize, result: &ItemResult) {
        digest.push_str(&format!("    Id: {}\n", result.id));
        let image = match &result.image_ref {
            ImageRef::Inline(encoded) => format!("inline, {}", text::truncate(encoded, IMAGE_PREVIEW_CHARS)),
            ImageRef::ContentAddress(address) => format!("stored as {}", address),
        };
        digest.push_str(&format!("    Image: {}{}\n", image, if result.blur { " (blurred)" } else { "" }));

        let tags = state
            .visible_tags(slot)
            .iter()
            .map(|tag| format!("{} ({})", tag.label, format_confidence(tag.score)))
            .collect::<Vec<_>>();
        digest.push_str(&format!("    Tags: {}\n", tags.join(", ")));

        let characters = match &result.character_tags {
            CharacterTags::Scored(tags) => tags.iter().map(|tag| tag.label.as_str()).collect::<Vec<_>>().join(", "),
            CharacterTags::Text(text) => text.clone(),
        };
        digest.push_str(&format!("    Character: {}\n", characters));
        digest.push_str(&format!("    Rating: {}\n", result.rating));
    }
}

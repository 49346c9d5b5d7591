pub mod tag_rank;

pub use tag_rank::{rank_tags, visible_tags, AggregateTag, AGGREGATE_LIMIT, DEFAULT_VISIBLE_TAGS, SHOW_MORE_THRESHOLD};

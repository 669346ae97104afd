//! Result Renderer: category buckets, per-category presentation, terminal view.
//! The document export consumes the same buckets, so on-screen and exported
//! section order never diverge.

pub mod presentation;
pub mod view;

pub use presentation::presentation;
pub use view::{render_text, ProfileView};

use crate::models::{Tag, TagCategory};

/// Tags sharing one category, in their original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub category: TagCategory,
    pub tags: Vec<&'a Tag>,
}

/// Partitions tags into the fixed display order, omitting empty buckets.
/// Tags with an unrecognised category are not displayed.
pub fn group_tags(tags: &[Tag]) -> Vec<Bucket<'_>> {
    TagCategory::DISPLAY_ORDER
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&Tag> = tags.iter().filter(|t| t.category == category).collect();
            (!members.is_empty()).then_some(Bucket {
                category,
                tags: members,
            })
        })
        .collect()
}

use serde::{Deserialize, Serialize};

use crate::items::Item;

/// Ranked, paginated response for one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// Visible slice, at most `display_limit` long.
    pub items: Vec<Item>,
    /// Length of `items`.
    pub count: usize,
    pub display_limit: usize,
    pub has_more: bool,
    /// Ranked items beyond the display limit.
    pub held_back_items: Vec<Item>,
    pub total_available: usize,
}

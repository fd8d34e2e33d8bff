//! ItemMatcher - recognizes which concrete items realize a definition

use crate::types::ItemPayload;
use serde::{Deserialize, Serialize};

/// Matches items by exact id or by tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMatcher {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ItemMatcher {
    pub fn item(item: impl Into<String>) -> Self {
        ItemMatcher {
            items: vec![item.into()],
            tags: Vec::new(),
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        ItemMatcher {
            items: Vec::new(),
            tags: vec![tag.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, payload: &ItemPayload) -> bool {
        self.items.iter().any(|i| *i == payload.item)
            || self.tags.iter().any(|t| payload.tags.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_by_item_and_tag() {
        let matcher = ItemMatcher {
            items: vec!["minecraft:stick".to_string()],
            tags: vec!["forge:rods/wooden".to_string()],
        };
        assert!(matcher.matches(&ItemPayload::new("minecraft:stick")));
        assert!(matcher.matches(&ItemPayload::new("mod:branch").with_tag("forge:rods/wooden")));
        assert!(!matcher.matches(&ItemPayload::new("minecraft:iron_ingot")));
    }

    #[test]
    fn test_empty_matcher_matches_nothing() {
        let matcher = ItemMatcher::default();
        assert!(matcher.is_empty());
        assert!(!matcher.matches(&ItemPayload::new("minecraft:stick")));
    }
}

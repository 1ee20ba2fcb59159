// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User notification categories and their actions.

use serde::{Deserialize, Serialize};

/// Category attached to Sempro message notifications.
pub const REPLY_CATEGORY_ID: &str = "SemproReplyCategory";

/// Inline text reply action of [`REPLY_CATEGORY_ID`].
pub const REPLY_ACTION_ID: &str = "SemproReply";

/// One action button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub identifier: String,
    pub title: String,
    /// Whether the action collects text input from the user.
    #[serde(default)]
    pub text_input: bool,
}

/// A group of actions the platform shows for a notification category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
}

impl NotificationCategory {
    /// The category Sempro registers by default: a single inline reply.
    pub fn reply() -> Self {
        Self {
            identifier: REPLY_CATEGORY_ID.to_string(),
            actions: vec![NotificationAction {
                identifier: REPLY_ACTION_ID.to_string(),
                title: "Reply".to_string(),
                text_input: true,
            }],
        }
    }
}

/// Registered notification categories.
///
/// Starts with the Sempro defaults. Hosts that turn off automatic
/// registration read [`categories`](Self::categories) and register them
/// with the platform themselves.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<NotificationCategory>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self {
            categories: vec![NotificationCategory::reply()],
        }
    }

    /// Add a category, replacing any existing one with the same identifier.
    pub fn register(&mut self, category: NotificationCategory) {
        match self
            .categories
            .iter_mut()
            .find(|c| c.identifier == category.identifier)
        {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    pub fn categories(&self) -> &[NotificationCategory] {
        &self.categories
    }

    /// Whether any registered category declares `identifier` as an action.
    pub fn knows_action(&self, identifier: &str) -> bool {
        self.categories
            .iter()
            .flat_map(|c| &c.actions)
            .any(|a| a.identifier == identifier)
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_reply() {
        let registry = CategoryRegistry::new();
        assert_eq!(registry.categories().len(), 1);
        assert_eq!(registry.categories()[0].identifier, REPLY_CATEGORY_ID);
        assert!(registry.knows_action(REPLY_ACTION_ID));
        assert!(!registry.knows_action(REPLY_CATEGORY_ID));
    }

    #[test]
    fn register_replaces_same_identifier() {
        let mut registry = CategoryRegistry::new();
        registry.register(NotificationCategory {
            identifier: REPLY_CATEGORY_ID.to_string(),
            actions: vec![NotificationAction {
                identifier: "MarkRead".to_string(),
                title: "Mark as read".to_string(),
                text_input: false,
            }],
        });
        assert_eq!(registry.categories().len(), 1);
        assert!(registry.knows_action("MarkRead"));
        assert!(!registry.knows_action(REPLY_ACTION_ID));
    }
}

//! Todo item entity as served by the downstream `/todos` API

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A single todo item
///
/// Unknown fields in the downstream payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Identifier assigned by the downstream service
    pub id: u64,
    /// Owning user, if the payload carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    /// Title
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    /// Create a new todo item
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the title is blank.
    pub fn new(id: u64, title: impl Into<String>, completed: bool) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "todo title must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            user_id: None,
            title,
            completed,
        })
    }

    /// Attach the owning user
    #[must_use]
    pub const fn with_user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_downstream_shape() {
        let json = r#"{"userId":1,"id":1,"title":"delectus aut autem","completed":false}"#;
        let item: TodoItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(item.user_id, Some(1));
        assert_eq!(item.title, "delectus aut autem");
        assert!(!item.completed);
    }

    #[test]
    fn decodes_without_optional_fields() {
        let item: TodoItem = serde_json::from_str(r#"{"id":1,"title":"a"}"#).unwrap();
        assert_eq!(item.user_id, None);
        assert!(!item.completed);
    }

    #[test]
    fn ignores_unknown_fields() {
        let json = r#"{"id":2,"title":"b","completed":true,"priority":"high"}"#;
        let item: TodoItem = serde_json::from_str(json).unwrap();
        assert!(item.completed);
    }

    #[test]
    fn serializes_camel_case() {
        let item = TodoItem::new(3, "c", true).unwrap().with_user(9);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["userId"], 9);
        assert_eq!(json["title"], "c");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(matches!(
            TodoItem::new(1, "   ", false),
            Err(DomainError::ValidationError(_))
        ));
    }
}

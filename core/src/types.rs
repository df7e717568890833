//! Domain DTOs for the todo service.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Field names follow the service's JSON (`_id`, `isCompleted`, `ownerName`)
//! through serde renames so the Rust side keeps snake_case. Integration tests
//! catch any schema drift between the two crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user whose todo list can be selected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl User {
    /// The zero-value user held before the user list has been loaded.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

/// Priority marker attached to a todo.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[default]
    None,
    First,
    Second,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::None => write!(f, "none"),
            Priority::First => write!(f, "first"),
            Priority::Second => write!(f, "second"),
        }
    }
}

/// A single todo item returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: String,
    pub contents: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Required: the merge gate compares it with the current user.
    pub owner_name: String,
}

/// Which slice of the list the widgets are showing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Active,
}

impl FilterMode {
    /// Whether `todo` is visible under this filter.
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => todo.is_completed,
            FilterMode::Active => !todo.is_completed,
        }
    }
}

/// Response shape of the list and delete operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoListEnvelope {
    pub todo_list: Vec<Todo>,
}

/// Response shape of the toggle operation: the identifier only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Request payload for creating or editing a todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoContents {
    pub contents: String,
}

/// Request payload for changing a todo's priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityUpdate {
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_service_field_names() {
        let todo = Todo {
            id: "5".to_string(),
            contents: "x".to_string(),
            is_completed: true,
            priority: Priority::First,
            owner_name: "al".to_string(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["_id"], "5");
        assert_eq!(json["isCompleted"], true);
        assert_eq!(json["priority"], "FIRST");
        assert_eq!(json["ownerName"], "al");
    }

    #[test]
    fn todo_defaults_optional_fields() {
        let todo: Todo = serde_json::from_str(r#"{"_id":"1","contents":"milk","ownerName":"al"}"#).unwrap();
        assert!(!todo.is_completed);
        assert_eq!(todo.priority, Priority::None);
        assert_eq!(todo.owner_name, "al");
    }

    #[test]
    fn todo_requires_owner() {
        let result: Result<Todo, _> = serde_json::from_str(r#"{"_id":"1","contents":"milk"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn envelope_rejects_non_list() {
        let result: Result<TodoListEnvelope, _> = serde_json::from_str(r#"{"todoList":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn filter_modes_select_expected_items() {
        let done = Todo {
            id: "1".to_string(),
            contents: "a".to_string(),
            is_completed: true,
            priority: Priority::None,
            owner_name: String::new(),
        };
        let open = Todo {
            is_completed: false,
            ..done.clone()
        };
        assert!(FilterMode::All.matches(&done) && FilterMode::All.matches(&open));
        assert!(FilterMode::Completed.matches(&done) && !FilterMode::Completed.matches(&open));
        assert!(FilterMode::Active.matches(&open) && !FilterMode::Active.matches(&done));
    }

    #[test]
    fn placeholder_user_is_empty() {
        assert!(User::placeholder().is_placeholder());
        let al = User {
            id: "1".to_string(),
            name: "al".to_string(),
        };
        assert!(!al.is_placeholder());
    }
}

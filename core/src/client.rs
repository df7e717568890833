//! Stateless HTTP request builder and response parser for the todo service.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping this module
//! deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Priority, PriorityUpdate, Todo, TodoContents, TodoListEnvelope, TodoRef, User};

/// Synchronous, stateless client for the todo service.
///
/// User names and todo ids are percent-encoded as path segments, so any
/// name the service accepts can be addressed.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: Url,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base_url })
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["api", "users"])
    }

    pub fn build_list_todos(&self, user_name: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &["api", "users", user_name, "items"])
    }

    pub fn build_add_todo(&self, user_name: &str, contents: &str) -> Result<HttpRequest, ApiError> {
        let body = TodoContents {
            contents: contents.to_string(),
        };
        self.json_request(HttpMethod::Post, &["api", "users", user_name, "items"], &body)
    }

    pub fn build_edit_todo(&self, user_name: &str, id: &str, contents: &str) -> Result<HttpRequest, ApiError> {
        let body = TodoContents {
            contents: contents.to_string(),
        };
        self.json_request(HttpMethod::Put, &["api", "users", user_name, "items", id], &body)
    }

    pub fn build_toggle_todo(&self, user_name: &str, id: &str) -> HttpRequest {
        self.request(HttpMethod::Put, &["api", "users", user_name, "items", id, "toggle"])
    }

    pub fn build_set_priority(&self, user_name: &str, id: &str, priority: Priority) -> Result<HttpRequest, ApiError> {
        let body = PriorityUpdate { priority };
        self.json_request(HttpMethod::Put, &["api", "users", user_name, "items", id, "priority"], &body)
    }

    pub fn build_delete_todo(&self, user_name: &str, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &["api", "users", user_name, "items", id])
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    /// Parse a `{"todoList": [...]}` body, as returned by list and delete.
    ///
    /// A `todoList` that is present but not an array is reported as
    /// `MalformedResponse` rather than a generic decode failure.
    pub fn parse_todo_list(&self, response: HttpResponse) -> Result<TodoListEnvelope, ApiError> {
        check_status(&response, 200)?;
        let value: serde_json::Value = decode(&response.body)?;
        match value.get("todoList") {
            Some(serde_json::Value::Array(_)) => {
                serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
            }
            Some(other) => Err(ApiError::MalformedResponse(format!("todoList is not a list: {other}"))),
            None => Err(ApiError::MalformedResponse("missing todoList".to_string())),
        }
    }

    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    /// Parse the updated todo returned by edit and set-priority.
    pub fn parse_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<TodoRef, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn request(&self, method: HttpMethod, segments: &[&str]) -> HttpRequest {
        HttpRequest {
            method,
            path: self.endpoint(segments),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(&self, method: HttpMethod, segments: &[&str], body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.endpoint(segments),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

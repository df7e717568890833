//! The remote todo service as seen by the coordinator.

use async_trait::async_trait;
use tracing::instrument;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{Priority, Todo, TodoListEnvelope, TodoRef, User};

/// Async CRUD + list operations over users and their todos.
///
/// Every call may fail; none is retried.
#[async_trait]
pub trait RemoteTodoService: Send + Sync {
    async fn get_user_list(&self) -> Result<Vec<User>, ApiError>;

    async fn get_todo_list(&self, user_name: &str) -> Result<TodoListEnvelope, ApiError>;

    async fn add_todo(&self, user_name: &str, contents: &str) -> Result<Todo, ApiError>;

    async fn edit_todo(&self, user_name: &str, id: &str, contents: &str) -> Result<Todo, ApiError>;

    /// Returns only the identifier of the toggled todo.
    async fn toggle_todo(&self, user_name: &str, id: &str) -> Result<TodoRef, ApiError>;

    async fn set_priority(&self, user_name: &str, id: &str, priority: Priority) -> Result<Todo, ApiError>;

    /// Returns the user's authoritative remaining list.
    async fn delete_todo(&self, user_name: &str, id: &str) -> Result<TodoListEnvelope, ApiError>;
}

/// `RemoteTodoService` over HTTP: `TodoClient` builds and parses, the
/// transport carries the request.
#[derive(Debug, Clone)]
pub struct HttpTodoService<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> HttpTodoService<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }
}

#[async_trait]
impl<T: Transport> RemoteTodoService for HttpTodoService<T> {
    #[instrument(skip(self))]
    async fn get_user_list(&self) -> Result<Vec<User>, ApiError> {
        let response = self.transport.execute(self.client.build_list_users()).await?;
        self.client.parse_list_users(response)
    }

    #[instrument(skip(self))]
    async fn get_todo_list(&self, user_name: &str) -> Result<TodoListEnvelope, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos(user_name)).await?;
        self.client.parse_todo_list(response)
    }

    #[instrument(skip(self))]
    async fn add_todo(&self, user_name: &str, contents: &str) -> Result<Todo, ApiError> {
        let request = self.client.build_add_todo(user_name, contents)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_add_todo(response)
    }

    #[instrument(skip(self))]
    async fn edit_todo(&self, user_name: &str, id: &str, contents: &str) -> Result<Todo, ApiError> {
        let request = self.client.build_edit_todo(user_name, id, contents)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_todo(response)
    }

    #[instrument(skip(self))]
    async fn toggle_todo(&self, user_name: &str, id: &str) -> Result<TodoRef, ApiError> {
        let response = self.transport.execute(self.client.build_toggle_todo(user_name, id)).await?;
        self.client.parse_toggle_todo(response)
    }

    #[instrument(skip(self))]
    async fn set_priority(&self, user_name: &str, id: &str, priority: Priority) -> Result<Todo, ApiError> {
        let request = self.client.build_set_priority(user_name, id, priority)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_todo(response)
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, user_name: &str, id: &str) -> Result<TodoListEnvelope, ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(user_name, id)).await?;
        self.client.parse_todo_list(response)
    }
}

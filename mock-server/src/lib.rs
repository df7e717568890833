use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[default]
    None,
    First,
    Second,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: String,
    pub contents: String,
    pub is_completed: bool,
    pub priority: Priority,
    pub owner_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub todo_list: Vec<Todo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoRef {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

#[derive(Deserialize)]
pub struct Contents {
    pub contents: String,
}

#[derive(Deserialize)]
pub struct PriorityUpdate {
    pub priority: Priority,
}

/// Users in creation order, and each user's todos keyed by user name.
#[derive(Default)]
pub struct Store {
    users: Vec<User>,
    todos: HashMap<String, Vec<Todo>>,
}

impl Store {
    fn add_user(&mut self, name: &str) -> Option<User> {
        if self.todos.contains_key(name) {
            return None;
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.users.push(user.clone());
        self.todos.insert(user.name.clone(), Vec::new());
        Some(user)
    }

    fn list_mut(&mut self, user: &str) -> Result<&mut Vec<Todo>, StatusCode> {
        self.todos.get_mut(user).ok_or(StatusCode::NOT_FOUND)
    }

    fn item_mut(&mut self, user: &str, id: &str) -> Result<&mut Todo, StatusCode> {
        self.list_mut(user)?
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(StatusCode::NOT_FOUND)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_users(&[])
}

/// Router whose store starts out with the given users and no todos.
pub fn app_with_users(names: &[&str]) -> Router {
    let mut store = Store::default();
    for name in names {
        store.add_user(name);
    }
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{name}/items", get(list_todos).post(add_todo))
        .route("/api/users/{name}/items/{id}", put(edit_todo).delete(delete_todo))
        .route("/api/users/{name}/items/{id}/toggle", put(toggle_todo))
        .route("/api/users/{name}/items/{id}/priority", put(set_priority))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_users(listener, &[]).await
}

pub async fn run_with_users(listener: TcpListener, names: &[&str]) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, users = names.len(), "mock todo service listening");
    }
    axum::serve(listener, app_with_users(names)).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    Json(db.read().await.users.clone())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), StatusCode> {
    if input.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let user = db.write().await.add_user(&input.name).ok_or(StatusCode::CONFLICT)?;
    debug!(user = %user.name, "created user");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_todos(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<TodoList>, StatusCode> {
    let store = db.read().await;
    let todos = store.todos.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(TodoList {
        todo_list: todos.clone(),
    }))
}

async fn add_todo(
    State(db): State<Db>,
    Path(name): Path<String>,
    Json(input): Json<Contents>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    if input.contents.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        contents: input.contents,
        is_completed: false,
        priority: Priority::None,
        owner_name: name.clone(),
    };
    store.list_mut(&name)?.push(todo.clone());
    debug!(user = %name, id = %todo.id, "added todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn edit_todo(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
    Json(input): Json<Contents>,
) -> Result<Json<Todo>, StatusCode> {
    if input.contents.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let todo = store.item_mut(&name, &id)?;
    todo.contents = input.contents;
    Ok(Json(todo.clone()))
}

async fn toggle_todo(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<TodoRef>, StatusCode> {
    let mut store = db.write().await;
    let todo = store.item_mut(&name, &id)?;
    todo.is_completed = !todo.is_completed;
    Ok(Json(TodoRef { id: todo.id.clone() }))
}

async fn set_priority(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
    Json(input): Json<PriorityUpdate>,
) -> Result<Json<Todo>, StatusCode> {
    let mut store = db.write().await;
    let todo = store.item_mut(&name, &id)?;
    todo.priority = input.priority;
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<TodoList>, StatusCode> {
    let mut store = db.write().await;
    let todos = store.list_mut(&name)?;
    let index = todos.iter().position(|todo| todo.id == id).ok_or(StatusCode::NOT_FOUND)?;
    todos.remove(index);
    debug!(user = %name, %id, remaining = todos.len(), "deleted todo");
    Ok(Json(TodoList {
        todo_list: todos.clone(),
    }))
}

//! Shared test doubles: an in-memory todo service and widgets that record
//! every slice pushed to them.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use todo_core::{
    ApiError, FilterMode, IntentSender, Priority, RemoteTodoService, Todo, TodoListEnvelope, TodoRef, User,
    UsersView, Widget, WidgetFactory,
};

// ---------------------------------------------------------------------------
// Fake service
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Store {
    users: Vec<User>,
    todos: HashMap<String, Vec<Todo>>,
    next_id: u32,
    failing: HashSet<&'static str>,
    malformed_lists: bool,
    delays: HashMap<String, Duration>,
    calls: Vec<String>,
}

/// In-memory `RemoteTodoService` with switchable failures.
#[derive(Default)]
pub struct FakeService {
    store: Mutex<Store>,
}

impl FakeService {
    pub fn with_users(names: &[&str]) -> Self {
        let service = Self::default();
        {
            let mut store = service.store.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                store.users.push(User {
                    id: (i + 1).to_string(),
                    name: name.to_string(),
                });
                store.todos.insert(name.to_string(), Vec::new());
            }
        }
        service
    }

    /// Replace `user`'s stored list verbatim.
    pub fn seed(&self, user: &str, todos: Vec<Todo>) {
        self.store.lock().unwrap().todos.insert(user.to_string(), todos);
    }

    /// Make every call to `operation` fail with a transport error.
    pub fn fail(&self, operation: &'static str) {
        self.store.lock().unwrap().failing.insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.store.lock().unwrap().failing.remove(operation);
    }

    /// Answer list requests with a non-list `todoList`.
    pub fn malformed_lists(&self) {
        self.store.lock().unwrap().malformed_lists = true;
    }

    /// Hold every `operation` call for `user` for `delay` before answering.
    pub fn delay(&self, operation: &str, user: &str, delay: Duration) {
        self.store
            .lock()
            .unwrap()
            .delays
            .insert(format!("{operation}:{user}"), delay);
    }

    async fn stall(&self, operation: &str, user: &str) {
        let delay = self.store.lock().unwrap().delays.get(&format!("{operation}:{user}")).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.store.lock().unwrap().calls.clone()
    }

    fn enter(&self, operation: &'static str, user: &str) -> Result<std::sync::MutexGuard<'_, Store>, ApiError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(format!("{operation}:{user}"));
        if store.failing.contains(operation) {
            return Err(ApiError::Transport("network unreachable".to_string()));
        }
        Ok(store)
    }
}

fn list_mut<'a>(store: &'a mut Store, user: &str) -> Result<&'a mut Vec<Todo>, ApiError> {
    store.todos.get_mut(user).ok_or(ApiError::NotFound)
}

fn item_mut<'a>(store: &'a mut Store, user: &str, id: &str) -> Result<&'a mut Todo, ApiError> {
    list_mut(store, user)?
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or(ApiError::NotFound)
}

#[async_trait]
impl RemoteTodoService for FakeService {
    async fn get_user_list(&self) -> Result<Vec<User>, ApiError> {
        let store = self.enter("users", "")?;
        Ok(store.users.clone())
    }

    async fn get_todo_list(&self, user_name: &str) -> Result<TodoListEnvelope, ApiError> {
        self.stall("list", user_name).await;
        let mut store = self.enter("list", user_name)?;
        if store.malformed_lists {
            return Err(ApiError::MalformedResponse("todoList is not a list: 3".to_string()));
        }
        let todo_list = list_mut(&mut store, user_name)?.clone();
        Ok(TodoListEnvelope { todo_list })
    }

    async fn add_todo(&self, user_name: &str, contents: &str) -> Result<Todo, ApiError> {
        self.stall("add", user_name).await;
        let mut store = self.enter("add", user_name)?;
        store.next_id += 1;
        let todo = Todo {
            id: format!("t{}", store.next_id),
            contents: contents.to_string(),
            is_completed: false,
            priority: Priority::None,
            owner_name: user_name.to_string(),
        };
        list_mut(&mut store, user_name)?.push(todo.clone());
        Ok(todo)
    }

    async fn edit_todo(&self, user_name: &str, id: &str, contents: &str) -> Result<Todo, ApiError> {
        let mut store = self.enter("edit", user_name)?;
        let todo = item_mut(&mut store, user_name, id)?;
        todo.contents = contents.to_string();
        Ok(todo.clone())
    }

    async fn toggle_todo(&self, user_name: &str, id: &str) -> Result<TodoRef, ApiError> {
        let mut store = self.enter("toggle", user_name)?;
        let todo = item_mut(&mut store, user_name, id)?;
        todo.is_completed = !todo.is_completed;
        Ok(TodoRef { id: todo.id.clone() })
    }

    async fn set_priority(&self, user_name: &str, id: &str, priority: Priority) -> Result<Todo, ApiError> {
        let mut store = self.enter("priority", user_name)?;
        let todo = item_mut(&mut store, user_name, id)?;
        todo.priority = priority;
        Ok(todo.clone())
    }

    async fn delete_todo(&self, user_name: &str, id: &str) -> Result<TodoListEnvelope, ApiError> {
        let mut store = self.enter("delete", user_name)?;
        let todos = list_mut(&mut store, user_name)?;
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        if todos.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(TodoListEnvelope {
            todo_list: todos.clone(),
        })
    }
}

pub fn todo(id: &str, contents: &str, is_completed: bool, owner: &str) -> Todo {
    Todo {
        id: id.to_string(),
        contents: contents.to_string(),
        is_completed,
        priority: Priority::None,
        owner_name: owner.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Recording widgets
// ---------------------------------------------------------------------------

pub type History<S> = Arc<Mutex<Vec<S>>>;

struct Recording<S>(History<S>);

impl<S: Send> Widget<S> for Recording<S> {
    fn set_state(&mut self, state: S) {
        self.0.lock().unwrap().push(state);
    }
}

/// A `WidgetFactory` whose widgets append every slice they receive,
/// starting with the initial one, to a shared history.
#[derive(Clone, Default)]
pub struct Screen {
    pub users: History<UsersView>,
    pub todo_list: History<Vec<Todo>>,
    pub todo_count: History<usize>,
    pub todo_filter: History<FilterMode>,
    pub errors: History<Option<String>>,
    pub skeleton: History<bool>,
    pub constructed: History<&'static str>,
}

fn last<S: Clone>(history: &History<S>) -> Option<S> {
    history.lock().unwrap().last().cloned()
}

impl Screen {
    pub fn list(&self) -> Vec<Todo> {
        last(&self.todo_list).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        last(&self.todo_count).unwrap_or_default()
    }

    pub fn filter(&self) -> FilterMode {
        last(&self.todo_filter).unwrap_or_default()
    }

    pub fn error(&self) -> Option<String> {
        last(&self.errors).flatten()
    }

    pub fn loading(&self) -> bool {
        last(&self.skeleton).unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<User> {
        last(&self.users).map(|view| view.current_user)
    }

    pub fn list_renders(&self) -> usize {
        self.todo_list.lock().unwrap().len()
    }

    fn record<S: Send + 'static>(&self, name: &'static str, history: &History<S>, initial: Option<S>) -> Box<dyn Widget<S>> {
        self.constructed.lock().unwrap().push(name);
        if let Some(initial) = initial {
            history.lock().unwrap().push(initial);
        }
        Box::new(Recording(Arc::clone(history)))
    }
}

impl WidgetFactory for Screen {
    fn user_picker(&mut self, initial: UsersView, _intents: IntentSender) -> Box<dyn Widget<UsersView>> {
        let history = Arc::clone(&self.users);
        self.record("users", &history, Some(initial))
    }

    fn todo_input(&mut self, _intents: IntentSender) {
        self.constructed.lock().unwrap().push("input");
    }

    fn todo_list(&mut self, initial: Vec<Todo>, _intents: IntentSender) -> Box<dyn Widget<Vec<Todo>>> {
        let history = Arc::clone(&self.todo_list);
        self.record("list", &history, Some(initial))
    }

    fn todo_count(&mut self, initial: usize) -> Box<dyn Widget<usize>> {
        let history = Arc::clone(&self.todo_count);
        self.record("count", &history, Some(initial))
    }

    fn todo_filter(&mut self, initial: FilterMode, _intents: IntentSender) -> Box<dyn Widget<FilterMode>> {
        let history = Arc::clone(&self.todo_filter);
        self.record("filter", &history, Some(initial))
    }

    fn error_banner(&mut self, initial: Option<String>) -> Box<dyn Widget<Option<String>>> {
        let history = Arc::clone(&self.errors);
        self.record("error", &history, Some(initial))
    }

    fn loading_skeleton(&mut self) -> Box<dyn Widget<bool>> {
        let history = Arc::clone(&self.skeleton);
        self.record("skeleton", &history, None)
    }
}

//! The application state coordinator.
//!
//! # Design
//! `AppCoordinator` owns the canonical `AppState` and is the only place it
//! changes. Every intent follows the same path: call the remote service,
//! validate what came back, merge it into state, re-render. Failures are
//! logged and pushed to the error widget; nothing propagates to the caller.
//!
//! State and widgets sit behind one `tokio::sync::Mutex` that is never held
//! across a remote call. Overlapping intents therefore interleave at merge
//! time and the last write to `todo_list` wins. `serialize_intents` turns the
//! intent loop into a single-flight queue instead.
//!
//! Add, edit, toggle and priority patch the local list by the identifier the
//! server returned; delete replaces the list with the server's remaining
//! list. Filtering only ever pushes projections to widgets: the canonical
//! list is never overwritten by a filtered view.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Operation};
use crate::service::RemoteTodoService;
use crate::types::{FilterMode, Priority, Todo, User};
use crate::widget::{Intent, IntentReceiver, IntentSender, UsersView, WidgetFactory, Widgets};

/// Canonical application state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub users: Vec<User>,
    pub current_user: User,
    /// Server order, not sorted.
    pub todo_list: Vec<Todo>,
    pub todo_count: usize,
    pub todo_filter: FilterMode,
}

#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    /// Preferred user name, used when it is still in the fetched user list.
    pub remembered_user: Option<String>,
    /// Handle intents one at a time in arrival order.
    pub serialize_intents: bool,
}

/// Why a todo list was refused by the merge gate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("todo at position {0} has an empty id")]
    EmptyId(usize),

    #[error("duplicate todo id {0:?}")]
    DuplicateId(String),

    #[error("todo {id:?} belongs to {owner:?}, not {expected:?}")]
    ForeignOwner { id: String, owner: String, expected: String },
}

/// Check that `todos` can be accepted as `owner`'s list.
pub fn validate_todo_list(todos: &[Todo], owner: &str) -> Result<(), Rejection> {
    let mut seen = HashSet::with_capacity(todos.len());
    for (index, todo) in todos.iter().enumerate() {
        if todo.id.is_empty() {
            return Err(Rejection::EmptyId(index));
        }
        if !seen.insert(todo.id.as_str()) {
            return Err(Rejection::DuplicateId(todo.id.clone()));
        }
        if todo.owner_name != owner {
            return Err(Rejection::ForeignOwner {
                id: todo.id.clone(),
                owner: todo.owner_name.clone(),
                expected: owner.to_string(),
            });
        }
    }
    Ok(())
}

struct Inner {
    state: AppState,
    widgets: Option<Widgets>,
    last_error: Option<String>,
    initialized: bool,
    /// Todo loads started but not yet merged; the skeleton hides at zero.
    loads_in_flight: usize,
}

impl Inner {
    fn users_view(&self) -> UsersView {
        UsersView {
            users: self.state.users.clone(),
            current_user: self.state.current_user.clone(),
        }
    }

    /// Accept `todos` as the new canonical list and re-render.
    fn merge(&mut self, todos: Vec<Todo>) -> bool {
        if let Err(rejection) = validate_todo_list(&todos, &self.state.current_user.name) {
            warn!(%rejection, "discarding todo list");
            return false;
        }
        self.state.todo_count = todos.len();
        self.state.todo_list = todos;
        self.render();
        true
    }

    /// Push the unfiltered canonical state to every widget.
    fn render(&mut self) {
        self.state.todo_filter = FilterMode::All;
        let users = self.users_view();
        let Some(widgets) = self.widgets.as_mut() else {
            return;
        };
        widgets.users.set_state(users);
        widgets.todo_list.set_state(self.state.todo_list.clone());
        widgets.todo_count.set_state(self.state.todo_count);
        widgets.todo_filter.set_state(self.state.todo_filter);
    }

    fn report(&mut self, err: AppError) {
        error!(error = %err, "operation failed");
        let message = err.to_string();
        self.last_error = Some(message.clone());
        if let Some(widgets) = self.widgets.as_mut() {
            widgets.error.set_state(Some(message));
        }
    }

    fn show_loading(&mut self, loading: bool) {
        if let Some(widgets) = self.widgets.as_mut() {
            widgets.skeleton.set_state(loading);
        }
    }

    fn begin_load(&mut self) {
        self.loads_in_flight += 1;
        self.show_loading(true);
    }

    fn finish_load(&mut self) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        if self.loads_in_flight == 0 {
            self.show_loading(false);
        }
    }

    fn patch(&mut self, id: &str, apply: impl Fn(&mut Todo)) {
        let mut todos = self.state.todo_list.clone();
        todos.iter_mut().filter(|todo| todo.id == id).for_each(apply);
        self.merge(todos);
    }
}

/// Owns `AppState`, mediates every change through the remote service and
/// pushes the results to the widgets.
pub struct AppCoordinator<S> {
    service: S,
    config: CoordinatorConfig,
    inner: Mutex<Inner>,
}

impl<S: RemoteTodoService> AppCoordinator<S> {
    pub fn new(service: S, config: CoordinatorConfig) -> Self {
        Self {
            service,
            config,
            inner: Mutex::new(Inner {
                state: AppState::default(),
                widgets: None,
                last_error: None,
                initialized: false,
                loads_in_flight: 0,
            }),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// A copy of the canonical state.
    pub async fn snapshot(&self) -> AppState {
        self.inner.lock().await.state.clone()
    }

    /// The message most recently sent to the error widget.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    pub async fn current_user(&self) -> User {
        self.inner.lock().await.state.current_user.clone()
    }

    /// Load users, pick the current one, build the widgets, then load the
    /// current user's todos.
    ///
    /// Runs once; later calls are ignored. A failed user load is reported
    /// through the error widget and the widgets are still built.
    pub async fn initialize(&self, factory: &mut dyn WidgetFactory, intents: IntentSender) {
        {
            let mut inner = self.inner.lock().await;
            if inner.initialized {
                warn!("coordinator already initialized");
                return;
            }
            inner.initialized = true;
            inner.state = AppState::default();
        }

        self.load_users().await;

        {
            let mut inner = self.inner.lock().await;
            let users = factory.user_picker(inner.users_view(), intents.clone());
            factory.todo_input(intents.clone());
            let todo_list = factory.todo_list(inner.state.todo_list.clone(), intents.clone());
            let todo_count = factory.todo_count(inner.state.todo_count);
            let todo_filter = factory.todo_filter(inner.state.todo_filter, intents);
            let error = factory.error_banner(inner.last_error.clone());
            let skeleton = factory.loading_skeleton();
            inner.widgets = Some(Widgets {
                users,
                todo_list,
                todo_count,
                todo_filter,
                error,
                skeleton,
            });
        }
        info!("widgets constructed");

        self.load_todos().await;
    }

    async fn load_users(&self) {
        let users = match self.service.get_user_list().await {
            Ok(users) => users,
            Err(err) => {
                self.inner.lock().await.report(AppError::Initialization(err));
                return;
            }
        };

        let remembered = self
            .config
            .remembered_user
            .as_deref()
            .and_then(|name| users.iter().find(|user| user.name == name));
        let selected = remembered.or_else(|| users.first()).cloned();
        info!(count = users.len(), "loaded users");

        self.inner.lock().await.state.users = users;
        match selected {
            Some(user) => self.set_user(user).await,
            None => warn!("user list is empty"),
        }
    }

    /// Fetch the current user's todos, showing the loading skeleton meanwhile.
    ///
    /// The skeleton stays up until every overlapping load has finished. A
    /// list that arrives after the current user changed is dropped.
    pub async fn load_todos(&self) {
        let user_name = {
            let mut inner = self.inner.lock().await;
            if inner.state.current_user.is_placeholder() {
                debug!("no current user, skipping todo load");
                return;
            }
            inner.begin_load();
            inner.state.current_user.name.clone()
        };

        let result = self.service.get_todo_list(&user_name).await;

        let mut inner = self.inner.lock().await;
        inner.finish_load();
        if inner.state.current_user.name != user_name {
            debug!(user = %user_name, "user changed during load, dropping result");
            return;
        }
        match result {
            Ok(envelope) => {
                debug!(user = %user_name, count = envelope.todo_list.len(), "loaded todos");
                inner.merge(envelope.todo_list);
            }
            Err(err) => inner.report(AppError::Load(err)),
        }
    }

    /// Make `user` current and, once the widgets exist, load their todos.
    pub async fn set_user(&self, user: User) {
        let widgets_ready = {
            let mut inner = self.inner.lock().await;
            info!(user = %user.name, "current user changed");
            inner.state.current_user = user;
            inner.widgets.is_some()
        };
        if widgets_ready {
            self.load_todos().await;
        }
    }

    async fn select_user(&self, name: &str) {
        let user = {
            let inner = self.inner.lock().await;
            inner.state.users.iter().find(|user| user.name == name).cloned()
        };
        match user {
            Some(user) => self.set_user(user).await,
            None => warn!(user = %name, "ignoring selection of unknown user"),
        }
    }

    async fn current_user_name(&self) -> String {
        self.inner.lock().await.state.current_user.name.clone()
    }

    pub async fn add_todo(&self, contents: &str) {
        let user_name = self.current_user_name().await;
        let result = self.service.add_todo(&user_name, contents).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(todo) => {
                let mut todos = inner.state.todo_list.clone();
                todos.push(todo);
                inner.merge(todos);
            }
            Err(err) => inner.report(AppError::operation(Operation::Add, err)),
        }
    }

    pub async fn edit_todo(&self, id: &str, contents: &str) {
        let user_name = self.current_user_name().await;
        let result = self.service.edit_todo(&user_name, id, contents).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(edited) => inner.patch(&edited.id, |todo| todo.contents = edited.contents.clone()),
            Err(err) => inner.report(AppError::operation(Operation::Edit, err)),
        }
    }

    /// The service returns only the id; the local flag is flipped.
    pub async fn toggle_todo(&self, id: &str) {
        let user_name = self.current_user_name().await;
        let result = self.service.toggle_todo(&user_name, id).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(toggled) => inner.patch(&toggled.id, |todo| todo.is_completed = !todo.is_completed),
            Err(err) => inner.report(AppError::operation(Operation::Toggle, err)),
        }
    }

    pub async fn set_priority(&self, id: &str, priority: Priority) {
        let user_name = self.current_user_name().await;
        let result = self.service.set_priority(&user_name, id, priority).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(updated) => inner.patch(&updated.id, |todo| todo.priority = updated.priority),
            Err(err) => inner.report(AppError::operation(Operation::SetPriority, err)),
        }
    }

    /// Replaces the whole list with what the service says remains.
    pub async fn delete_todo(&self, id: &str) {
        let user_name = self.current_user_name().await;
        let result = self.service.delete_todo(&user_name, id).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(remaining) => {
                inner.merge(remaining.todo_list);
            }
            Err(err) => inner.report(AppError::operation(Operation::Delete, err)),
        }
    }

    /// Show the todos matching `mode`.
    ///
    /// Only the list, count and filter widgets receive the projection; the
    /// canonical list and count stay untouched, so switching back to
    /// `FilterMode::All` needs no network round-trip.
    pub async fn filter_todo(&self, mode: FilterMode) {
        let mut inner = self.inner.lock().await;
        if mode == FilterMode::All {
            inner.render();
            return;
        }

        let projection: Vec<Todo> = inner
            .state
            .todo_list
            .iter()
            .filter(|todo| mode.matches(todo))
            .cloned()
            .collect();
        inner.state.todo_filter = mode;
        if let Some(widgets) = inner.widgets.as_mut() {
            widgets.todo_count.set_state(projection.len());
            widgets.todo_list.set_state(projection);
            widgets.todo_filter.set_state(mode);
        }
    }

    /// Re-sync every widget with the canonical state.
    pub async fn render(&self) {
        self.inner.lock().await.render();
    }

    /// Route one intent to its handler.
    pub async fn dispatch(&self, intent: Intent) {
        debug!(?intent, "dispatching intent");
        match intent {
            Intent::Add { contents } => self.add_todo(&contents).await,
            Intent::Edit { id, contents } => self.edit_todo(&id, &contents).await,
            Intent::Delete { id } => self.delete_todo(&id).await,
            Intent::Toggle { id } => self.toggle_todo(&id).await,
            Intent::SetPriority { id, priority } => self.set_priority(&id, priority).await,
            Intent::SelectUser { name } => self.select_user(&name).await,
            Intent::SelectFilter { mode } => self.filter_todo(mode).await,
        }
    }
}

impl<S: RemoteTodoService + 'static> AppCoordinator<S> {
    /// Consume intents until every sender is gone.
    ///
    /// Each intent runs on its own task unless `serialize_intents` is set,
    /// in which case the next intent waits for the previous one to finish.
    /// Returns only after every started intent has completed.
    pub async fn run(self: Arc<Self>, mut intents: IntentReceiver) {
        info!(serialized = self.config.serialize_intents, "intent loop started");
        let mut pending = JoinSet::new();
        while let Some(intent) = intents.recv().await {
            if self.config.serialize_intents {
                self.dispatch(intent).await;
            } else {
                let coordinator = Arc::clone(&self);
                pending.spawn(async move { coordinator.dispatch(intent).await });
                // Reap finished tasks so the set does not grow with the session.
                while pending.try_join_next().is_some() {}
            }
        }
        if !pending.is_empty() {
            debug!(count = pending.len(), "waiting for in-flight intents");
        }
        while let Some(joined) = pending.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "intent task failed");
            }
        }
        info!("intent channel closed");
    }
}

//! Display widgets and the intents they emit.
//!
//! # Design
//! Widgets never see `AppState`. The coordinator pushes owned snapshots of
//! the slice each widget renders through `Widget::set_state`, and widgets talk
//! back only by sending an `Intent` down the channel they were constructed
//! with. Widgets do not know about each other.

use tokio::sync::mpsc;

use crate::types::{FilterMode, Priority, Todo, User};

/// A user-initiated action signaled by a widget to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add { contents: String },
    Edit { id: String, contents: String },
    Delete { id: String },
    Toggle { id: String },
    SetPriority { id: String, priority: Priority },
    /// Select the user with this name.
    SelectUser { name: String },
    SelectFilter { mode: FilterMode },
}

pub type IntentSender = mpsc::UnboundedSender<Intent>;
pub type IntentReceiver = mpsc::UnboundedReceiver<Intent>;

pub fn intent_channel() -> (IntentSender, IntentReceiver) {
    mpsc::unbounded_channel()
}

/// A component that re-renders itself from a state slice.
///
/// `set_state` must be idempotent: rendering the same slice twice shows the
/// same thing, and nothing but the slice decides what is shown.
pub trait Widget<S>: Send {
    fn set_state(&mut self, state: S);
}

/// Slice pushed to the user picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsersView {
    pub users: Vec<User>,
    pub current_user: User,
}

/// Builds the display widgets during initialization.
///
/// Each constructor receives the widget's initial slice and, for widgets
/// that emit intents, a sender for them.
pub trait WidgetFactory: Send {
    fn user_picker(&mut self, initial: UsersView, intents: IntentSender) -> Box<dyn Widget<UsersView>>;

    /// The input box renders no state; it only emits `Intent::Add`.
    fn todo_input(&mut self, intents: IntentSender);

    fn todo_list(&mut self, initial: Vec<Todo>, intents: IntentSender) -> Box<dyn Widget<Vec<Todo>>>;

    fn todo_count(&mut self, initial: usize) -> Box<dyn Widget<usize>>;

    fn todo_filter(&mut self, initial: FilterMode, intents: IntentSender) -> Box<dyn Widget<FilterMode>>;

    /// Shows the most recent error message, or nothing for `None`.
    fn error_banner(&mut self, initial: Option<String>) -> Box<dyn Widget<Option<String>>>;

    /// `true` while a todo list is loading.
    fn loading_skeleton(&mut self) -> Box<dyn Widget<bool>>;
}

/// The constructed widget set held by the coordinator.
pub(crate) struct Widgets {
    pub(crate) users: Box<dyn Widget<UsersView>>,
    pub(crate) todo_list: Box<dyn Widget<Vec<Todo>>>,
    pub(crate) todo_count: Box<dyn Widget<usize>>,
    pub(crate) todo_filter: Box<dyn Widget<FilterMode>>,
    pub(crate) error: Box<dyn Widget<Option<String>>>,
    pub(crate) skeleton: Box<dyn Widget<bool>>,
}

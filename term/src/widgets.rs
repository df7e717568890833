//! Widgets that render state slices as lines on stdout.

use std::sync::{Arc, Mutex, PoisonError};

use todo_core::{FilterMode, IntentSender, Priority, Todo, UsersView, Widget, WidgetFactory};

/// Ids of the todos currently on screen, in display order. Written by the
/// list widget, read by the prompt to resolve positions.
pub type Visible = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct TermFactory {
    visible: Visible,
    input: Option<IntentSender>,
}

impl TermFactory {
    pub fn visible(&self) -> Visible {
        Arc::clone(&self.visible)
    }

    /// The sender handed to the todo input, once it has been constructed.
    pub fn take_input(&mut self) -> Option<IntentSender> {
        self.input.take()
    }
}

impl WidgetFactory for TermFactory {
    fn user_picker(&mut self, initial: UsersView, _intents: IntentSender) -> Box<dyn Widget<UsersView>> {
        mounted(UserPicker, initial)
    }

    fn todo_input(&mut self, intents: IntentSender) {
        self.input = Some(intents);
    }

    fn todo_list(&mut self, initial: Vec<Todo>, _intents: IntentSender) -> Box<dyn Widget<Vec<Todo>>> {
        mounted(
            TodoList {
                visible: Arc::clone(&self.visible),
            },
            initial,
        )
    }

    fn todo_count(&mut self, initial: usize) -> Box<dyn Widget<usize>> {
        mounted(TodoCount, initial)
    }

    fn todo_filter(&mut self, initial: FilterMode, _intents: IntentSender) -> Box<dyn Widget<FilterMode>> {
        mounted(TodoFilter, initial)
    }

    fn error_banner(&mut self, initial: Option<String>) -> Box<dyn Widget<Option<String>>> {
        mounted(ErrorBanner, initial)
    }

    fn loading_skeleton(&mut self) -> Box<dyn Widget<bool>> {
        Box::new(Skeleton)
    }
}

fn mounted<S: 'static, W: Widget<S> + 'static>(mut widget: W, initial: S) -> Box<dyn Widget<S>> {
    widget.set_state(initial);
    Box::new(widget)
}

struct UserPicker;

impl Widget<UsersView> for UserPicker {
    fn set_state(&mut self, state: UsersView) {
        println!("{}", users_line(&state));
    }
}

struct TodoList {
    visible: Visible,
}

impl Widget<Vec<Todo>> for TodoList {
    fn set_state(&mut self, state: Vec<Todo>) {
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        *visible = state.iter().map(|todo| todo.id.clone()).collect();
        if state.is_empty() {
            println!("  (nothing to do)");
        }
        for (index, todo) in state.iter().enumerate() {
            println!("{}", todo_line(index + 1, todo));
        }
    }
}

struct TodoCount;

impl Widget<usize> for TodoCount {
    fn set_state(&mut self, state: usize) {
        let noun = if state == 1 { "item" } else { "items" };
        println!("{state} {noun}");
    }
}

struct TodoFilter;

impl Widget<FilterMode> for TodoFilter {
    fn set_state(&mut self, state: FilterMode) {
        let label = match state {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        };
        println!("filter: {label}");
    }
}

struct ErrorBanner;

impl Widget<Option<String>> for ErrorBanner {
    fn set_state(&mut self, state: Option<String>) {
        if let Some(message) = state {
            println!("! {message}");
        }
    }
}

struct Skeleton;

impl Widget<bool> for Skeleton {
    fn set_state(&mut self, state: bool) {
        if state {
            println!("  loading...");
        }
    }
}

fn users_line(view: &UsersView) -> String {
    let names: Vec<String> = view
        .users
        .iter()
        .map(|user| {
            if user.id == view.current_user.id {
                format!("[{}]", user.name)
            } else {
                user.name.clone()
            }
        })
        .collect();
    format!("users: {}", names.join(" "))
}

fn todo_line(position: usize, todo: &Todo) -> String {
    let mark = if todo.is_completed { "x" } else { " " };
    let priority = match todo.priority {
        Priority::None => String::new(),
        other => format!(" ({other})"),
    };
    format!("{position:>3}. [{mark}] {}{priority}", todo.contents)
}

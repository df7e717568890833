//! Client core for the todo service.
//!
//! # Overview
//! `AppCoordinator` owns the application state of a task-list client:
//! which users exist, who is selected, and that user's todos. Widgets emit
//! `Intent`s, the coordinator carries them out against a
//! `RemoteTodoService`, merges the confirmed result and pushes fresh state
//! slices back to every widget.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, and a `Transport` does the I/O in
//!   between (host-does-IO).
//! - `HttpTodoService` glues client and transport into a `RemoteTodoService`;
//!   tests substitute in-memory services.
//! - Widgets only ever receive owned snapshots; the coordinator is the single
//!   place state changes.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod service;
pub mod types;
pub mod widget;

pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use coordinator::{validate_todo_list, AppCoordinator, AppState, CoordinatorConfig, Rejection};
pub use error::{ApiError, AppError, Operation};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use service::{HttpTodoService, RemoteTodoService};
pub use types::{FilterMode, Priority, Todo, TodoListEnvelope, TodoRef, User};
pub use widget::{intent_channel, Intent, IntentReceiver, IntentSender, UsersView, Widget, WidgetFactory};

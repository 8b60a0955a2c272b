//! A terminal Kanban board: tasks live in five fixed columns, are moved by
//! dragging them with the mouse, and are written through to local storage
//! after every change.

pub mod config;
pub mod controller;
pub mod drag;
pub mod error;
pub mod logging;
pub mod storage;
pub mod task;
pub mod task_store;
pub mod theme;
pub mod ui;

pub use controller::BoardController;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use task::{Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
pub use task_store::TaskStore;

pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod due;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod page;
pub mod storage;
pub mod ui;

pub use app::{router, AppState};
pub use client::{HttpTaskApi, TaskApi};
pub use controller::{ClickEffect, SaveHandle, SaveOutcome, TaskListController};
pub use page::{NodeId, Page};
pub use storage::{load_data, resolve_data_path};

use crate::handlers;
use crate::models::AppData;
use axum::{
    routing::{get, patch},
    Router,
};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared by every handler: the task file and its in-memory copy.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::add_task))
        .route(
            "/delete/:task_id",
            get(handlers::delete_task).post(handlers::delete_task),
        )
        .route("/edit_task/:task_id", patch(handlers::edit_task))
        .route("/api/tasks", get(handlers::list_tasks))
        .with_state(state)
}

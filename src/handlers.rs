use crate::app::AppState;
use crate::errors::AppError;
use crate::models::{AddTaskForm, EditTaskRequest, EditTaskResponse, Task, TaskId};
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{NaiveDate, Utc};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    Html(render_index(&data, Utc::now()))
}

pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let data = state.data.lock().await;
    let mut tasks = data.tasks.clone();
    tasks.sort_by_key(|task| (task.due_date, task.id));
    Json(tasks)
}

pub async fn add_task(
    State(state): State<AppState>,
    Form(form): Form<AddTaskForm>,
) -> Result<Redirect, AppError> {
    let text = form.task.trim();
    if text.is_empty() {
        return Err(AppError::bad_request("task must not be empty"));
    }
    let due_date = parse_due_date(&form.due_date)?;

    let mut data = state.data.lock().await;
    data.next_id += 1;
    let id = TaskId(data.next_id);
    data.tasks.push(Task {
        id,
        text: text.to_string(),
        due_date,
        selected: form.selected.is_some(),
        category: form.category,
    });
    persist_data(&state.data_path, &data).await?;

    info!(task_id = %id, "task added");
    Ok(Redirect::to("/"))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Redirect, AppError> {
    let mut data = state.data.lock().await;
    let position = data
        .tasks
        .iter()
        .position(|task| task.id == task_id)
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    data.tasks.remove(position);
    persist_data(&state.data_path, &data).await?;

    info!(%task_id, "task deleted");
    Ok(Redirect::to("/"))
}

pub async fn edit_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
    Json(payload): Json<EditTaskRequest>,
) -> Result<Json<EditTaskResponse>, AppError> {
    let due_date = payload
        .due_date
        .as_deref()
        .map(parse_due_date)
        .transpose()?;

    let mut data = state.data.lock().await;
    {
        let task = data
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| AppError::not_found("Task not found"))?;
        if let Some(text) = payload.task_text {
            task.text = text;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
    }
    persist_data(&state.data_path, &data).await?;

    info!(%task_id, "task edited");
    Ok(Json(EditTaskResponse { success: true }))
}

fn parse_due_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("due_date must be YYYY-MM-DD, got {value:?}")))
}

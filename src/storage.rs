use crate::errors::AppError;
use crate::models::AppData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, error};

pub const DEFAULT_DATA_PATH: &str = "data/tasks.json";

pub fn resolve_data_path() -> PathBuf {
    match env::var("APP_DATA_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from(DEFAULT_DATA_PATH),
    }
}

pub async fn load_data(path: &Path) -> AppData {
    let mut data = match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse task file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read task file: {err}");
            AppData::default()
        }
    };
    reserve_ids(&mut data);
    debug!(tasks = data.tasks.len(), "loaded task file");
    data
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Keeps `next_id` ahead of every stored task so new ids never collide.
fn reserve_ids(data: &mut AppData) {
    let highest = data.tasks.iter().map(|task| task.id.0).max().unwrap_or(0);
    data.next_id = data.next_id.max(highest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Task, TaskId};
    use chrono::NaiveDate;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("task_list_{}_{name}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let data = load_data(&temp_path("missing")).await;
        assert!(data.tasks.is_empty());
        assert_eq!(data.next_id, 0);
    }

    #[tokio::test]
    async fn load_repairs_stale_next_id() {
        let path = temp_path("stale_next_id");
        let data = AppData {
            next_id: 1,
            tasks: vec![Task {
                id: TaskId(9),
                text: "Renew passport".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
                selected: false,
                category: Category::Personal,
            }],
        };
        persist_data(&path, &data).await.unwrap();

        let loaded = load_data(&path).await;
        let _ = fs::remove_file(&path).await;
        assert_eq!(loaded.next_id, 9);
        assert_eq!(loaded.tasks, data.tasks);
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{ not json").await.unwrap();
        let data = load_data(&path).await;
        let _ = fs::remove_file(&path).await;
        assert!(data.tasks.is_empty());
    }
}

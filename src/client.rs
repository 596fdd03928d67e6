use crate::config;
use crate::errors::ApiError;
use crate::models::{TaskEdit, TaskId};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// The network seam of the controller.
///
/// `HttpTaskApi` talks to a running server; tests substitute their own
/// implementation to observe and steer requests.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Sends `PATCH /edit_task/{task_id}` and returns the decoded JSON reply.
    /// A non-2xx status is an error even when its body is JSON.
    async fn edit_task(&self, task_id: TaskId, edit: &TaskEdit) -> Result<Value, ApiError>;
}

pub struct HttpTaskApi {
    base_url: String,
    client: Client,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(&config::client_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn edit_task(&self, task_id: TaskId, edit: &TaskEdit) -> Result<Value, ApiError> {
        let resp = self
            .client
            .patch(format!("{}/edit_task/{task_id}", self.base_url))
            .json(edit)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            resp.json::<Value>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(String::from))
                .unwrap_or(body);
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::patch, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn edit() -> TaskEdit {
        TaskEdit {
            task_text: "Call mum".to_string(),
            due_date: "2026-10-20".to_string(),
        }
    }

    #[tokio::test]
    async fn closed_port_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = HttpTaskApi::new(&format!("http://127.0.0.1:{port}"));

        let err = api.edit_task(TaskId(1), &edit()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err}");
    }

    #[tokio::test]
    async fn success_without_json_is_a_decode_error() {
        let base_url = serve(Router::new().route(
            "/edit_task/:task_id",
            patch(|| async { "task saved" }),
        ))
        .await;

        let err = HttpTaskApi::new(&base_url)
            .edit_task(TaskId(1), &edit())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "got {err}");
    }

    #[tokio::test]
    async fn error_status_keeps_plain_body_as_message() {
        let base_url = serve(Router::new().route(
            "/edit_task/:task_id",
            patch(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        ))
        .await;

        let err = HttpTaskApi::new(&base_url)
            .edit_task(TaskId(1), &edit())
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn base_url_drops_trailing_slashes() {
        let api = HttpTaskApi::new("http://127.0.0.1:8080//");
        assert_eq!(api.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn edit_body_uses_wire_field_names() {
        assert_eq!(
            serde_json::to_value(edit()).unwrap(),
            serde_json::json!({ "task_text": "Call mum", "due_date": "2026-10-20" })
        );
    }
}

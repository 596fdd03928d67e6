use crate::storage::resolve_data_path;
use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            port,
            data_path: resolve_data_path(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Where the page's save requests go, from `TASK_LIST_URL`.
pub fn client_base_url() -> String {
    env::var("TASK_LIST_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpTaskApi;
    use crate::storage::DEFAULT_DATA_PATH;

    // The only test in this crate that touches these variables, so nothing
    // else reads them while they change.
    #[test]
    fn environment_overrides_and_defaults() {
        unsafe {
            env::set_var("TASK_LIST_URL", "http://tasks.internal:9000/");
            env::set_var("PORT", "9001");
            env::set_var("APP_DATA_PATH", "/srv/tasks/tasks.json");
        }
        assert_eq!(HttpTaskApi::from_env().base_url(), "http://tasks.internal:9000");
        let config = ServerConfig::from_env();
        assert_eq!(config.port, 9001);
        assert_eq!(config.addr(), SocketAddr::from(([0, 0, 0, 0], 9001)));
        assert_eq!(config.data_path, PathBuf::from("/srv/tasks/tasks.json"));

        unsafe {
            env::set_var("TASK_LIST_URL", "   ");
            env::set_var("PORT", "not-a-port");
        }
        assert_eq!(client_base_url(), DEFAULT_BASE_URL);
        assert_eq!(ServerConfig::from_env().port, DEFAULT_PORT);

        unsafe {
            env::remove_var("TASK_LIST_URL");
            env::remove_var("PORT");
            env::remove_var("APP_DATA_PATH");
        }
        assert_eq!(HttpTaskApi::from_env().base_url(), DEFAULT_BASE_URL);
        let config = ServerConfig::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn task_element_id(self) -> String {
        format!("task_{self}")
    }

    pub fn due_date_element_id(self) -> String {
        format!("due_date_{self}")
    }

    pub fn save_button_id(self) -> String {
        format!("save_button_{self}")
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Other];

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Other => "Other",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub selected: bool,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Body of `PATCH /edit_task/{id}` as sent by the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskEdit {
    pub task_text: String,
    pub due_date: String,
}

/// Body of `PATCH /edit_task/{id}` as accepted by the server. Absent fields
/// are left untouched.
#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    pub task_text: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditTaskResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    pub category: Category,
    pub task: String,
    pub due_date: String,
    pub selected: Option<String>,
}

//! The task list page controller.
//!
//! Every operation runs against the [`Page`] it was given, so several
//! controllers can drive independent pages side by side. Saves of the same
//! task are serialized and coalesced: a save that is still waiting when a
//! newer one for that task arrives is dropped, and only the newest save may
//! hide the task's save button.

use crate::client::TaskApi;
use crate::due::mark_due_soon;
use crate::errors::{ApiError, ControllerError};
use crate::models::{TaskEdit, TaskId};
use crate::page::{NodeId, Page};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub const HIDDEN_FORM_CLASS: &str = "hid_form";
pub const LINE_THROUGH_CLASS: &str = "line-through";
pub const TASK_ID_ATTR: &str = "data-task-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    /// The target carried no task id.
    Ignored,
    ShowSave(TaskId),
    HideSave(TaskId),
}

#[derive(Debug)]
pub enum SaveOutcome {
    /// The server accepted the edit. `current` is false when a newer save
    /// for the same task was issued while this one was on the wire; the page
    /// is then left for the newer save to settle.
    Saved { response: Value, current: bool },
    /// A newer save for the same task was issued before this one was sent.
    Superseded,
    /// The request failed; the save button stays visible.
    Failed(ApiError),
}

/// A save running in the background.
pub struct SaveHandle {
    task_id: TaskId,
    handle: JoinHandle<SaveOutcome>,
}

impl SaveHandle {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub async fn outcome(self) -> Result<SaveOutcome, ControllerError> {
        Ok(self.handle.await?)
    }
}

#[derive(Default)]
struct SaveSlot {
    latest: AtomicU64,
    gate: Mutex<()>,
}

pub struct TaskListController<A> {
    page: Arc<Mutex<Page>>,
    api: Arc<A>,
    slots: Arc<Mutex<HashMap<TaskId, Arc<SaveSlot>>>>,
}

impl<A> Clone for TaskListController<A> {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            api: Arc::clone(&self.api),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<A: TaskApi + 'static> TaskListController<A> {
    pub fn new(page: Page, api: Arc<A>) -> Self {
        Self {
            page: Arc::new(Mutex::new(page)),
            api,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The page this controller drives. Hosts edit task text through it.
    pub fn page(&self) -> &Arc<Mutex<Page>> {
        &self.page
    }

    /// Shows the add-task form when it is hidden, hides it otherwise.
    pub async fn toggle_display(&self) -> Result<(), ControllerError> {
        let mut page = self.page.lock().await;
        let form = page
            .query_selector_class(HIDDEN_FORM_CLASS)
            .ok_or_else(|| ControllerError::MissingElement(format!(".{HIDDEN_FORM_CLASS}")))?;

        if page.style(form, "visibility") == Some("hidden") {
            page.set_style(form, "visibility", "visible");
            page.set_style(form, "display", "inline-block");
        } else {
            page.set_style(form, "visibility", "hidden");
            page.set_style(form, "display", "none");
        }
        Ok(())
    }

    /// Toggles the strikethrough on a task's text. Returns whether the task
    /// is struck through afterwards. Nothing is sent to the server.
    pub async fn cross_text(&self, task_id: TaskId) -> Result<bool, ControllerError> {
        let mut page = self.page.lock().await;
        let task = lookup(&page, &task_id.task_element_id())?;
        Ok(page.toggle_class(task, LINE_THROUGH_CLASS))
    }

    /// Delegated click handler for the whole page.
    pub async fn handle_click(&self, target: NodeId) -> Result<ClickEffect, ControllerError> {
        let mut page = self.page.lock().await;
        if !page.owns(target) {
            return Err(ControllerError::MissingElement(format!("{target:?}")));
        }
        let Some(raw) = page.attribute(target, TASK_ID_ATTR) else {
            return Ok(ClickEffect::Ignored);
        };
        let task_id: TaskId = raw
            .parse()
            .map_err(|_| ControllerError::InvalidTaskId(raw.to_string()))?;

        let task = lookup(&page, &task_id.task_element_id())?;
        let due_date = lookup(&page, &task_id.due_date_element_id())?;
        let save_button = lookup(&page, &task_id.save_button_id())?;

        if page.contains(task, target) || page.contains(due_date, target) {
            page.set_style(save_button, "display", "inline-block");
            Ok(ClickEffect::ShowSave(task_id))
        } else {
            page.set_style(save_button, "display", "none");
            Ok(ClickEffect::HideSave(task_id))
        }
    }

    /// Sends the task's current text and due date to the server.
    ///
    /// The texts are read now; the request runs in the background behind any
    /// earlier save of the same task. Tickets are issued under the page lock,
    /// so ticket order matches snapshot order.
    pub async fn save_task(&self, task_id: TaskId) -> Result<SaveHandle, ControllerError> {
        let (edit, slot, ticket) = {
            let page = self.page.lock().await;
            let task = lookup(&page, &task_id.task_element_id())?;
            let due_date = lookup(&page, &task_id.due_date_element_id())?;
            lookup(&page, &task_id.save_button_id())?;
            let edit = TaskEdit {
                task_text: page.inner_text(task),
                due_date: page.inner_text(due_date),
            };

            let slot = {
                let mut slots = self.slots.lock().await;
                Arc::clone(slots.entry(task_id).or_default())
            };
            let ticket = slot.latest.fetch_add(1, Ordering::SeqCst) + 1;
            (edit, slot, ticket)
        };

        let controller = self.clone();
        let handle =
            tokio::spawn(async move { controller.run_save(task_id, slot, ticket, edit).await });
        Ok(SaveHandle { task_id, handle })
    }

    /// Marks due-date labels that fall within the due-soon window of `now`.
    pub async fn highlight_due_dates(&self, now: DateTime<Utc>) -> usize {
        let mut page = self.page.lock().await;
        let marked = mark_due_soon(&mut page, now);
        debug!(marked, "highlighted due dates");
        marked
    }

    /// Load-time hook: highlights due dates against the current moment.
    pub async fn on_content_loaded(&self) -> usize {
        self.highlight_due_dates(Utc::now()).await
    }

    async fn run_save(
        &self,
        task_id: TaskId,
        slot: Arc<SaveSlot>,
        ticket: u64,
        edit: TaskEdit,
    ) -> SaveOutcome {
        let _gate = slot.gate.lock().await;
        if slot.latest.load(Ordering::SeqCst) != ticket {
            debug!(%task_id, ticket, "save superseded before sending");
            return SaveOutcome::Superseded;
        }

        let result = self.api.edit_task(task_id, &edit).await;
        let current = slot.latest.load(Ordering::SeqCst) == ticket;

        match result {
            Ok(response) => {
                info!(%task_id, %response, "task text updated");
                if current {
                    let mut page = self.page.lock().await;
                    match page.get_element_by_id(&task_id.save_button_id()) {
                        Some(button) => page.set_style(button, "display", "none"),
                        None => debug!(%task_id, "save button gone before save finished"),
                    }
                }
                SaveOutcome::Saved { response, current }
            }
            Err(err) => {
                error!(%task_id, "failed to save task: {err}");
                SaveOutcome::Failed(err)
            }
        }
    }
}

fn lookup(page: &Page, id: &str) -> Result<NodeId, ControllerError> {
    page.get_element_by_id(id)
        .ok_or_else(|| ControllerError::MissingElement(format!("#{id}")))
}

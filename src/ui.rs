use crate::controller::{HIDDEN_FORM_CLASS, TASK_ID_ATTR};
use crate::due::{mark_due_soon, DUE_DATE_CLASS};
use crate::models::{AppData, Category, Task};
use crate::page::{NodeId, Page};
use chrono::{DateTime, Utc};

/// Builds the task list document: the add-task form followed by one section
/// per category, tasks ordered by due date. Due-soon markers are applied
/// against `now`.
pub fn build_page(data: &AppData, now: DateTime<Utc>) -> Page {
    let mut page = Page::new();
    let root = page.root();

    let toolbar = page.append(root, "div").class("toolbar").node();
    page.append(toolbar, "button")
        .attr("type", "button")
        .attr("data-action", "toggle-form")
        .class("btn-new")
        .text("New task");
    add_form(&mut page, root);

    for category in Category::ALL {
        let mut tasks: Vec<&Task> = data
            .tasks
            .iter()
            .filter(|task| task.category == category)
            .collect();
        tasks.sort_by_key(|task| (task.due_date, task.id));

        let section = page.append(root, "section").class("category").node();
        page.append(section, "h2").text(category.label());
        if tasks.is_empty() {
            page.append(section, "p").class("empty").text("Nothing here yet.");
            continue;
        }
        let list = page.append(section, "ul").class("tasks").node();
        for task in tasks {
            task_row(&mut page, list, task);
        }
    }

    mark_due_soon(&mut page, now);
    page
}

pub fn render_index(data: &AppData, now: DateTime<Utc>) -> String {
    INDEX_HTML.replace("{{TASKS}}", &build_page(data, now).to_html())
}

fn add_form(page: &mut Page, parent: NodeId) {
    let form = page
        .append(parent, "form")
        .class(HIDDEN_FORM_CLASS)
        .attr("method", "post")
        .attr("action", "/")
        .style("visibility", "hidden")
        .style("display", "none")
        .node();

    let select = page
        .append(form, "select")
        .attr("name", "category")
        .attr("required", "required")
        .node();
    for category in Category::ALL {
        page.append(select, "option")
            .attr("value", category.value())
            .text(category.label());
    }
    page.append(form, "input")
        .attr("type", "text")
        .attr("name", "task")
        .attr("placeholder", "Task")
        .attr("required", "required");
    page.append(form, "input")
        .attr("type", "date")
        .attr("name", "due_date")
        .attr("required", "required");
    let star = page.append(form, "label").class("star-toggle").node();
    page.append(star, "input")
        .attr("type", "checkbox")
        .attr("name", "selected");
    page.append(star, "span").text("⭐");
    page.append(form, "button").attr("type", "submit").text("✓");
}

fn task_row(page: &mut Page, list: NodeId, task: &Task) {
    let key = task.id.to_string();
    let row = page.append(list, "li").class("task").node();

    page.append(row, "button")
        .attr("type", "button")
        .attr("data-action", "cross")
        .attr(TASK_ID_ATTR, &key)
        .class("btn-cross")
        .text("✔");
    if task.selected {
        page.append(row, "span").class("star").text("⭐");
    }
    page.append(row, "span")
        .id(&task.id.task_element_id())
        .class("task_text")
        .attr("contenteditable", "true")
        .attr(TASK_ID_ATTR, &key)
        .text(&task.text);

    let due = page.append(row, "div").class(DUE_DATE_CLASS).text("Due ").node();
    page.append(due, "span")
        .id(&task.id.due_date_element_id())
        .attr("contenteditable", "true")
        .attr(TASK_ID_ATTR, &key)
        .text(&task.due_date.format("%Y-%m-%d").to_string());

    page.append(row, "button")
        .id(&task.id.save_button_id())
        .attr("type", "button")
        .attr("data-action", "save")
        .attr(TASK_ID_ATTR, &key)
        .class("btn-save")
        .style("display", "none")
        .text("Save");
    page.append(row, "a")
        .attr("href", &format!("/delete/{key}"))
        .class("btn-delete")
        .text("✕");
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>To Do List</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    .hid_form {
      gap: 10px;
      margin-top: 12px;
    }

    .tasks {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .task {
      display: flex;
      align-items: center;
      gap: 12px;
      background: white;
      border-radius: 14px;
      padding: 10px 14px;
    }

    .task_text {
      flex: 1;
    }

    .line-through {
      text-decoration: line-through;
      color: #8b857d;
    }

    .due_date {
      font-size: 0.9rem;
      color: var(--accent-2);
    }

    .due-date-close {
      color: #c63b2b;
      font-weight: 600;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 6px 12px;
      cursor: pointer;
    }

    .btn-save {
      background: var(--accent);
      color: white;
    }

    .btn-delete {
      color: #8b857d;
      text-decoration: none;
    }

    .empty {
      color: #8b857d;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>To Do List</h1>
    </header>
    {{TASKS}}
  </main>

  <script>
    const saves = new Map();

    const toggleDisplay = () => {
      const form = document.querySelector('.hid_form');
      if (!form) {
        return;
      }
      if (form.style.visibility === 'hidden') {
        form.style.visibility = 'visible';
        form.style.display = 'inline-block';
      } else {
        form.style.visibility = 'hidden';
        form.style.display = 'none';
      }
    };

    const crossText = (taskId) => {
      const task = document.getElementById(`task_${taskId}`);
      if (task) {
        task.classList.toggle('line-through');
      }
    };

    const saveTask = (taskId) => {
      const task = document.getElementById(`task_${taskId}`);
      const dueDate = document.getElementById(`due_date_${taskId}`);
      const saveButton = document.getElementById(`save_button_${taskId}`);
      if (!task || !dueDate || !saveButton) {
        return;
      }
      const body = JSON.stringify({ task_text: task.innerText, due_date: dueDate.innerText });
      const slot = saves.get(taskId) || { latest: 0, chain: Promise.resolve() };
      const ticket = slot.latest + 1;
      slot.latest = ticket;
      slot.chain = slot.chain.then(async () => {
        if (slot.latest !== ticket) {
          return;
        }
        try {
          const res = await fetch(`/edit_task/${taskId}`, {
            method: 'PATCH',
            headers: { 'content-type': 'application/json' },
            body
          });
          if (!res.ok) {
            throw new Error(await res.text());
          }
          const data = await res.json();
          console.log('Task text updated successfully:', data);
          if (slot.latest === ticket) {
            saveButton.style.display = 'none';
          }
        } catch (err) {
          console.error('Error:', err);
        }
      });
      saves.set(taskId, slot);
    };

    document.addEventListener('click', (event) => {
      const target = event.target;
      const action = target.dataset.action;
      const taskId = target.getAttribute('data-task-id');

      if (action === 'toggle-form') {
        toggleDisplay();
      } else if (action === 'cross' && taskId) {
        crossText(taskId);
      } else if (action === 'save' && taskId) {
        saveTask(taskId);
        return;
      }

      if (!taskId) {
        return;
      }
      const task = document.getElementById(`task_${taskId}`);
      const dueDate = document.getElementById(`due_date_${taskId}`);
      const saveButton = document.getElementById(`save_button_${taskId}`);
      if (!task || !dueDate || !saveButton) {
        return;
      }
      const onTask = task.contains(target) || dueDate.contains(target);
      saveButton.style.display = onTask ? 'inline-block' : 'none';
    });
  </script>
</body>
</html>
"#;

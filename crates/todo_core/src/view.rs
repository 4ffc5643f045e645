use crate::model::{Filter, Task, due_instant, format_due};
use std::cmp::Ordering;
use time::{OffsetDateTime, UtcOffset};

pub const EMPTY_PLACEHOLDER: &str = "No task found";

/// Display order for `tasks` under `filter`.
///
/// Pending tasks come before completed ones; within each group tasks are
/// ordered by due instant, with a missing (or unreadable) due date counted as
/// the Unix epoch. The sort is stable, so ties keep insertion order.
pub fn derive_view(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    let mut items: Vec<&Task> = tasks.iter().collect();
    items.sort_by(|a, b| compare_for_display(a, b));
    items.retain(|task| filter.matches(task));
    items
}

fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    a.done
        .cmp(&b.done)
        .then_with(|| sort_instant(a).cmp(&sort_instant(b)))
}

fn sort_instant(task: &Task) -> OffsetDateTime {
    task.due
        .as_deref()
        .and_then(due_instant)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub text: String,
    pub due: String,
    pub status: &'static str,
    pub done: bool,
    pub toggle_title: &'static str,
}

impl TaskRow {
    fn from_task(task: &Task, offset: UtcOffset) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            due: format_due(task.due.as_deref(), offset),
            status: task.status_label(),
            done: task.done,
            toggle_title: if task.done {
                "Mark as pending"
            } else {
                "Mark as done"
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRow {
    Task(TaskRow),
    Placeholder(&'static str),
}

/// Rows ready for drawing. An empty view yields exactly one placeholder row.
pub fn render_rows(tasks: &[Task], filter: Filter, offset: UtcOffset) -> Vec<ViewRow> {
    let rows: Vec<ViewRow> = derive_view(tasks, filter)
        .into_iter()
        .map(|task| ViewRow::Task(TaskRow::from_task(task, offset)))
        .collect();

    if rows.is_empty() {
        return vec![ViewRow::Placeholder(EMPTY_PLACEHOLDER)];
    }
    rows
}

use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;
use todo_core::config::Palette;
use todo_core::model::{Filter, Task};
use todo_core::view::ViewRow;

const HEADER: [&str; 5] = ["Task", "ID", "Due", "Status", "Action"];

/// Draws the derived view as a table.
pub fn render_table(rows: &[ViewRow], palette: &Palette) -> String {
    let mut builder = Builder::default();
    builder.push_record(HEADER);

    for row in rows {
        match row {
            ViewRow::Task(task) => builder.push_record([
                task.text.clone(),
                palette.mutedize(&task.id),
                task.due.clone(),
                palette.status(task.status, task.done),
                task.toggle_title.to_string(),
            ]),
            ViewRow::Placeholder(message) => builder.push_record([
                message.to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]),
        }
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

pub fn render_filter_menu(active: Filter) -> String {
    let mut menu = active.control_label();
    for (index, option) in Filter::ALL.iter().enumerate() {
        let marker = if *option == active { "*" } else { " " };
        menu.push_str(&format!("\n {marker} {}) {}", index + 1, option.name()));
    }
    menu
}

pub fn task_json(task: &Task) -> Value {
    json!({
        "id": task.id,
        "text": task.text,
        "due": task.due,
        "done": task.done,
        "status": task.status_label(),
    })
}

pub fn view_json(outcome: &str, message: Option<&str>, filter: Filter, view: &[&Task]) -> Value {
    json!({
        "outcome": outcome,
        "message": message,
        "filter": filter,
        "filter_label": filter.control_label(),
        "tasks": view.iter().map(|task| task_json(task)).collect::<Vec<_>>(),
    })
}

mod due;
mod task;

pub use due::{calendar_date, due_instant, format_due, normalize_due_input};
pub use task::{Filter, Task};

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        if self.done { "Completed" } else { "Pending" }
    }
}

/// Which tasks the view shows. Never persisted; a fresh session starts at `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.done,
            Filter::Completed => task.done,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Pending => "Pending",
            Filter::Completed => "Completed",
        }
    }

    /// Text shown on the filter control while this filter is active.
    pub fn control_label(self) -> String {
        format!("FILTER ▾ ({})", self.name())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(AppError::invalid_input(format!("unknown filter '{other}'"))),
        }
    }
}

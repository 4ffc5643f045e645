pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod storage;
pub mod task_api;
pub mod ui;
pub mod view;

pub use error::AppError;
pub use model::{Filter, Task};
pub use task_api::{Confirm, Feedback, Outcome, Session};
pub use time::UtcOffset;

/// The local UTC offset, falling back to UTC when it cannot be determined.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

use crate::error::AppError;
use crate::model::Task;
use crate::storage::kv::KeyValueStore;

/// Slot holding the serialized task array.
pub const SLOT_KEY: &str = "todos_v1";

/// Reads the slot without recovery. `Ok(None)` when the slot was never written.
pub fn try_load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Vec<Task>>, AppError> {
    let Some(content) = store.get(SLOT_KEY)? else {
        return Ok(None);
    };
    let tasks: Vec<Task> = serde_json::from_str(&content)
        .map_err(|err| AppError::invalid_data(format!("{SLOT_KEY}: {err}")))?;
    Ok(Some(tasks))
}

/// Reads the slot, substituting an empty list for anything unreadable.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Task> {
    match try_load(store) {
        Ok(Some(tasks)) => {
            log::debug!("loaded {} task(s) from {SLOT_KEY}", tasks.len());
            tasks
        }
        Ok(None) => Vec::new(),
        Err(err) => {
            log::warn!("discarding unreadable task slot: {err}");
            Vec::new()
        }
    }
}

/// Overwrites the slot with the full list.
pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, tasks: &[Task]) -> Result<(), AppError> {
    let content = serde_json::to_string(tasks)?;
    store.set(SLOT_KEY, &content)
}
